//! State shared between the capture thread, the API thread, and the
//! daemon's main loop.
//!
//! The main loop is the only writer of the inventory (single-writer
//! discipline for the read-modify-write against the store file). The API
//! thread reads snapshots and raises a scan-request flag; the capture
//! thread only publishes frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::frame::LatestFrame;
use crate::inventory::InventoryStore;
use crate::scan::ScanPhase;

/// Point-in-time view of the scan machine, for the status endpoint.
#[derive(Clone, Copy, Debug)]
pub struct ScanStatus {
    pub phase: ScanPhase,
    pub remaining: Option<Duration>,
}

impl Default for ScanStatus {
    fn default() -> Self {
        Self {
            phase: ScanPhase::Idle,
            remaining: None,
        }
    }
}

pub struct ScannerState {
    /// Most recent captured frame (preview + scan snapshots).
    pub latest: LatestFrame,
    inventory: Mutex<InventoryStore>,
    status: Mutex<ScanStatus>,
    scan_requested: AtomicBool,
}

impl ScannerState {
    pub fn new(inventory: InventoryStore) -> Self {
        Self {
            latest: LatestFrame::new(),
            inventory: Mutex::new(inventory),
            status: Mutex::new(ScanStatus::default()),
            scan_requested: AtomicBool::new(false),
        }
    }

    /// Raise the scan-request flag.
    ///
    /// Returns false when a scan is already active or requested; the
    /// request is then ignored, matching the one-scan-at-a-time rule.
    pub fn request_scan(&self) -> bool {
        if self.scan_status().phase != ScanPhase::Idle {
            return false;
        }
        !self.scan_requested.swap(true, Ordering::SeqCst)
    }

    /// Consume a pending scan request, if any.
    pub fn take_scan_request(&self) -> bool {
        self.scan_requested.swap(false, Ordering::SeqCst)
    }

    pub fn inventory_snapshot(&self) -> InventoryStore {
        self.inventory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_inventory(&self, store: InventoryStore) {
        *self
            .inventory
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = store;
    }

    pub fn scan_status(&self) -> ScanStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_scan_status(&self, status: ScanStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_requests_collapse_until_taken() {
        let state = ScannerState::new(InventoryStore::new());

        assert!(state.request_scan());
        // Second request while one is pending: ignored.
        assert!(!state.request_scan());

        assert!(state.take_scan_request());
        assert!(!state.take_scan_request());
    }

    #[test]
    fn scan_requests_are_ignored_while_active() {
        let state = ScannerState::new(InventoryStore::new());
        state.set_scan_status(ScanStatus {
            phase: ScanPhase::Scanning,
            remaining: Some(Duration::from_secs(5)),
        });

        assert!(!state.request_scan());
        assert!(!state.take_scan_request());
    }

    #[test]
    fn inventory_snapshot_is_a_copy() {
        let state = ScannerState::new(InventoryStore::from_pairs([("snickers", 3)]));

        let snapshot = state.inventory_snapshot();
        state.set_inventory(InventoryStore::from_pairs([("snickers", 9)]));

        assert_eq!(snapshot.get("snickers"), Some(3));
        assert_eq!(state.inventory_snapshot().get("snickers"), Some(9));
    }
}
