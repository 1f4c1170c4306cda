//! Shelf inventory scanner.
//!
//! Estimates inventory changes on a physical shelf by comparing object
//! detections captured before and after a timed scan window, then updates a
//! persisted per-item count.
//!
//! # Architecture
//!
//! One reconciliation cycle:
//!
//! 1. A scan is triggered; the latest camera frame becomes the "before"
//!    snapshot and a fixed-duration window opens (default 10 s).
//! 2. On expiry the latest frame becomes the "after" snapshot.
//! 3. The detector backend turns both frames into detection sets.
//! 4. The engine pairs detections (greedy nearest same-class centroid),
//!    classifies motion and appearance/disappearance into signed per-label
//!    deltas, and applies them copy-on-write to the inventory store.
//! 5. The new store replaces the old one on disk.
//!
//! The engine (`geometry`, `recon`, `inventory`) is synchronous and does no
//! I/O beyond the explicit load/save at the cycle boundary. Everything
//! around it — capture (`ingest`, `frame`), scan timing (`scan`), the
//! detector seam (`detect`), and the HTTP surface (`api`) — is peripheral
//! and replaceable.
//!
//! # Module Structure
//!
//! - `geometry`: validated bounding boxes and centroids
//! - `detect`: detection type, detector backend trait, synthetic backend
//! - `recon`: matcher + classifier + cycle pipeline
//! - `inventory`: per-label counts, copy-on-write updates, persistence
//! - `classmap`: detector class id -> item label mapping
//! - `frame` / `ingest`: frames, latest-frame cell, camera sources
//! - `scan`: scan-timing state machine
//! - `config` / `state` / `api`: daemon wiring

pub mod api;
pub mod classmap;
pub mod config;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod ingest;
pub mod inventory;
pub mod recon;
pub mod scan;
pub mod state;

pub use classmap::ClassMap;
pub use config::ScannerConfig;
pub use detect::{backend_from_name, Detection, DetectorBackend, SyntheticBackend};
pub use frame::{Frame, LatestFrame};
pub use geometry::{centroid_distance, BBox, InputError};
pub use ingest::{CameraConfig, CameraSource, CameraStats};
pub use inventory::{InventoryChanges, InventoryStore};
pub use recon::{classify_changes, match_detections, reconcile, MatchResult, MatchedPair};
pub use scan::{ScanPhase, ScanTimer, DEFAULT_SCAN_DURATION};
pub use state::{ScanStatus, ScannerState};
