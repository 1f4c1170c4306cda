//! Scan-timing state machine.
//!
//! One scan is a fixed observation window: IDLE -> SCANNING (before frame
//! captured, timer armed) -> ANALYZING (timer expired, after frame captured,
//! reconciliation runs) -> IDLE. Only one scan can be in flight; start
//! requests while non-idle are ignored. Time is passed in by the caller so
//! the machine can be driven in tests without sleeping.

use std::time::{Duration, Instant};

use crate::frame::Frame;

/// Default length of the observation window.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Analyzing,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Scanning => "scanning",
            ScanPhase::Analyzing => "analyzing",
        }
    }
}

/// Drives one scan window at a time.
pub struct ScanTimer {
    duration: Duration,
    phase: ScanPhase,
    started_at: Option<Instant>,
    before: Option<Frame>,
}

impl ScanTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            phase: ScanPhase::Idle,
            started_at: None,
            before: None,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Accept a start request.
    ///
    /// Captures `before` as the pre-scan snapshot and arms the timer.
    /// Returns false (and changes nothing) unless the machine is idle.
    pub fn start_scan(&mut self, before: Frame, now: Instant) -> bool {
        if self.phase != ScanPhase::Idle {
            log::debug!(
                "ignoring scan start request while {}",
                self.phase.as_str()
            );
            return false;
        }
        log::info!("starting {:.0}s scan window", self.duration.as_secs_f64());
        self.phase = ScanPhase::Scanning;
        self.started_at = Some(now);
        self.before = Some(before);
        true
    }

    /// Time left in the window, while scanning.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let started_at = self.started_at?;
        if self.phase != ScanPhase::Scanning {
            return None;
        }
        Some(
            self.duration
                .saturating_sub(now.saturating_duration_since(started_at)),
        )
    }

    /// On timer expiry, hand back the before frame and enter ANALYZING.
    ///
    /// Returns `None` while the window is still open or the machine is not
    /// scanning. The caller pairs the returned frame with a fresh "after"
    /// snapshot and runs reconciliation, then calls [`complete`].
    ///
    /// [`complete`]: ScanTimer::complete
    pub fn take_expired(&mut self, now: Instant) -> Option<Frame> {
        if self.phase != ScanPhase::Scanning {
            return None;
        }
        let started_at = self.started_at?;
        if now.saturating_duration_since(started_at) < self.duration {
            return None;
        }
        log::info!("scan window complete, analyzing");
        self.phase = ScanPhase::Analyzing;
        self.started_at = None;
        self.before.take()
    }

    /// Analysis finished; return to idle.
    pub fn complete(&mut self) {
        if self.phase != ScanPhase::Analyzing {
            log::debug!("complete() called while {}", self.phase.as_str());
        }
        self.phase = ScanPhase::Idle;
        self.started_at = None;
        self.before = None;
    }
}

impl Default for ScanTimer {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(vec![0u8; 12], 2, 2)
    }

    #[test]
    fn full_cycle_idle_scanning_analyzing_idle() {
        let mut timer = ScanTimer::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(timer.phase(), ScanPhase::Idle);

        assert!(timer.start_scan(frame(), t0));
        assert_eq!(timer.phase(), ScanPhase::Scanning);

        // Window still open.
        assert!(timer.take_expired(t0 + Duration::from_secs(9)).is_none());
        assert_eq!(timer.phase(), ScanPhase::Scanning);

        let before = timer.take_expired(t0 + Duration::from_secs(10));
        assert!(before.is_some());
        assert_eq!(timer.phase(), ScanPhase::Analyzing);

        timer.complete();
        assert_eq!(timer.phase(), ScanPhase::Idle);
    }

    #[test]
    fn start_requests_are_ignored_while_busy() {
        let mut timer = ScanTimer::new(Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(timer.start_scan(frame(), t0));
        // Second request during the window: ignored.
        assert!(!timer.start_scan(frame(), t0 + Duration::from_secs(1)));
        assert_eq!(timer.phase(), ScanPhase::Scanning);

        timer.take_expired(t0 + Duration::from_secs(10)).unwrap();
        // Still ignored while analyzing.
        assert!(!timer.start_scan(frame(), t0 + Duration::from_secs(11)));
        assert_eq!(timer.phase(), ScanPhase::Analyzing);
    }

    #[test]
    fn remaining_counts_down_and_saturates() {
        let mut timer = ScanTimer::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(timer.remaining(t0).is_none());

        timer.start_scan(frame(), t0);
        assert_eq!(
            timer.remaining(t0 + Duration::from_secs(4)),
            Some(Duration::from_secs(6))
        );
        assert_eq!(
            timer.remaining(t0 + Duration::from_secs(30)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn expiry_returns_the_original_before_frame() {
        let mut timer = ScanTimer::new(Duration::from_secs(2));
        let t0 = Instant::now();

        let before = Frame::new(vec![9u8; 12], 2, 2);
        timer.start_scan(before.clone(), t0);

        let got = timer.take_expired(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(got, before);

        // The frame is handed out exactly once.
        assert!(timer.take_expired(t0 + Duration::from_secs(3)).is_none());
    }
}
