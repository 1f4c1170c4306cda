//! Frame ingestion.
//!
//! One source feeds the scanner: a shelf-facing camera. `stub://` devices
//! get a synthetic scene generator so the daemon, the preview stream, and
//! the tests all run without hardware. Real capture integrations (V4L2,
//! RTSP) slot in behind `CameraSource` without touching consumers.
//!
//! The ingestion layer produces `Frame` values and nothing else; scan
//! timing and detection live downstream.

pub mod camera;

pub use camera::{CameraConfig, CameraSource, CameraStats};
