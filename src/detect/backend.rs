use anyhow::Result;

use crate::detect::result::Detection;

/// Detector backend trait.
///
/// A backend turns one frame of RGB pixels into a list of detections.
/// Implementations must treat the pixel slice as read-only and ephemeral:
/// detections flow out, pixels do not get retained.
///
/// Class ids are reported in the detector's own id space; mapping ids to
/// item labels (and dropping ids the class map does not know) happens in
/// the reconciliation layer, not here.
pub trait DetectorBackend: Send {
    /// Backend identifier, as selectable from configuration.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
