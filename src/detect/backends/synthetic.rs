use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::geometry::BBox;

/// Synthetic backend for demos and tests.
///
/// Derives a pseudo shelf layout from a SHA-256 hash of the frame content:
/// the same pixels always yield the same detections, and any change to the
/// frame shuffles what is "on the shelf". No model file, no inference
/// runtime.
pub struct SyntheticBackend {
    /// Class ids are drawn from `0..classes`.
    classes: u32,
    /// Upper bound on detections per frame.
    max_items: usize,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self {
            // Matches the builtin demo class map.
            classes: 11,
            max_items: 4,
        }
    }

    pub fn with_layout(classes: u32, max_items: usize) -> Self {
        Self {
            classes: classes.max(1),
            max_items: max_items.max(1),
        }
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for SyntheticBackend {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let digest: [u8; 32] = Sha256::digest(pixels).into();

        let count = 1 + (digest[0] as usize) % self.max_items;
        let width = width.max(1) as f64;
        let height = height.max(1) as f64;
        let box_side = (width / 10.0).max(1.0);

        let mut detections = Vec::with_capacity(count);
        for slot in 0..count {
            let class_byte = digest[(1 + 2 * slot) % digest.len()];
            let jitter_byte = digest[(2 + 2 * slot) % digest.len()];

            let class_id = u32::from(class_byte) % self.classes;
            // Spread items across evenly spaced shelf slots, with a small
            // content-derived horizontal jitter.
            let slot_center = width * (slot as f64 + 1.0) / (count as f64 + 1.0);
            let jitter = f64::from(jitter_byte % 21) - 10.0;
            let cx = (slot_center + jitter).clamp(box_side / 2.0, width - box_side / 2.0);
            let cy = height / 2.0;

            let bbox = BBox::new(
                cx - box_side / 2.0,
                (cy - box_side / 2.0).max(0.0),
                cx + box_side / 2.0,
                (cy + box_side / 2.0).min(height),
            )?;
            let confidence = 0.55 + f64::from(digest[(3 + 2 * slot) % digest.len()] % 40) / 100.0;

            detections.push(Detection {
                class_id,
                bbox,
                confidence: confidence as f32,
            });
        }

        Ok(detections)
    }
}
