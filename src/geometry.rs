//! Bounding-box geometry.
//!
//! Detections arrive as axis-aligned boxes in pixel coordinates
//! (`xmin, ymin, xmax, ymax`). The reconciliation engine only ever looks at
//! box centroids, so this module is the single place where coordinates are
//! validated and reduced to points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected bounding-box input. Fails fast; never retried.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("bbox coordinate is not a finite number: [{0}, {1}, {2}, {3}]")]
    NonFinite(f64, f64, f64, f64),
    #[error("bbox is inverted (xmin>xmax or ymin>ymax): [{0}, {1}, {2}, {3}]")]
    Inverted(f64, f64, f64, f64),
}

/// Axis-aligned bounding box, `xmin <= xmax` and `ymin <= ymax` by construction.
///
/// Serialized as a four-element array `[xmin, ymin, xmax, ymax]`; the array
/// form is validated on the way in, so a deserialized box is always well
/// formed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl BBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self, InputError> {
        if !(xmin.is_finite() && ymin.is_finite() && xmax.is_finite() && ymax.is_finite()) {
            return Err(InputError::NonFinite(xmin, ymin, xmax, ymax));
        }
        if xmin > xmax || ymin > ymax {
            return Err(InputError::Inverted(xmin, ymin, xmax, ymax));
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Geometric center `(cx, cy)` of the box.
    pub fn centroid(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }
}

impl TryFrom<[f64; 4]> for BBox {
    type Error = InputError;

    fn try_from(coords: [f64; 4]) -> Result<Self, Self::Error> {
        BBox::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax]
    }
}

/// Euclidean distance between two box centroids.
pub fn centroid_distance(a: &BBox, b: &BBox) -> f64 {
    let (ax, ay) = a.centroid();
    let (bx, by) = b.centroid();
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}
