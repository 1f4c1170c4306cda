use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// One object observation in a single frame.
///
/// Ephemeral: produced per inference call, consumed by one reconciliation
/// cycle. `confidence` is reported by the detector and carried through for
/// operators and adapter-side thresholds; the reconciliation engine never
/// consults it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub bbox: BBox,
    pub confidence: f32,
}
