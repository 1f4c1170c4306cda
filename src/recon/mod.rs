//! Detection reconciliation engine.
//!
//! Compares the detections from two snapshots of the same shelf (taken
//! before and after a scan window) and produces signed per-label inventory
//! deltas. Synchronous, allocation-light, no I/O: persistence stays at the
//! caller's boundary.

mod classifier;
mod matcher;

pub use classifier::classify_changes;
pub use matcher::{match_detections, MatchResult, MatchedPair};

use crate::classmap::ClassMap;
use crate::detect::Detection;
use crate::inventory::InventoryChanges;

/// Run one reconciliation cycle over a before/after pair of detection sets.
///
/// Detections with a class id the map does not know are skipped (warned,
/// non-fatal) before matching; input order is otherwise preserved, which
/// the greedy matcher depends on. Always returns a (possibly empty)
/// changes mapping.
pub fn reconcile(
    before: &[Detection],
    after: &[Detection],
    class_map: &ClassMap,
) -> InventoryChanges {
    let before = filter_known(before, class_map);
    let after = filter_known(after, class_map);

    let matches = match_detections(&before, &after);
    log::debug!(
        "matched {} pairs, {} disappeared, {} appeared",
        matches.pairs.len(),
        matches.unmatched_before.len(),
        matches.unmatched_after.len()
    );

    classify_changes(&before, &after, &matches, class_map)
}

fn filter_known(detections: &[Detection], class_map: &ClassMap) -> Vec<Detection> {
    detections
        .iter()
        .filter(|det| {
            if class_map.contains(det.class_id) {
                true
            } else {
                log::warn!("skipping detection with unknown class id {}", det.class_id);
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn det(class_id: u32, xmin: f64, xmax: f64) -> Detection {
        Detection {
            class_id,
            bbox: BBox::new(xmin, 0.0, xmax, 10.0).unwrap(),
            confidence: 0.9,
        }
    }

    #[test]
    fn unknown_class_ids_are_skipped_not_fatal() {
        let map = ClassMap::builtin();
        // Class 99 is not in the map; it must not reach the classifier as
        // an appearance/disappearance.
        let before = vec![det(99, 0.0, 10.0), det(7, 0.0, 10.0)];
        let after = vec![det(7, 50.0, 60.0), det(99, 0.0, 10.0)];

        let changes = reconcile(&before, &after, &map);

        assert_eq!(changes.get("snickers"), Some(-1));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get("ID:99"), None);
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let map = ClassMap::builtin();
        let snapshot = vec![det(0, 0.0, 10.0), det(5, 30.0, 40.0)];
        let changes = reconcile(&snapshot, &snapshot, &map);
        assert!(changes.is_empty());
    }
}
