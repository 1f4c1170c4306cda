//! Turns match results into signed inventory deltas.
//!
//! The shelf is read left-to-right: the right edge is the "sale" side, the
//! left edge is the "restock" side. Direction is judged on the horizontal
//! centroid coordinate alone.
//!
//! Items that appear mid-window are ALSO booked as sales (-1), same as items
//! that disappear. That is the deployed business rule, kept verbatim and
//! flagged for product-owner review; do not "fix" it into a restock.

use crate::classmap::ClassMap;
use crate::detect::Detection;
use crate::inventory::InventoryChanges;
use crate::recon::matcher::MatchResult;

/// Classify matches and non-matches into per-label deltas.
///
/// | observation                  | delta |
/// |------------------------------|-------|
/// | matched, cx moved rightward  | -1    |
/// | matched, cx moved leftward   | +1    |
/// | matched, cx unchanged        | none  |
/// | in before only (disappeared) | -1    |
/// | in after only (appeared)     | -1    |
///
/// Deltas for the same label sum across the whole cycle.
pub fn classify_changes(
    before: &[Detection],
    after: &[Detection],
    matches: &MatchResult,
    class_map: &ClassMap,
) -> InventoryChanges {
    let mut changes = InventoryChanges::new();

    for pair in &matches.pairs {
        let label = class_map.label_for(before[pair.before].class_id);
        let (cx_before, _) = before[pair.before].bbox.centroid();
        let (cx_after, _) = after[pair.after].bbox.centroid();

        if cx_after > cx_before {
            log::info!(
                "sale: '{}' moved left-to-right (cx {:.0} -> {:.0})",
                label,
                cx_before,
                cx_after
            );
            changes.add(&label, -1);
        } else if cx_after < cx_before {
            log::info!(
                "restock: '{}' moved right-to-left (cx {:.0} -> {:.0})",
                label,
                cx_before,
                cx_after
            );
            changes.add(&label, 1);
        } else {
            log::debug!(
                "no change: '{}' held position (dist {:.1})",
                label,
                pair.distance
            );
        }
    }

    for &i in &matches.unmatched_before {
        let label = class_map.label_for(before[i].class_id);
        log::info!("sale: '{}' disappeared from the shelf", label);
        changes.add(&label, -1);
    }

    for &j in &matches.unmatched_after {
        let label = class_map.label_for(after[j].class_id);
        // Appearance counts as a sale too; see module docs.
        log::info!("sale: '{}' appeared on the shelf", label);
        changes.add(&label, -1);
    }

    changes
}
