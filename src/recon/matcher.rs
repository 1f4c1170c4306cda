use crate::detect::Detection;
use crate::geometry::centroid_distance;

/// One before/after pairing produced by the matcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchedPair {
    /// Index into the before set.
    pub before: usize,
    /// Index into the after set.
    pub after: usize,
    /// Centroid distance between the paired boxes.
    pub distance: f64,
}

/// Outcome of matching a before set against an after set.
///
/// Each index appears in at most one pair; everything unpaired lands in the
/// corresponding unmatched list, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchResult {
    pub pairs: Vec<MatchedPair>,
    pub unmatched_before: Vec<usize>,
    pub unmatched_after: Vec<usize>,
}

/// Greedy same-class matcher.
///
/// Walks the before set in its given order and pairs each detection with the
/// nearest unclaimed after-detection of the same class, by centroid distance.
/// There is no distance threshold: however far the nearest candidate is, it
/// is accepted. Claims are immediate, so earlier before-detections get first
/// pick and the result is order-dependent rather than a globally optimal
/// assignment. That behavior is load-bearing for the change classifier and
/// must not be swapped for minimum-cost bipartite matching.
pub fn match_detections(before: &[Detection], after: &[Detection]) -> MatchResult {
    let mut claimed = vec![false; after.len()];
    let mut pairs = Vec::new();
    let mut unmatched_before = Vec::new();

    for (i, initial) in before.iter().enumerate() {
        let mut best_index = None;
        let mut best_distance = f64::INFINITY;

        for (j, candidate) in after.iter().enumerate() {
            if claimed[j] || candidate.class_id != initial.class_id {
                continue;
            }
            let distance = centroid_distance(&initial.bbox, &candidate.bbox);
            // Strict less-than: on exact ties the earliest candidate wins.
            if distance < best_distance {
                best_distance = distance;
                best_index = Some(j);
            }
        }

        match best_index {
            Some(j) => {
                claimed[j] = true;
                log::debug!(
                    "matched before[{}] to after[{}] (class {}, dist {:.1})",
                    i,
                    j,
                    initial.class_id,
                    best_distance
                );
                pairs.push(MatchedPair {
                    before: i,
                    after: j,
                    distance: best_distance,
                });
            }
            None => unmatched_before.push(i),
        }
    }

    let unmatched_after = (0..after.len()).filter(|&j| !claimed[j]).collect();

    MatchResult {
        pairs,
        unmatched_before,
        unmatched_after,
    }
}
