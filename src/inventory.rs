//! Per-item inventory counts and their persistence.
//!
//! The store is the only state that outlives a reconciliation cycle. It is
//! loaded once at cycle start and replaced, not mutated, at cycle end, so
//! callers must serialize reconcile+save per store file (the daemon's main
//! loop is the single writer).

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Signed per-label deltas produced by one reconciliation cycle.
///
/// An entry exists once a nonzero delta event touched the label; offsetting
/// events can leave it at net zero, but nothing ever synthesizes entries for
/// untouched labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InventoryChanges {
    deltas: BTreeMap<String, i64>,
}

impl InventoryChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a delta for a label.
    pub fn add(&mut self, label: &str, delta: i64) {
        *self.deltas.entry(label.to_string()).or_insert(0) += delta;
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.deltas.get(label).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Sum of all deltas across labels.
    pub fn net_total(&self) -> i64 {
        self.deltas.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.deltas.iter().map(|(label, delta)| (label.as_str(), *delta))
    }
}

/// Persisted label -> count mapping.
///
/// Counts may go negative: a run of misdetections is left visible for a
/// human operator to correct rather than being clamped away.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryStore {
    counts: BTreeMap<String, i64>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            counts: pairs
                .into_iter()
                .map(|(label, count)| (label.into(), count))
                .collect(),
        }
    }

    /// Load the store from a JSON file.
    ///
    /// A missing or unparsable file recovers to an empty store; both cases
    /// are logged and neither aborts the cycle.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "inventory file {} not found, starting with an empty inventory",
                    path.display()
                );
                return Self::new();
            }
            Err(e) => {
                log::warn!(
                    "failed to read inventory file {}: {}, starting empty",
                    path.display(),
                    e
                );
                return Self::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(counts) => Self { counts },
            Err(e) => {
                log::warn!(
                    "invalid inventory file {}: {}, starting empty",
                    path.display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Overwrite the file with the full mapping, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.counts)?;
        std::fs::write(path, json)
            .map_err(|e| anyhow!("failed to save inventory to {}: {}", path.display(), e))?;
        log::info!("saved inventory ({} items) to {}", self.counts.len(), path.display());
        Ok(())
    }

    /// Apply a cycle's changes, producing a new store.
    ///
    /// Copy-on-write: the receiver is never mutated. A changed label absent
    /// from the store is initialized to 0 first (warned, non-fatal), then
    /// the delta is added. No floor or ceiling is enforced.
    pub fn apply(&self, changes: &InventoryChanges) -> InventoryStore {
        let mut updated = self.clone();

        if changes.is_empty() {
            log::info!("no inventory changes detected");
            return updated;
        }

        for (label, delta) in changes.iter() {
            match updated.counts.entry(label.to_string()) {
                Entry::Vacant(vacant) => {
                    log::warn!("item '{}' not in inventory, initializing to 0", label);
                    vacant.insert(delta);
                }
                Entry::Occupied(mut occupied) => {
                    *occupied.get_mut() += delta;
                }
            }
            if delta > 0 {
                log::info!("restock: adding {} to '{}'", delta, label);
            } else if delta < 0 {
                log::info!("sale: subtracting {} from '{}'", -delta, label);
            }
        }

        updated
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.counts.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_accumulate_by_summation() {
        let mut changes = InventoryChanges::new();
        changes.add("snickers", -1);
        changes.add("snickers", -1);
        changes.add("skittles", 1);
        changes.add("skittles", -1);

        assert_eq!(changes.get("snickers"), Some(-2));
        // Offsetting deltas keep the touched entry at zero.
        assert_eq!(changes.get("skittles"), Some(0));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.net_total(), -2);
    }

    #[test]
    fn apply_empty_changes_returns_structural_copy() {
        let store = InventoryStore::from_pairs([("snickers", 5), ("nerds", 2)]);
        let updated = store.apply(&InventoryChanges::new());
        assert_eq!(updated, store);
    }

    #[test]
    fn apply_never_mutates_the_caller() {
        let store = InventoryStore::from_pairs([("snickers", 5)]);
        let mut changes = InventoryChanges::new();
        changes.add("snickers", -3);

        let updated = store.apply(&changes);

        assert_eq!(store.get("snickers"), Some(5));
        assert_eq!(updated.get("snickers"), Some(2));
    }

    #[test]
    fn absent_labels_initialize_to_zero_before_delta() {
        let store = InventoryStore::new();
        let mut changes = InventoryChanges::new();
        changes.add("twizzlers", -1);

        let updated = store.apply(&changes);
        assert_eq!(updated.get("twizzlers"), Some(-1));
    }

    #[test]
    fn counts_may_go_negative() {
        let store = InventoryStore::from_pairs([("airheads", 1)]);
        let mut changes = InventoryChanges::new();
        changes.add("airheads", -4);

        let updated = store.apply(&changes);
        assert_eq!(updated.get("airheads"), Some(-3));
    }

    #[test]
    fn load_recovers_from_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();

        let absent = InventoryStore::load(&dir.path().join("absent.json"));
        assert!(absent.is_empty());

        let corrupt_path = dir.path().join("corrupt.json");
        std::fs::write(&corrupt_path, "{not json").unwrap();
        let corrupt = InventoryStore::load(&corrupt_path);
        assert!(corrupt.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");

        let store = InventoryStore::from_pairs([("snickers", 4), ("skittles", -1)]);
        store.save(&path).unwrap();

        let loaded = InventoryStore::load(&path);
        assert_eq!(loaded, store);
    }
}
