//! Detector class-id to item-label mapping.
//!
//! Loaded once and read-only for the lifetime of a reconciliation cycle.
//! The store and the changes mapping are keyed by label, never by raw id.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Result};

/// Immutable mapping from detector class id to item label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassMap {
    labels: BTreeMap<u32, String>,
}

impl ClassMap {
    /// Load a class map from a JSON object of id -> label.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read class map {}: {}", path.display(), e))?;
        let labels: BTreeMap<u32, String> = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid class map {}: {}", path.display(), e))?;
        if labels.is_empty() {
            return Err(anyhow!("class map {} has no entries", path.display()));
        }
        Ok(Self { labels })
    }

    /// The demo deployment's 11-item candy shelf.
    pub fn builtin() -> Self {
        Self::from_pairs([
            (0, "MMs_peanut"),
            (1, "MMs_regular"),
            (2, "airheads"),
            (3, "gummy_worms"),
            (4, "milky_way"),
            (5, "nerds"),
            (6, "skittles"),
            (7, "snickers"),
            (8, "starbust"),
            (9, "three_musketeers"),
            (10, "twizzlers"),
        ])
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(id, label)| (id, label.into()))
                .collect(),
        }
    }

    pub fn contains(&self, class_id: u32) -> bool {
        self.labels.contains_key(&class_id)
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }

    /// Label for a class id, falling back to `"ID:<n>"` for unknown ids.
    pub fn label_for(&self, class_id: u32) -> String {
        match self.labels.get(&class_id) {
            Some(label) => label.clone(),
            None => format!("ID:{}", class_id),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_map_covers_the_demo_shelf() {
        let map = ClassMap::builtin();
        assert_eq!(map.len(), 11);
        assert_eq!(map.get(7), Some("snickers"));
        assert_eq!(map.get(6), Some("skittles"));
        assert!(!map.contains(11));
    }

    #[test]
    fn unknown_ids_get_the_id_fallback_label() {
        let map = ClassMap::from_pairs([(0, "snickers")]);
        assert_eq!(map.label_for(0), "snickers");
        assert_eq!(map.label_for(42), "ID:42");
    }

    #[test]
    fn load_round_trips_json_object_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"{"0": "snickers", "3": "nerds"}"#).unwrap();

        let map = ClassMap::load(&path).unwrap();
        assert_eq!(map.get(0), Some("snickers"));
        assert_eq!(map.get(3), Some("nerds"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn load_rejects_missing_or_empty_maps() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClassMap::load(&dir.path().join("absent.json")).is_err());

        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(ClassMap::load(&path).is_err());
    }
}
