//! End-to-end reconciliation cycles: detection sets in, changes out,
//! applied to a persisted store.

use shelfscan::{reconcile, BBox, ClassMap, Detection, InventoryStore};

fn det(class_id: u32, bbox: (f64, f64, f64, f64)) -> Detection {
    Detection {
        class_id,
        bbox: BBox::new(bbox.0, bbox.1, bbox.2, bbox.3).unwrap(),
        confidence: 0.9,
    }
}

#[test]
fn rightward_move_books_a_sale_and_updates_the_store() {
    // class 7 = snickers, cx 5 -> 55
    let before = vec![det(7, (0.0, 0.0, 10.0, 10.0))];
    let after = vec![det(7, (50.0, 0.0, 60.0, 10.0))];

    let changes = reconcile(&before, &after, &ClassMap::builtin());
    assert_eq!(changes.get("snickers"), Some(-1));
    assert_eq!(changes.len(), 1);

    let updated = InventoryStore::new().apply(&changes);
    assert_eq!(updated.get("snickers"), Some(-1));
}

#[test]
fn leftward_move_books_a_restock() {
    // class 6 = skittles, cx 55 -> 5
    let before = vec![det(6, (50.0, 0.0, 60.0, 10.0))];
    let after = vec![det(6, (0.0, 0.0, 10.0, 10.0))];

    let changes = reconcile(&before, &after, &ClassMap::builtin());
    assert_eq!(changes.get("skittles"), Some(1));
}

#[test]
fn disappearance_books_a_sale() {
    let before = vec![det(2, (0.0, 0.0, 10.0, 10.0))];
    let changes = reconcile(&before, &[], &ClassMap::builtin());
    assert_eq!(changes.get("airheads"), Some(-1));
}

#[test]
fn appearance_books_a_sale_too() {
    let after = vec![det(2, (0.0, 0.0, 10.0, 10.0))];
    let changes = reconcile(&[], &after, &ClassMap::builtin());
    assert_eq!(changes.get("airheads"), Some(-1));
}

#[test]
fn greedy_matching_leaves_the_far_duplicate_unmatched() {
    // Two skittles before, one after near the first: the nearer one
    // matches (and its small rightward drift books a sale); the far one
    // is recorded as a disappearance even though a skittles item is still
    // visible. Known limitation of the greedy matcher, documented here.
    let before = vec![
        det(6, (0.0, 0.0, 10.0, 10.0)),
        det(6, (100.0, 0.0, 110.0, 10.0)),
    ];
    let after = vec![det(6, (1.0, 0.0, 11.0, 10.0))];

    let changes = reconcile(&before, &after, &ClassMap::builtin());
    // -1 for the matched drift (cx 5 -> 6), -1 for the "disappeared" far one.
    assert_eq!(changes.get("skittles"), Some(-2));
}

#[test]
fn full_cycle_persists_through_the_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    InventoryStore::from_pairs([("snickers", 10), ("skittles", 3)])
        .save(&path)
        .unwrap();

    let before = vec![
        det(7, (0.0, 0.0, 10.0, 10.0)),   // snickers, sells
        det(6, (50.0, 0.0, 60.0, 10.0)),  // skittles, restocked
    ];
    let after = vec![
        det(7, (50.0, 0.0, 60.0, 10.0)),
        det(6, (0.0, 0.0, 10.0, 10.0)),
    ];

    let store = InventoryStore::load(&path);
    let changes = reconcile(&before, &after, &ClassMap::builtin());
    let updated = store.apply(&changes);
    updated.save(&path).unwrap();

    let reloaded = InventoryStore::load(&path);
    assert_eq!(reloaded.get("snickers"), Some(9));
    assert_eq!(reloaded.get("skittles"), Some(4));
}

#[test]
fn detection_snapshots_round_trip_as_json() {
    // The wire form the reconcile CLI consumes.
    let snapshot = vec![
        det(7, (0.0, 0.0, 10.0, 10.0)),
        det(6, (50.0, 20.0, 60.0, 30.0)),
    ];
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: Vec<Detection> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);

    // Malformed boxes are rejected at parse time, before the engine runs.
    let bad = r#"[{"class_id": 7, "bbox": [10.0, 0.0, 0.0, 10.0], "confidence": 0.9}]"#;
    assert!(serde_json::from_str::<Vec<Detection>>(bad).is_err());
}
