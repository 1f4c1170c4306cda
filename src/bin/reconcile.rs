//! reconcile - one-shot reconciliation over detection snapshots
//!
//! Takes two detection-snapshot files (JSON arrays of
//! `{"class_id": N, "bbox": [xmin, ymin, xmax, ymax], "confidence": C}`),
//! runs the reconciliation engine, and applies the resulting deltas to the
//! inventory store. Useful for replaying captures and for exercising the
//! engine without a camera.

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use shelfscan::{reconcile, ClassMap, Detection, InventoryChanges, InventoryStore};

#[derive(Parser, Debug)]
#[command(
    name = "reconcile",
    about = "Reconcile two detection snapshots against the inventory store"
)]
struct Args {
    /// Detection snapshot taken before the scan window (JSON array)
    #[arg(long)]
    before: PathBuf,

    /// Detection snapshot taken after the scan window (JSON array)
    #[arg(long)]
    after: PathBuf,

    /// Class map file (JSON object of id -> label); builtin demo map when omitted
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Inventory store file
    #[arg(long, default_value = "inventory.json")]
    inventory: PathBuf,

    /// Analyze and print, but do not write the store
    #[arg(long)]
    dry_run: bool,
}

#[derive(Serialize)]
struct CycleReport {
    changes: InventoryChanges,
    inventory: InventoryStore,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let class_map = match &args.classes {
        Some(path) => ClassMap::load(path)?,
        None => ClassMap::builtin(),
    };

    let before = load_snapshot(&args.before)?;
    let after = load_snapshot(&args.after)?;
    log::info!(
        "loaded {} detections before, {} after",
        before.len(),
        after.len()
    );

    let store = InventoryStore::load(&args.inventory);
    let changes = reconcile(&before, &after, &class_map);
    let updated = store.apply(&changes);

    if args.dry_run {
        log::info!("dry run: store not written");
    } else {
        updated.save(&args.inventory)?;
    }

    let report = CycleReport {
        changes,
        inventory: updated,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Vec<Detection>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read snapshot {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| anyhow!("invalid snapshot {}: {}", path.display(), e))
}
