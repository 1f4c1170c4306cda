//! scannerd - shelf inventory scanning daemon
//!
//! This daemon:
//! 1. Captures frames from the configured camera on a background thread
//! 2. Publishes each frame into a single-slot latest-frame cell
//! 3. Serves the HTTP control/preview surface (scan trigger, inventory,
//!    status, MJPEG stream)
//! 4. On a scan request, snapshots "before", waits out the scan window,
//!    snapshots "after", and reconciles the two detection sets
//! 5. Applies the resulting deltas to the inventory store and saves it
//!
//! The main loop is the single writer of the store file.

use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shelfscan::{
    api::{ApiConfig, ApiServer},
    backend_from_name, reconcile, CameraConfig, CameraSource, ClassMap, Detection, DetectorBackend,
    Frame, InventoryStore, ScanStatus, ScanTimer, ScannerConfig, ScannerState,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = ScannerConfig::load()?;

    let class_map = match &cfg.classmap_path {
        Some(path) => ClassMap::load(path)?,
        None => ClassMap::builtin(),
    };
    let inventory = InventoryStore::load(Path::new(&cfg.inventory_path));

    let mut backend = backend_from_name(&cfg.backend)?;
    backend.warm_up()?;

    log::info!("scannerd running. inventory at {}", cfg.inventory_path);
    log::info!(
        "backend={}, classes={}, scan window={}s, camera={}",
        backend.name(),
        class_map.len(),
        cfg.scan_duration.as_secs(),
        cfg.camera.device
    );

    let state = Arc::new(ScannerState::new(inventory));

    let api_handle = ApiServer::new(
        ApiConfig {
            addr: cfg.api_addr.clone(),
        },
        state.clone(),
    )
    .spawn()?;
    log::info!("scanner api listening on {}", api_handle.addr);

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrlc = running.clone();
    ctrlc::set_handler(move || {
        running_ctrlc.store(false, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    let camera_config = cfg.camera.clone();
    let camera_state = state.clone();
    let camera_running = running.clone();
    let camera_thread = std::thread::spawn(move || {
        if let Err(err) = run_camera(camera_config, camera_state, camera_running) {
            log::error!("camera loop stopped: {}", err);
        }
    });

    let mut timer = ScanTimer::new(cfg.scan_duration);

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();

        if state.take_scan_request() {
            match state.latest.snapshot() {
                Some(before) => {
                    timer.start_scan(before, now);
                }
                None => log::warn!("scan requested but no frame has been captured yet"),
            }
        }

        if let Some(before) = timer.take_expired(now) {
            match state.latest.snapshot() {
                Some(after) => {
                    if let Err(err) =
                        run_cycle(backend.as_mut(), &class_map, &cfg, &state, &before, &after)
                    {
                        log::error!("reconciliation cycle failed: {}", err);
                    }
                }
                None => log::warn!("no frame available for the after snapshot"),
            }
            timer.complete();
        }

        state.set_scan_status(ScanStatus {
            phase: timer.phase(),
            remaining: timer.remaining(now),
        });

        std::thread::sleep(Duration::from_millis(50));
    }

    log::info!("shutdown signal received, stopping...");
    api_handle.stop()?;
    camera_thread
        .join()
        .map_err(|_| anyhow!("camera thread panicked"))?;

    log::info!(
        "final inventory: {}",
        serde_json::to_string(&state.inventory_snapshot())?
    );
    Ok(())
}

fn run_camera(
    config: CameraConfig,
    state: Arc<ScannerState>,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let mut source = CameraSource::new(config.clone())?;
    source.connect()?;

    let frame_interval = Duration::from_millis(u64::from(1000 / config.target_fps.max(1)));
    let mut last_health_log = Instant::now();

    while running.load(Ordering::SeqCst) {
        let frame = source.next_frame()?;
        state.latest.publish(frame);

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::debug!(
                "camera health={} frames={} device={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.device
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(frame_interval);
    }
    Ok(())
}

fn run_cycle(
    backend: &mut dyn DetectorBackend,
    class_map: &ClassMap,
    cfg: &ScannerConfig,
    state: &Arc<ScannerState>,
    before: &Frame,
    after: &Frame,
) -> Result<()> {
    let before_detections = detect_frame(backend, before, cfg.min_confidence)?;
    let after_detections = detect_frame(backend, after, cfg.min_confidence)?;
    log::info!(
        "analyzing: {} objects before, {} after",
        before_detections.len(),
        after_detections.len()
    );

    let changes = reconcile(&before_detections, &after_detections, class_map);

    let current = state.inventory_snapshot();
    let updated = current.apply(&changes);
    updated.save(Path::new(&cfg.inventory_path))?;
    state.set_inventory(updated);

    if changes.is_empty() {
        log::info!("no inventory changes to report");
    } else {
        log::info!("cycle changes: {}", serde_json::to_string(&changes)?);
    }
    Ok(())
}

fn detect_frame(
    backend: &mut dyn DetectorBackend,
    frame: &Frame,
    min_confidence: f32,
) -> Result<Vec<Detection>> {
    let mut detections = backend.detect(&frame.pixels, frame.width, frame.height)?;
    let raw = detections.len();
    detections.retain(|det| det.confidence >= min_confidence);
    if detections.len() < raw {
        log::debug!(
            "dropped {} low-confidence detections",
            raw - detections.len()
        );
    }
    Ok(detections)
}
