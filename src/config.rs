use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::CameraConfig;

const DEFAULT_INVENTORY_PATH: &str = "inventory.json";
const DEFAULT_BACKEND: &str = "synthetic";
const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;
const DEFAULT_SCAN_SECS: u64 = 10;
const DEFAULT_API_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_CAMERA_DEVICE: &str = "stub://shelf";
const DEFAULT_CAMERA_FPS: u32 = 10;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;

#[derive(Debug, Deserialize, Default)]
struct ScannerConfigFile {
    inventory_path: Option<String>,
    classmap_path: Option<PathBuf>,
    backend: Option<String>,
    min_confidence: Option<f32>,
    scan: Option<ScanConfigFile>,
    api: Option<ApiConfigFile>,
    camera: Option<CameraConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ScanConfigFile {
    duration_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Resolved scanner configuration.
///
/// Sources, in order: JSON config file named by `SHELFSCAN_CONFIG` (all
/// fields optional), then `SHELFSCAN_*` environment overrides, then
/// validation.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub inventory_path: String,
    /// When absent, the builtin demo class map is used.
    pub classmap_path: Option<PathBuf>,
    pub backend: String,
    /// Adapter-side confidence floor; detections below it never reach the
    /// reconciliation engine.
    pub min_confidence: f32,
    pub scan_duration: Duration,
    pub api_addr: String,
    pub camera: CameraConfig,
}

impl ScannerConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SHELFSCAN_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ScannerConfigFile) -> Self {
        let camera = CameraConfig {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_DEVICE.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_CAMERA_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
        };
        Self {
            inventory_path: file
                .inventory_path
                .unwrap_or_else(|| DEFAULT_INVENTORY_PATH.to_string()),
            classmap_path: file.classmap_path,
            backend: file.backend.unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            min_confidence: file.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
            scan_duration: Duration::from_secs(
                file.scan
                    .and_then(|scan| scan.duration_secs)
                    .unwrap_or(DEFAULT_SCAN_SECS),
            ),
            api_addr: file
                .api
                .and_then(|api| api.addr)
                .unwrap_or_else(|| DEFAULT_API_ADDR.to_string()),
            camera,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("SHELFSCAN_INVENTORY_PATH") {
            if !path.trim().is_empty() {
                self.inventory_path = path;
            }
        }
        if let Ok(path) = std::env::var("SHELFSCAN_CLASSMAP_PATH") {
            if !path.trim().is_empty() {
                self.classmap_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(backend) = std::env::var("SHELFSCAN_BACKEND") {
            if !backend.trim().is_empty() {
                self.backend = backend;
            }
        }
        if let Ok(addr) = std::env::var("SHELFSCAN_API_ADDR") {
            if !addr.trim().is_empty() {
                self.api_addr = addr;
            }
        }
        if let Ok(device) = std::env::var("SHELFSCAN_CAMERA_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(secs) = std::env::var("SHELFSCAN_SCAN_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| anyhow!("SHELFSCAN_SCAN_SECS must be an integer number of seconds"))?;
            self.scan_duration = Duration::from_secs(secs);
        }
        if let Ok(confidence) = std::env::var("SHELFSCAN_MIN_CONFIDENCE") {
            let confidence: f32 = confidence
                .parse()
                .map_err(|_| anyhow!("SHELFSCAN_MIN_CONFIDENCE must be a number"))?;
            self.min_confidence = confidence;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.scan_duration.as_secs() == 0 {
            return Err(anyhow!("scan duration must be greater than zero"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(anyhow!("min_confidence must be within [0, 1]"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ScannerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
