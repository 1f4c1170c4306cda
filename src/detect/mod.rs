mod backend;
mod backends;
mod result;

use anyhow::{anyhow, Result};

pub use backend::DetectorBackend;
pub use backends::SyntheticBackend;
pub use result::Detection;

/// Build the detector backend named in configuration.
///
/// Real detector integrations (ONNX runtimes, remote inference services)
/// plug in here as further arms.
pub fn backend_from_name(name: &str) -> Result<Box<dyn DetectorBackend>> {
    match name {
        "synthetic" => Ok(Box::new(SyntheticBackend::new())),
        other => Err(anyhow!("unknown detector backend '{}'", other)),
    }
}
