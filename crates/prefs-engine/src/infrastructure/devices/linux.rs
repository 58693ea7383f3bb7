//! Linux device probe via the NVIDIA driver's procfs entries.
//!
//! Each GPU driven by the proprietary NVIDIA driver has a directory under
//! `/proc/driver/nvidia/gpus/` whose `information` file contains a line
//! such as:
//!
//! ```text
//! Model:           NVIDIA GeForce RTX 3060
//! ```
//!
//! Every such GPU is reported as a CUDA device.  Machines without the
//! driver report nothing.

use std::fs;
use std::path::PathBuf;

use prefs_core::{DeviceCatalog, GpuDevice};
use tracing::debug;

const NVIDIA_PROC_ROOT: &str = "/proc/driver/nvidia/gpus";

/// Linux implementation of [`DeviceCatalog`].
#[derive(Debug, Clone)]
pub struct NvidiaProcCatalog {
    root: PathBuf,
}

impl NvidiaProcCatalog {
    pub fn new() -> Self {
        Self::with_root(NVIDIA_PROC_ROOT)
    }

    /// Reads GPU directories from `root` instead of procfs.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for NvidiaProcCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCatalog for NvidiaProcCatalog {
    fn gpu_devices(&self) -> Vec<GpuDevice> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("no NVIDIA GPUs at {}: {e}", self.root.display());
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        // PCI bus order
        dirs.sort();

        dirs.iter()
            .filter_map(|dir| fs::read_to_string(dir.join("information")).ok())
            .filter_map(|info| model_name(&info))
            .map(|name| GpuDevice::new("cuda", name))
            .collect()
    }
}

fn model_name(information: &str) -> Option<String> {
    information
        .lines()
        .find_map(|line| line.strip_prefix("Model:"))
        .map(|rest| rest.trim().to_string())
        .filter(|name| !name.is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_model_name_is_read_from_information() {
        let info = "Model: \t\t NVIDIA GeForce RTX 3060\nIRQ:   \t\t 150\n";

        assert_eq!(model_name(info).as_deref(), Some("NVIDIA GeForce RTX 3060"));
    }

    #[test]
    fn test_missing_root_reports_no_devices() {
        let catalog = NvidiaProcCatalog::with_root("/nonexistent/prefs/gpus");

        assert!(catalog.gpu_devices().is_empty());
    }

    #[test]
    fn test_gpus_are_reported_in_bus_order() {
        // Arrange: two fake GPU directories, created out of order
        let root = std::env::temp_dir().join(format!("prefs-gpus-{}", Uuid::new_v4()));
        for (bus, model) in [("0000:02:00.0", "Tesla T4"), ("0000:01:00.0", "RTX A6000")] {
            let dir = root.join(bus);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("information"), format!("Model: \t {model}\n")).unwrap();
        }

        // Act
        let devices = NvidiaProcCatalog::with_root(&root).gpu_devices();

        // Assert
        assert_eq!(
            devices,
            vec![
                GpuDevice::new("cuda", "RTX A6000"),
                GpuDevice::new("cuda", "Tesla T4"),
            ]
        );
        let _ = fs::remove_dir_all(&root);
    }
}
