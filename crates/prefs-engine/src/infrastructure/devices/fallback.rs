//! Catalog for platforms without a device probe.

use prefs_core::{DeviceCatalog, GpuDevice};

/// Reports no GPUs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl EmptyCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceCatalog for EmptyCatalog {
    fn gpu_devices(&self) -> Vec<GpuDevice> {
        Vec::new()
    }
}
