//! Compute-device catalogs.
//!
//! The application layer sees devices through
//! [`prefs_core::DeviceCatalog`].  This module provides the host's catalog,
//! selected at compile time and re-exported as `NativeDeviceCatalog`:
//!
//! | Module     | OS     | Source                                   |
//! |------------|--------|------------------------------------------|
//! | `linux`    | Linux  | `/proc/driver/nvidia/gpus/*/information` |
//! | `fallback` | others | none; only "Auto" and "CPU" are offered  |
//!
//! Apple-silicon Macs never consult a catalog: their single Metal device is
//! added by the application layer.
//!
//! [`StaticDeviceCatalog`] is always compiled so tests and the CLI can
//! supply a fixed list.

use prefs_core::{DeviceCatalog, GpuDevice};

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::NvidiaProcCatalog as NativeDeviceCatalog;

#[cfg(not(target_os = "linux"))]
pub mod fallback;

#[cfg(not(target_os = "linux"))]
pub use fallback::EmptyCatalog as NativeDeviceCatalog;

/// A catalog that always reports the same devices.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceCatalog {
    pub devices: Vec<GpuDevice>,
}

impl StaticDeviceCatalog {
    pub fn new(devices: Vec<GpuDevice>) -> Self {
        Self { devices }
    }

    /// Parses `backend:name` pairs separated by commas, e.g.
    /// `cuda:RTX 4090,kompute:Arc A770`.  Entries without a backend are
    /// treated as Vulkan devices.
    pub fn parse(spec: &str) -> Self {
        let devices = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((backend, name)) => GpuDevice::new(backend.trim(), name.trim()),
                None => GpuDevice::new("kompute", entry),
            })
            .collect();
        Self { devices }
    }
}

impl DeviceCatalog for StaticDeviceCatalog {
    fn gpu_devices(&self) -> Vec<GpuDevice> {
        self.devices.clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_returns_its_devices() {
        let catalog = StaticDeviceCatalog::new(vec![GpuDevice::new("cuda", "A100")]);

        assert_eq!(catalog.gpu_devices(), vec![GpuDevice::new("cuda", "A100")]);
    }

    #[test]
    fn test_parse_reads_backend_name_pairs() {
        let catalog = StaticDeviceCatalog::parse("cuda:RTX 4090, kompute:Arc A770,");

        assert_eq!(
            catalog.gpu_devices(),
            vec![
                GpuDevice::new("cuda", "RTX 4090"),
                GpuDevice::new("kompute", "Arc A770"),
            ]
        );
    }

    #[test]
    fn test_parse_defaults_backend_to_vulkan() {
        let catalog = StaticDeviceCatalog::parse("Radeon RX 6600");

        assert_eq!(catalog.devices[0].selection_name(), "Vulkan: Radeon RX 6600");
    }

    #[test]
    fn test_parse_empty_spec_has_no_devices() {
        assert!(StaticDeviceCatalog::parse("").gpu_devices().is_empty());
    }
}
