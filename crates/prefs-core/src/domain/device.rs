//! Compute-device selection names.
//!
//! The device setting stores a *selection name*: `"Auto"`, `"CPU"`,
//! `"Metal"`, or `"<Backend>: <device name>"` for a GPU.  Older releases
//! stored bare GPU names because every GPU went through the Vulkan backend;
//! [`migrate_selection_name`] rewrites those to the current spelling.

/// Always the first entry of the device list.
pub const AUTO_DEVICE: &str = "Auto";
/// Always the last entry of the device list.
pub const CPU_DEVICE: &str = "CPU";
/// The single accelerator exposed on Apple-silicon macOS.
pub const METAL_DEVICE: &str = "Metal";

/// Backend identifiers and the labels they use in selection names.
const BACKEND_LABELS: [(&str, &str); 2] = [("cuda", "CUDA"), ("kompute", "Vulkan")];

/// A GPU reported by a [`DeviceCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuDevice {
    /// Backend identifier, e.g. `"cuda"` or `"kompute"`.
    pub backend: String,
    /// Human-readable device name as reported by the driver.
    pub name: String,
}

impl GpuDevice {
    pub fn new(backend: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            name: name.into(),
        }
    }

    /// Label shown for this device's backend (`"CUDA"`, `"Vulkan"`).
    ///
    /// Unknown backends are shown as-is.
    pub fn backend_label(&self) -> &str {
        BACKEND_LABELS
            .iter()
            .find(|(id, _)| *id == self.backend)
            .map(|(_, label)| *label)
            .unwrap_or(self.backend.as_str())
    }

    /// The name stored in the `device` setting when this GPU is selected.
    pub fn selection_name(&self) -> String {
        format!("{}: {}", self.backend_label(), self.name)
    }
}

/// Enumerates the GPUs available to the inference backend.
///
/// Implemented by the infrastructure layer; tests use a mock.
pub trait DeviceCatalog: Send + Sync {
    /// Returns the available GPUs in backend preference order.
    fn gpu_devices(&self) -> Vec<GpuDevice>;
}

/// Maps a historical device selection name to its current spelling.
///
/// Returns the input unchanged when it is already current.
pub fn migrate_selection_name(name: &str) -> String {
    if name == AUTO_DEVICE || name == CPU_DEVICE || name == METAL_DEVICE {
        return name.to_string();
    }
    let has_backend_prefix = BACKEND_LABELS
        .iter()
        .any(|(_, label)| name.strip_prefix(label).is_some_and(|rest| rest.starts_with(": ")));
    if has_backend_prefix {
        return name.to_string();
    }
    // Before multiple backends existed, every GPU was a Vulkan device.
    format!("Vulkan: {name}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
