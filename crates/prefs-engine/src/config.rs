//! Runtime configuration of the settings engine.
//!
//! [`EngineConfig`] says where the settings file lives and where models go
//! by default.  It is a plain struct: the binary fills it from command-line
//! flags and environment variables, tests build it by hand.

use std::path::PathBuf;
use std::sync::Arc;

use prefs_core::HardwareInfo;

use crate::application::settings::Settings;
use crate::infrastructure::devices::NativeDeviceCatalog;
use crate::infrastructure::storage::paths::{platform_data_dir, settings_file_path};
use crate::infrastructure::storage::{FsPathResolver, TomlFileStore};

/// Log filter used when neither `RUST_LOG` nor a flag sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Where the engine keeps its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// The TOML settings file.
    pub settings_file: PathBuf,
    /// Default model directory, probed when no model path is stored.
    pub data_dir: PathBuf,
    /// `tracing` filter directive, e.g. `"warn"` or `"prefs_engine=debug"`.
    pub log_level: String,
}

impl Default for EngineConfig {
    /// Platform directories, falling back to the working directory on
    /// platforms without them.
    fn default() -> Self {
        Self {
            settings_file: settings_file_path().unwrap_or_else(|_| PathBuf::from("settings.toml")),
            data_dir: platform_data_dir().unwrap_or_else(|| PathBuf::from("models")),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Wires a [`Settings`] engine over the configured file and directory,
    /// with host hardware limits and the native device catalog.
    pub fn open(&self) -> Settings {
        let store = Arc::new(TomlFileStore::new(&self.settings_file));
        let paths = Arc::new(FsPathResolver::new(&self.data_dir));
        Settings::new(store, paths, HardwareInfo::detect()).with_devices(&NativeDeviceCatalog::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
