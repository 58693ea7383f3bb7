//! prefs-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the `prefsctl` binary share the same module tree.
//!
//! # Layers
//!
//! - **`application`** – the override resolver and persister, change
//!   notification, application-wide settings and the [`Settings`] handle.
//!   Depends only on `prefs-core` and on ports it declares itself.
//! - **`infrastructure`** – filesystem-facing adapters: the TOML settings
//!   file, platform directories, model-path probing, device catalogs.
//! - **`config`** – runtime configuration of the engine process.

pub mod application;
pub mod config;
pub mod infrastructure;

pub use application::app_settings::{AppSetting, ApplicationSettings, DeviceResolution};
pub use application::notify::{ChangeEvent, ChangeNotifier};
pub use application::persist::{OverridePersister, PersistAction, SetOutcome};
pub use application::resolve::OverrideResolver;
pub use application::settings::Settings;
pub use application::PathResolver;
