//! Application layer of the settings engine.
//!
//! Use cases in this layer orchestrate the domain types from `prefs-core`
//! against a [`prefs_core::KeyValueStore`].  They contain no filesystem
//! access of their own: anything that needs the OS goes through a trait
//! declared here ([`PathResolver`]) or in the domain
//! ([`prefs_core::DeviceCatalog`]) and implemented in `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`resolve`** – `OverrideResolver`: stored override or profile default.
//! - **`persist`** – `OverridePersister`: the collapsing write (store, remove
//!   or skip) and the change notification that follows it.
//! - **`notify`** – synchronous change notification (callbacks + channels).
//! - **`app_settings`** – process-wide settings, thread-count clamping, the
//!   legacy model-path migration and the device-name migration.
//! - **`settings`** – the `Settings` handle that wires the above together.

pub mod app_settings;
pub mod notify;
pub mod persist;
pub mod resolve;
pub mod settings;

/// Filesystem knowledge the model-path setting needs.
///
/// Implemented by `infrastructure::storage::paths::FsPathResolver`.
pub trait PathResolver: Send + Sync {
    /// Default model directory, with a trailing separator.
    ///
    /// May create the directory.  Must not fail: problems are logged and
    /// the (possibly unusable) path is returned anyway.
    fn default_models_path(&self) -> String;

    /// Normalizes a user-supplied directory (bare path or `file://` URL)
    /// to a canonical absolute path with a trailing separator.
    fn normalize(&self, raw: &str) -> String;
}
