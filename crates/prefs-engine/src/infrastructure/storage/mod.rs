//! Storage infrastructure: the settings file and the directories around it.
//!
//! - `file_store` – [`file_store::TomlFileStore`], the durable
//!   [`prefs_core::KeyValueStore`].
//! - `paths` – platform config/data directories and
//!   [`paths::FsPathResolver`], the filesystem side of the model-path
//!   setting.
//! - `profiles` – model profiles read from TOML files.

pub mod file_store;
pub mod paths;
pub mod profiles;

pub use file_store::{StoreError, TomlFileStore};
pub use paths::FsPathResolver;
pub use profiles::{load_profile, ProfileError};
