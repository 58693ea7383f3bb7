//! # prefs-core
//!
//! Shared domain library for ModelPrefs: the settings engine that stores
//! user overrides for a collection of selectable model profiles and for a
//! handful of process-wide application settings.
//!
//! This crate has zero dependencies on the filesystem, UI frameworks or any
//! concrete storage backend.
//!
//! # Architecture overview
//!
//! Every model profile ships compiled-in defaults for each of its settable
//! fields.  The user may override any of them; overrides are persisted in a
//! flat key/value store under `model-<id>/<field>` keys.  This crate defines
//! the vocabulary the engine works with:
//!
//! - **`domain::value`** – `SettingValue`, the typed scalar held by the store,
//!   and the permissive coercion rules used when a stored value has the
//!   wrong type.
//!
//! - **`domain::profile`** – `ModelProfile`, the identity plus defaults of
//!   one model.
//!
//! - **`domain::field`** – the static per-model field table: which storage
//!   key and value kind belong to each overridable field.
//!
//! - **`domain::device`** – compute-device selection names and the migration
//!   of historical spellings.
//!
//! - **`store`** – the `KeyValueStore` port and an in-memory implementation.

pub mod domain;
pub mod keys;
pub mod store;

pub use domain::device::{
    migrate_selection_name, DeviceCatalog, GpuDevice, AUTO_DEVICE, CPU_DEVICE, METAL_DEVICE,
};
pub use domain::field::{FieldError, ModelField};
pub use domain::hardware::HardwareInfo;
pub use domain::profile::{ModelDefaults, ModelProfile};
pub use domain::value::{SettingValue, ValueKind, ValueParseError};
pub use store::memory::MemoryStore;
pub use store::KeyValueStore;
