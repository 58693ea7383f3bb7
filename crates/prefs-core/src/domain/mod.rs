//! Domain entities for ModelPrefs.
//!
//! This module contains pure business rules with no infrastructure
//! dependencies: what a setting value is, what a model profile carries, and
//! which storage key belongs to which field.  Outer layers (the resolver and
//! persister in `prefs-engine`, the file-backed store, the CLI) depend on
//! these types; nothing here depends on them.

pub mod device;
pub mod field;
pub mod hardware;
pub mod profile;
pub mod value;
