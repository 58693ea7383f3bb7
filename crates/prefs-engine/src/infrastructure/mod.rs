//! Infrastructure layer of the settings engine.
//!
//! Contains filesystem-facing adapters: the TOML settings file, platform
//! directory lookup, model-path probing and normalization, and the host's
//! device catalog.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `prefs_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod devices;
pub mod storage;
