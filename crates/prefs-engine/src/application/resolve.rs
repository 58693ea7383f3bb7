//! Use case: compute the effective value of a per-model field.
//!
//! The effective value is the stored override under `model-<id>/<field>`
//! when one exists, coerced to the field's declared kind, and the profile's
//! compiled-in default otherwise.  Resolution never writes and never fails.

use prefs_core::{KeyValueStore, ModelField, ModelProfile, SettingValue};

/// Reads per-model overrides from a store.
#[derive(Clone, Copy)]
pub struct OverrideResolver<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Returns the effective value of `field` for `profile`.
    ///
    /// A stored value of the wrong type is coerced; one that cannot be
    /// interpreted at all yields the kind's zero value.
    pub fn resolve(&self, profile: &ModelProfile, field: ModelField) -> SettingValue {
        match self.store.get(&field.storage_key(&profile.id)) {
            Some(stored) => stored.coerce(field.kind()),
            None => profile.defaults.value(field),
        }
    }

    /// Returns `true` if an override for `field` is stored.
    pub fn has_override(&self, profile: &ModelProfile, field: ModelField) -> bool {
        self.store.contains(&field.storage_key(&profile.id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
