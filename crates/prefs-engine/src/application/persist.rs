//! Use case: write a per-model field, collapsing overrides that equal the
//! default.
//!
//! # Algorithm
//!
//! 1. The new value is coerced to the field's kind.
//! 2. Unless `force` is set, the write is skipped entirely (no store access,
//!    no notification) when the field already resolves to the new value.
//!    Profiles with an empty id never skip here.
//! 3. A value equal to the profile default is removed from the store unless
//!    the profile saves its metadata; anything else is written.
//! 4. Unless `force` is set, a [`ChangeEvent::Model`] is emitted.
//!
//! `force` exists for bulk restores: the caller applies many fields without
//! individual notifications and sends one aggregate event afterwards.

use prefs_core::{KeyValueStore, ModelField, ModelProfile, SettingValue};
use tracing::debug;

use crate::application::notify::{ChangeEvent, ChangeNotifier};
use crate::application::resolve::OverrideResolver;

/// What a call to [`OverridePersister::set`] did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistAction {
    /// Nothing was written or removed.
    Skipped,
    /// The override was stored.
    Written,
    /// An existing override was deleted; the field resolves to its default.
    Removed,
}

/// Result of a persister write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutcome {
    pub action: PersistAction,
    /// A change event was emitted.
    pub notified: bool,
}

impl SetOutcome {
    /// Returns `true` if the store was mutated.
    pub fn persisted(&self) -> bool {
        self.action != PersistAction::Skipped
    }

    const SHORT_CIRCUIT: SetOutcome = SetOutcome {
        action: PersistAction::Skipped,
        notified: false,
    };
}

/// Writes per-model overrides and reports the changes.
pub struct OverridePersister<'a> {
    store: &'a dyn KeyValueStore,
    notifier: &'a ChangeNotifier,
}

impl<'a> OverridePersister<'a> {
    pub fn new(store: &'a dyn KeyValueStore, notifier: &'a ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// Sets `field` of `profile` to `value`.
    ///
    /// Never fails: out-of-range numbers are stored as given.
    pub fn set(
        &self,
        profile: &ModelProfile,
        field: ModelField,
        value: SettingValue,
        force: bool,
    ) -> SetOutcome {
        let value = value.coerce(field.kind());
        let key = field.storage_key(&profile.id);

        if !force && !profile.is_anonymous() {
            let current = OverrideResolver::new(self.store).resolve(profile, field);
            if current.same_as(&value) {
                debug!("{key} already {value}, skipping");
                return SetOutcome::SHORT_CIRCUIT;
            }
        }

        let collapses =
            !profile.should_save_metadata && profile.defaults.matches_default(field, &value);

        let action = if collapses {
            if self.store.contains(&key) {
                debug!("{key} equals default, removing override");
                self.store.remove(&key);
                PersistAction::Removed
            } else {
                PersistAction::Skipped
            }
        } else {
            debug!("{key} = {value}");
            self.store.set(&key, value);
            PersistAction::Written
        };

        let notified = !force;
        if notified {
            self.notifier.emit(ChangeEvent::Model {
                field,
                profile_id: profile.id.clone(),
            });
        }

        SetOutcome { action, notified }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
