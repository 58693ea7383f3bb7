//! The settings engine handle.
//!
//! [`Settings`] is constructed once per process and passed by reference (or
//! cloned `Arc`) to whatever needs it.  It owns the store, the notifier and
//! the [`ApplicationSettings`], and exposes the per-model operations on top
//! of [`OverrideResolver`] and [`OverridePersister`].

use std::sync::Arc;

use prefs_core::{
    keys, DeviceCatalog, HardwareInfo, KeyValueStore, ModelField, ModelProfile, SettingValue,
};
use tracing::debug;

use crate::application::app_settings::ApplicationSettings;
use crate::application::notify::{ChangeEvent, ChangeNotifier};
use crate::application::persist::{OverridePersister, SetOutcome};
use crate::application::resolve::OverrideResolver;
use crate::application::PathResolver;

/// Entry point to every setting, per-model and application-wide.
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<ChangeNotifier>,
    app: ApplicationSettings,
}

impl Settings {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        paths: Arc<dyn PathResolver>,
        hardware: HardwareInfo,
    ) -> Self {
        let notifier = Arc::new(ChangeNotifier::new());
        let app = ApplicationSettings::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            paths,
            hardware,
        );
        Self {
            store,
            notifier,
            app,
        }
    }

    /// Populates the device list from `catalog`.
    pub fn with_devices(self, catalog: &dyn DeviceCatalog) -> Self {
        self.app.refresh_device_list(catalog);
        self
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Application-wide settings.
    pub fn app(&self) -> &ApplicationSettings {
        &self.app
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Effective value of `field` for `profile`.
    pub fn resolve(&self, profile: &ModelProfile, field: ModelField) -> SettingValue {
        OverrideResolver::new(self.store.as_ref()).resolve(profile, field)
    }

    /// Sets `field` of `profile`; see [`OverridePersister::set`].
    pub fn set(
        &self,
        profile: &ModelProfile,
        field: ModelField,
        value: impl Into<SettingValue>,
        force: bool,
    ) -> SetOutcome {
        OverridePersister::new(self.store.as_ref(), &self.notifier).set(
            profile,
            field,
            value.into(),
            force,
        )
    }

    /// Resets the generation parameters of `profile` to its defaults.
    ///
    /// Fields are written in force mode and a single
    /// [`ChangeEvent::ModelRestored`] follows.
    pub fn restore_model_defaults(&self, profile: &ModelProfile) {
        let persister = OverridePersister::new(self.store.as_ref(), &self.notifier);
        for field in ModelField::GENERATION {
            persister.set(profile, field, profile.defaults.value(field), true);
        }
        self.notifier.emit(ChangeEvent::ModelRestored {
            profile_id: profile.id.clone(),
        });
    }

    /// Deletes every stored override of `profile`.
    pub fn erase_model(&self, profile: &ModelProfile) {
        debug!("erasing overrides of model {:?}", profile.id);
        self.store.remove_group(&keys::model_group(&profile.id));
    }

    /// Fields of `profile` that currently have a stored override.
    pub fn overrides(&self, profile: &ModelProfile) -> Vec<ModelField> {
        let resolver = OverrideResolver::new(self.store.as_ref());
        ModelField::ALL
            .into_iter()
            .filter(|&field| resolver.has_override(profile, field))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
