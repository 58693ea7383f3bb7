//! Use case: process-wide application settings.
//!
//! Most settings follow one pattern: the getter returns the stored value
//! coerced to the setting's kind (or the default when absent) and the setter
//! writes only when the resolved value differs, then emits
//! [`ChangeEvent::App`].  A few settings carry extra rules:
//!
//! - **Thread count** is normalized on every read and write (see
//!   [`HardwareInfo::normalize_thread_count`]).
//! - **Model path** migrates the legacy `modelPaths` key on read, takes its
//!   default from the [`PathResolver`], and normalizes input on write.
//! - **Device** rewrites historical selection names; see
//!   [`ApplicationSettings::resolve_and_migrate_device`].
//! - **Network active / usage stats active** compare against the raw stored
//!   value so that "never set" and "set to false" stay distinguishable.
//!
//! The device list and the force-metal flag live in memory only.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use prefs_core::{
    keys, migrate_selection_name, DeviceCatalog, FieldError, HardwareInfo, KeyValueStore,
    SettingValue, ValueKind, AUTO_DEVICE, CPU_DEVICE, METAL_DEVICE,
};
use tracing::{debug, info, warn};

use crate::application::notify::{ChangeEvent, ChangeNotifier};
use crate::application::PathResolver;

/// Compiled-in defaults of the application settings.
pub mod defaults {
    pub const CHAT_THEME: &str = "Dark";
    pub const FONT_SIZE: &str = "Small";
    pub const DEVICE: &str = prefs_core::AUTO_DEVICE;
    pub const SAVE_CHATS_CONTEXT: bool = false;
    pub const SERVER_CHAT: bool = false;
    pub const NETWORK_PORT: i64 = 4891;
    pub const USER_DEFAULT_MODEL: &str = "Application default";
    pub const LAST_VERSION_STARTED: &str = "";
    pub const LOCAL_DOCS_CHUNK_SIZE: i64 = 256;
    pub const LOCAL_DOCS_RETRIEVAL_SIZE: i64 = 3;
    pub const LOCAL_DOCS_SHOW_REFERENCES: bool = true;
    pub const NETWORK_ATTRIBUTION: &str = "";
    pub const NETWORK_IS_ACTIVE: bool = false;
    pub const NETWORK_USAGE_STATS_ACTIVE: bool = false;
    pub const FORCE_METAL: bool = false;
}

/// A persisted process-wide setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppSetting {
    ChatTheme,
    FontSize,
    Device,
    ThreadCount,
    SaveChatsContext,
    ServerChat,
    NetworkPort,
    ModelPath,
    UserDefaultModel,
    LastVersionStarted,
    LocalDocsChunkSize,
    LocalDocsRetrievalSize,
    LocalDocsShowReferences,
    NetworkAttribution,
    NetworkIsActive,
    NetworkUsageStatsActive,
}

impl AppSetting {
    pub const ALL: [AppSetting; 16] = [
        AppSetting::ChatTheme,
        AppSetting::FontSize,
        AppSetting::Device,
        AppSetting::ThreadCount,
        AppSetting::SaveChatsContext,
        AppSetting::ServerChat,
        AppSetting::NetworkPort,
        AppSetting::ModelPath,
        AppSetting::UserDefaultModel,
        AppSetting::LastVersionStarted,
        AppSetting::LocalDocsChunkSize,
        AppSetting::LocalDocsRetrievalSize,
        AppSetting::LocalDocsShowReferences,
        AppSetting::NetworkAttribution,
        AppSetting::NetworkIsActive,
        AppSetting::NetworkUsageStatsActive,
    ];

    /// Storage key of this setting.
    pub fn key(self) -> &'static str {
        match self {
            AppSetting::ChatTheme => keys::CHAT_THEME,
            AppSetting::FontSize => keys::FONT_SIZE,
            AppSetting::Device => keys::DEVICE,
            AppSetting::ThreadCount => keys::THREAD_COUNT,
            AppSetting::SaveChatsContext => keys::SAVE_CHATS_CONTEXT,
            AppSetting::ServerChat => keys::SERVER_CHAT,
            AppSetting::NetworkPort => keys::NETWORK_PORT,
            AppSetting::ModelPath => keys::MODEL_PATH,
            AppSetting::UserDefaultModel => keys::USER_DEFAULT_MODEL,
            AppSetting::LastVersionStarted => keys::LAST_VERSION_STARTED,
            AppSetting::LocalDocsChunkSize => keys::LOCAL_DOCS_CHUNK_SIZE,
            AppSetting::LocalDocsRetrievalSize => keys::LOCAL_DOCS_RETRIEVAL_SIZE,
            AppSetting::LocalDocsShowReferences => keys::LOCAL_DOCS_SHOW_REFERENCES,
            AppSetting::NetworkAttribution => keys::NETWORK_ATTRIBUTION,
            AppSetting::NetworkIsActive => keys::NETWORK_IS_ACTIVE,
            AppSetting::NetworkUsageStatsActive => keys::NETWORK_USAGE_STATS_ACTIVE,
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            AppSetting::ThreadCount
            | AppSetting::NetworkPort
            | AppSetting::LocalDocsChunkSize
            | AppSetting::LocalDocsRetrievalSize => ValueKind::Int,
            AppSetting::SaveChatsContext
            | AppSetting::ServerChat
            | AppSetting::LocalDocsShowReferences
            | AppSetting::NetworkIsActive
            | AppSetting::NetworkUsageStatsActive => ValueKind::Bool,
            _ => ValueKind::Text,
        }
    }

    /// The compiled-in default, for settings that have a fixed one.
    ///
    /// Thread count and model path depend on the host and return `None`.
    fn fixed_default(self) -> Option<SettingValue> {
        let value: SettingValue = match self {
            AppSetting::ChatTheme => defaults::CHAT_THEME.into(),
            AppSetting::FontSize => defaults::FONT_SIZE.into(),
            AppSetting::Device => defaults::DEVICE.into(),
            AppSetting::SaveChatsContext => defaults::SAVE_CHATS_CONTEXT.into(),
            AppSetting::ServerChat => defaults::SERVER_CHAT.into(),
            AppSetting::NetworkPort => defaults::NETWORK_PORT.into(),
            AppSetting::UserDefaultModel => defaults::USER_DEFAULT_MODEL.into(),
            AppSetting::LastVersionStarted => defaults::LAST_VERSION_STARTED.into(),
            AppSetting::LocalDocsChunkSize => defaults::LOCAL_DOCS_CHUNK_SIZE.into(),
            AppSetting::LocalDocsRetrievalSize => defaults::LOCAL_DOCS_RETRIEVAL_SIZE.into(),
            AppSetting::LocalDocsShowReferences => defaults::LOCAL_DOCS_SHOW_REFERENCES.into(),
            AppSetting::NetworkAttribution => defaults::NETWORK_ATTRIBUTION.into(),
            AppSetting::NetworkIsActive => defaults::NETWORK_IS_ACTIVE.into(),
            AppSetting::NetworkUsageStatsActive => defaults::NETWORK_USAGE_STATS_ACTIVE.into(),
            AppSetting::ThreadCount | AppSetting::ModelPath => return None,
        };
        Some(value)
    }
}

impl fmt::Display for AppSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AppSetting {
    type Err = FieldError;

    /// Parses a storage key, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppSetting::ALL
            .into_iter()
            .find(|setting| setting.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| FieldError::UnknownSetting(s.to_string()))
    }
}

/// Result of reading the device setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResolution {
    /// The selection name now in effect.
    pub name: String,
    /// The historical spelling that was found and rewritten, if any.
    pub migrated_from: Option<String>,
}

/// Process-wide settings backed by a [`KeyValueStore`].
pub struct ApplicationSettings {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<ChangeNotifier>,
    paths: Arc<dyn PathResolver>,
    hardware: HardwareInfo,
    device_list: Mutex<Vec<String>>,
    force_metal: AtomicBool,
}

impl ApplicationSettings {
    /// Creates the settings over `store`.
    ///
    /// The device list starts as `["Auto", "CPU"]` until
    /// [`set_device_list`](Self::set_device_list) replaces it.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<ChangeNotifier>,
        paths: Arc<dyn PathResolver>,
        hardware: HardwareInfo,
    ) -> Self {
        Self {
            store,
            notifier,
            paths,
            hardware,
            device_list: Mutex::new(vec![AUTO_DEVICE.to_string(), CPU_DEVICE.to_string()]),
            force_metal: AtomicBool::new(defaults::FORCE_METAL),
        }
    }

    // ── Generic access ────────────────────────────────────────────────────────

    /// Effective value of `setting`, including the special read rules.
    pub fn value(&self, setting: AppSetting) -> SettingValue {
        match setting {
            AppSetting::ThreadCount => self.thread_count().into(),
            AppSetting::ModelPath => self.model_path().into(),
            AppSetting::Device => self.device().into(),
            _ => self.stored_or_default(setting),
        }
    }

    /// The default `setting` resolves to when nothing is stored.
    pub fn default_value(&self, setting: AppSetting) -> SettingValue {
        match setting {
            AppSetting::ThreadCount => self.hardware.default_thread_count().into(),
            AppSetting::ModelPath => self.paths.default_models_path().into(),
            other => other.fixed_default().unwrap_or_else(|| other.kind().zero()),
        }
    }

    /// Sets `setting`, routing through its special write rules.
    ///
    /// Returns `true` if the store changed.
    pub fn set_value(&self, setting: AppSetting, value: SettingValue) -> bool {
        match setting {
            AppSetting::ThreadCount => self.set_thread_count(value.as_int()),
            AppSetting::ModelPath => self.set_model_path(&value.into_text()),
            AppSetting::Device => self.set_device(&value.into_text()),
            AppSetting::NetworkIsActive => self.set_network_is_active(value.as_bool()),
            AppSetting::NetworkUsageStatsActive => {
                self.set_network_usage_stats_active(value.as_bool())
            }
            _ => self.write_if_changed(setting, value),
        }
    }

    fn stored_or_default(&self, setting: AppSetting) -> SettingValue {
        match self.store.get(setting.key()) {
            Some(stored) => stored.coerce(setting.kind()),
            None => self.default_value(setting),
        }
    }

    fn write_if_changed(&self, setting: AppSetting, value: SettingValue) -> bool {
        let value = value.coerce(setting.kind());
        if self.stored_or_default(setting).same_as(&value) {
            return false;
        }
        self.write(setting, value);
        true
    }

    fn write(&self, setting: AppSetting, value: SettingValue) {
        debug!("{} = {value}", setting.key());
        self.store.set(setting.key(), value);
        self.notifier.emit(ChangeEvent::App(setting));
    }

    // ── Plain settings ────────────────────────────────────────────────────────

    pub fn chat_theme(&self) -> String {
        self.stored_or_default(AppSetting::ChatTheme).into_text()
    }

    pub fn set_chat_theme(&self, theme: &str) -> bool {
        self.write_if_changed(AppSetting::ChatTheme, theme.into())
    }

    pub fn font_size(&self) -> String {
        self.stored_or_default(AppSetting::FontSize).into_text()
    }

    pub fn set_font_size(&self, size: &str) -> bool {
        self.write_if_changed(AppSetting::FontSize, size.into())
    }

    pub fn save_chats_context(&self) -> bool {
        self.stored_or_default(AppSetting::SaveChatsContext).as_bool()
    }

    pub fn set_save_chats_context(&self, save: bool) -> bool {
        self.write_if_changed(AppSetting::SaveChatsContext, save.into())
    }

    pub fn server_chat(&self) -> bool {
        self.stored_or_default(AppSetting::ServerChat).as_bool()
    }

    pub fn set_server_chat(&self, enabled: bool) -> bool {
        self.write_if_changed(AppSetting::ServerChat, enabled.into())
    }

    pub fn network_port(&self) -> i64 {
        self.stored_or_default(AppSetting::NetworkPort).as_int()
    }

    pub fn set_network_port(&self, port: i64) -> bool {
        self.write_if_changed(AppSetting::NetworkPort, port.into())
    }

    pub fn user_default_model(&self) -> String {
        self.stored_or_default(AppSetting::UserDefaultModel).into_text()
    }

    pub fn set_user_default_model(&self, model: &str) -> bool {
        self.write_if_changed(AppSetting::UserDefaultModel, model.into())
    }

    pub fn last_version_started(&self) -> String {
        self.stored_or_default(AppSetting::LastVersionStarted).into_text()
    }

    pub fn set_last_version_started(&self, version: &str) -> bool {
        self.write_if_changed(AppSetting::LastVersionStarted, version.into())
    }

    pub fn local_docs_chunk_size(&self) -> i64 {
        self.stored_or_default(AppSetting::LocalDocsChunkSize).as_int()
    }

    pub fn set_local_docs_chunk_size(&self, size: i64) -> bool {
        self.write_if_changed(AppSetting::LocalDocsChunkSize, size.into())
    }

    pub fn local_docs_retrieval_size(&self) -> i64 {
        self.stored_or_default(AppSetting::LocalDocsRetrievalSize).as_int()
    }

    pub fn set_local_docs_retrieval_size(&self, size: i64) -> bool {
        self.write_if_changed(AppSetting::LocalDocsRetrievalSize, size.into())
    }

    pub fn local_docs_show_references(&self) -> bool {
        self.stored_or_default(AppSetting::LocalDocsShowReferences).as_bool()
    }

    pub fn set_local_docs_show_references(&self, show: bool) -> bool {
        self.write_if_changed(AppSetting::LocalDocsShowReferences, show.into())
    }

    pub fn network_attribution(&self) -> String {
        self.stored_or_default(AppSetting::NetworkAttribution).into_text()
    }

    pub fn set_network_attribution(&self, attribution: &str) -> bool {
        self.write_if_changed(AppSetting::NetworkAttribution, attribution.into())
    }

    // ── Thread count ──────────────────────────────────────────────────────────

    /// Normalized thread count.  Unset and non-positive values mean
    /// "default".
    pub fn thread_count(&self) -> i64 {
        let stored = self
            .store
            .get(keys::THREAD_COUNT)
            .map(|v| v.as_int())
            .unwrap_or(0);
        self.hardware.normalize_thread_count(stored)
    }

    pub fn set_thread_count(&self, requested: i64) -> bool {
        let count = self.hardware.normalize_thread_count(requested);
        if self.thread_count() == count {
            return false;
        }
        self.write(AppSetting::ThreadCount, count.into());
        true
    }

    // ── Model path ────────────────────────────────────────────────────────────

    /// Directory models are stored in, with a trailing separator.
    ///
    /// Moves a legacy `modelPaths` entry to `modelPath` first, without
    /// overwriting an existing `modelPath`.
    pub fn model_path(&self) -> String {
        self.migrate_legacy_model_path();
        match self.store.get(keys::MODEL_PATH) {
            Some(stored) => stored.into_text(),
            None => self.paths.default_models_path(),
        }
    }

    /// Sets the model directory from a bare path or a `file://` URL.
    pub fn set_model_path(&self, raw: &str) -> bool {
        let normalized = self.paths.normalize(raw);
        if self.model_path() == normalized {
            return false;
        }
        self.write(AppSetting::ModelPath, normalized.into());
        true
    }

    fn migrate_legacy_model_path(&self) {
        if !self.store.contains(keys::LEGACY_MODEL_PATHS) {
            return;
        }
        if !self.store.contains(keys::MODEL_PATH) {
            if let Some(legacy) = self.store.get(keys::LEGACY_MODEL_PATHS) {
                info!("migrating {} to {}", keys::LEGACY_MODEL_PATHS, keys::MODEL_PATH);
                self.store.set(keys::MODEL_PATH, legacy);
            }
        }
        self.store.remove(keys::LEGACY_MODEL_PATHS);
    }

    // ── Device ────────────────────────────────────────────────────────────────

    /// Reads the device selection, rewriting a historical spelling in place.
    ///
    /// When the stored name is migrated the new name is written back to the
    /// store before returning.  That write raises no change notification:
    /// the effective device is the same, only its spelling changed.
    pub fn resolve_and_migrate_device(&self) -> DeviceResolution {
        let stored = match self.store.get(keys::DEVICE) {
            Some(v) => v.into_text(),
            None => {
                return DeviceResolution {
                    name: defaults::DEVICE.to_string(),
                    migrated_from: None,
                }
            }
        };
        if stored.is_empty() {
            return DeviceResolution {
                name: stored,
                migrated_from: None,
            };
        }

        let current = migrate_selection_name(&stored);
        if current == stored {
            return DeviceResolution {
                name: current,
                migrated_from: None,
            };
        }

        warn!("updating device name: {stored:?} -> {current:?}");
        self.store.set(keys::DEVICE, current.clone().into());
        DeviceResolution {
            name: current,
            migrated_from: Some(stored),
        }
    }

    /// Current device selection name.  May migrate; see
    /// [`resolve_and_migrate_device`](Self::resolve_and_migrate_device).
    pub fn device(&self) -> String {
        self.resolve_and_migrate_device().name
    }

    pub fn set_device(&self, name: &str) -> bool {
        if self.device() == name {
            return false;
        }
        self.write(AppSetting::Device, name.into());
        true
    }

    /// Selection names offered to the user.
    pub fn device_list(&self) -> Vec<String> {
        self.lock_devices().clone()
    }

    /// Replaces the device list and emits [`ChangeEvent::DeviceList`].
    pub fn set_device_list(&self, devices: Vec<String>) {
        *self.lock_devices() = devices;
        self.notifier.emit(ChangeEvent::DeviceList);
    }

    /// Rebuilds the device list from `catalog`.
    pub fn refresh_device_list(&self, catalog: &dyn DeviceCatalog) {
        let metal = cfg!(all(target_os = "macos", target_arch = "aarch64"));
        self.set_device_list(selection_list(catalog, metal));
    }

    fn lock_devices(&self) -> MutexGuard<'_, Vec<String>> {
        self.device_list.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Force metal ───────────────────────────────────────────────────────────

    /// In-memory only; never persisted.
    pub fn force_metal(&self) -> bool {
        self.force_metal.load(Ordering::SeqCst)
    }

    pub fn set_force_metal(&self, force: bool) -> bool {
        if self.force_metal.swap(force, Ordering::SeqCst) == force {
            return false;
        }
        self.notifier.emit(ChangeEvent::ForceMetal(force));
        true
    }

    // ── Network flags ─────────────────────────────────────────────────────────

    pub fn network_is_active(&self) -> bool {
        self.stored_or_default(AppSetting::NetworkIsActive).as_bool()
    }

    /// Returns `true` once any value has been stored, including `false`.
    pub fn is_network_is_active_set(&self) -> bool {
        self.store.contains(keys::NETWORK_IS_ACTIVE)
    }

    pub fn set_network_is_active(&self, active: bool) -> bool {
        self.write_if_raw_differs(AppSetting::NetworkIsActive, active)
    }

    pub fn network_usage_stats_active(&self) -> bool {
        self.stored_or_default(AppSetting::NetworkUsageStatsActive).as_bool()
    }

    /// Returns `true` once any value has been stored, including `false`.
    pub fn is_network_usage_stats_active_set(&self) -> bool {
        self.store.contains(keys::NETWORK_USAGE_STATS_ACTIVE)
    }

    pub fn set_network_usage_stats_active(&self, active: bool) -> bool {
        self.write_if_raw_differs(AppSetting::NetworkUsageStatsActive, active)
    }

    /// Writes unless the stored value already equals `flag`.  An absent
    /// value always counts as different, even from the default.
    fn write_if_raw_differs(&self, setting: AppSetting, flag: bool) -> bool {
        let raw = self.store.get(setting.key()).map(|v| v.as_bool());
        if raw == Some(flag) {
            return false;
        }
        self.write(setting, flag.into());
        true
    }

    // ── Restore ───────────────────────────────────────────────────────────────

    /// Resets the settings on the application page to their defaults.
    pub fn restore_application_defaults(&self) {
        self.set_chat_theme(defaults::CHAT_THEME);
        self.set_font_size(defaults::FONT_SIZE);
        self.set_device(defaults::DEVICE);
        self.set_thread_count(self.hardware.default_thread_count());
        self.set_save_chats_context(defaults::SAVE_CHATS_CONTEXT);
        self.set_server_chat(defaults::SERVER_CHAT);
        self.set_network_port(defaults::NETWORK_PORT);
        self.set_model_path(&self.paths.default_models_path());
        self.set_user_default_model(defaults::USER_DEFAULT_MODEL);
        self.set_force_metal(defaults::FORCE_METAL);
    }

    /// Resets the local document indexing settings to their defaults.
    pub fn restore_local_docs_defaults(&self) {
        self.set_local_docs_chunk_size(defaults::LOCAL_DOCS_CHUNK_SIZE);
        self.set_local_docs_retrieval_size(defaults::LOCAL_DOCS_RETRIEVAL_SIZE);
        self.set_local_docs_show_references(defaults::LOCAL_DOCS_SHOW_REFERENCES);
    }
}

/// `"Auto"`, then the accelerators, then `"CPU"`.
///
/// With `metal` set the catalog is ignored and the single Metal device is
/// listed instead.
fn selection_list(catalog: &dyn DeviceCatalog, metal: bool) -> Vec<String> {
    let mut list = vec![AUTO_DEVICE.to_string()];
    if metal {
        list.push(METAL_DEVICE.to_string());
    } else {
        list.extend(catalog.gpu_devices().iter().map(|d| d.selection_name()));
    }
    list.push(CPU_DEVICE.to_string());
    list
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use prefs_core::{GpuDevice, MemoryStore};

    mockall::mock! {
        pub Paths {}
        impl PathResolver for Paths {
            fn default_models_path(&self) -> String;
            fn normalize(&self, raw: &str) -> String;
        }
    }

    mockall::mock! {
        pub Catalog {}
        impl DeviceCatalog for Catalog {
            fn gpu_devices(&self) -> Vec<GpuDevice>;
        }
    }

    const EIGHT_CORES: HardwareInfo = HardwareInfo {
        ideal_thread_count: 8,
        hardware_concurrency: 8,
    };

    /// Paths mock that never probes: default `/data/`, identity normalize.
    fn quiet_paths() -> MockPaths {
        let mut paths = MockPaths::new();
        paths
            .expect_default_models_path()
            .return_const("/data/".to_string());
        paths.expect_normalize().returning(|raw| raw.to_string());
        paths
    }

    fn settings_over(store: Arc<MemoryStore>, paths: MockPaths) -> ApplicationSettings {
        ApplicationSettings::new(
            store,
            Arc::new(ChangeNotifier::new()),
            Arc::new(paths),
            EIGHT_CORES,
        )
    }

    fn settings() -> (Arc<MemoryStore>, ApplicationSettings) {
        let store = Arc::new(MemoryStore::new());
        let app = settings_over(Arc::clone(&store), quiet_paths());
        (store, app)
    }

    #[test]
    fn test_setting_keys_round_trip_through_from_str() {
        for setting in AppSetting::ALL {
            assert_eq!(setting.key().parse::<AppSetting>(), Ok(setting));
        }
        assert_eq!(
            "LOCALDOCS/CHUNKSIZE".parse::<AppSetting>(),
            Ok(AppSetting::LocalDocsChunkSize)
        );
        assert!("volume".parse::<AppSetting>().is_err());
    }

    #[test]
    fn test_defaults_when_store_is_empty() {
        let (_, app) = settings();

        assert_eq!(app.chat_theme(), "Dark");
        assert_eq!(app.font_size(), "Small");
        assert_eq!(app.device(), "Auto");
        assert_eq!(app.network_port(), 4891);
        assert_eq!(app.user_default_model(), "Application default");
        assert_eq!(app.local_docs_chunk_size(), 256);
        assert_eq!(app.local_docs_retrieval_size(), 3);
        assert!(app.local_docs_show_references());
        assert_eq!(app.thread_count(), 4);
        assert_eq!(app.model_path(), "/data/");
    }

    #[test]
    fn test_plain_setter_short_circuits_on_equal_value() {
        // Arrange
        let (store, app) = settings();

        // Act
        let first = app.set_chat_theme("Light");
        let second = app.set_chat_theme("Light");

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(store.get("chatTheme"), Some(SettingValue::from("Light")));
    }

    #[test]
    fn test_setting_the_default_on_empty_store_writes_nothing() {
        let (store, app) = settings();

        assert!(!app.set_network_port(4891));
        assert!(store.is_empty());
    }

    #[test]
    fn test_setter_emits_app_event() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(ChangeNotifier::new());
        let rx = notifier.subscribe();
        let app = ApplicationSettings::new(
            store,
            Arc::clone(&notifier),
            Arc::new(quiet_paths()),
            EIGHT_CORES,
        );

        app.set_server_chat(true);

        assert_eq!(rx.try_recv(), Ok(ChangeEvent::App(AppSetting::ServerChat)));
    }

    #[test]
    fn test_thread_count_non_positive_means_default() {
        let (store, app) = settings();
        store.set("threadCount", SettingValue::Int(0));
        assert_eq!(app.thread_count(), 4);

        store.set("threadCount", SettingValue::Int(-2));
        assert_eq!(app.thread_count(), 4);
    }

    #[test]
    fn test_thread_count_is_clamped_on_read_and_write() {
        let (store, app) = settings();

        assert!(app.set_thread_count(100));
        assert_eq!(store.get("threadCount"), Some(SettingValue::Int(8)));
        assert_eq!(app.thread_count(), 8);

        store.set("threadCount", SettingValue::Int(64));
        assert_eq!(app.thread_count(), 8);
    }

    #[test]
    fn test_thread_count_setter_compares_normalized_values() {
        // Arrange: stored 8, ideal 8
        let (store, app) = settings();
        store.set("threadCount", SettingValue::Int(8));

        // Act / Assert: 12 normalizes to 8, which is already in effect
        assert!(!app.set_thread_count(12));

        // Zero normalizes to the default of 4, which differs
        assert!(app.set_thread_count(0));
        assert_eq!(store.get("threadCount"), Some(SettingValue::Int(4)));
    }

    #[test]
    fn test_legacy_model_path_is_migrated_once() {
        // Arrange
        let store = Arc::new(MemoryStore::with_entries([(
            "modelPaths",
            SettingValue::from("/a/"),
        )]));
        let app = settings_over(Arc::clone(&store), quiet_paths());

        // Act
        let path = app.model_path();

        // Assert
        assert_eq!(path, "/a/");
        assert!(!store.contains("modelPaths"));
        assert_eq!(store.get("modelPath"), Some(SettingValue::from("/a/")));
        assert_eq!(app.model_path(), "/a/");
    }

    #[test]
    fn test_legacy_model_path_never_overwrites_current() {
        let store = Arc::new(MemoryStore::with_entries([
            ("modelPaths", SettingValue::from("/old/")),
            ("modelPath", SettingValue::from("/new/")),
        ]));
        let app = settings_over(Arc::clone(&store), quiet_paths());

        assert_eq!(app.model_path(), "/new/");
        assert!(!store.contains("modelPaths"));
    }

    #[test]
    fn test_model_path_default_is_only_probed_when_unset() {
        // Arrange: probing must not happen while a value is stored
        let store = Arc::new(MemoryStore::with_entries([(
            "modelPath",
            SettingValue::from("/models/"),
        )]));
        let mut paths = MockPaths::new();
        paths.expect_default_models_path().never();
        let app = settings_over(store, paths);

        // Act / Assert
        assert_eq!(app.model_path(), "/models/");
    }

    #[test]
    fn test_set_model_path_normalizes_before_comparing() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let mut paths = MockPaths::new();
        paths
            .expect_default_models_path()
            .return_const("/data/".to_string());
        paths
            .expect_normalize()
            .withf(|raw| raw == "file:///data")
            .times(1)
            .return_const("/data/".to_string());
        let app = settings_over(Arc::clone(&store), paths);

        // Act: the URL normalizes to the default already in effect
        let changed = app.set_model_path("file:///data");

        // Assert
        assert!(!changed);
        assert!(!store.contains("modelPath"));
    }

    #[test]
    fn test_device_migration_writes_back_without_event() {
        // Arrange
        let store = Arc::new(MemoryStore::with_entries([(
            "device",
            SettingValue::from("Intel(R) Arc(TM) A770"),
        )]));
        let notifier = Arc::new(ChangeNotifier::new());
        let rx = notifier.subscribe();
        let app = ApplicationSettings::new(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            notifier,
            Arc::new(quiet_paths()),
            EIGHT_CORES,
        );

        // Act
        let resolution = app.resolve_and_migrate_device();

        // Assert
        assert_eq!(resolution.name, "Vulkan: Intel(R) Arc(TM) A770");
        assert_eq!(
            resolution.migrated_from.as_deref(),
            Some("Intel(R) Arc(TM) A770")
        );
        assert_eq!(
            store.get("device"),
            Some(SettingValue::from("Vulkan: Intel(R) Arc(TM) A770"))
        );
        assert!(rx.try_recv().is_err());

        // A second read finds nothing to migrate
        assert_eq!(app.resolve_and_migrate_device().migrated_from, None);
    }

    #[test]
    fn test_empty_device_name_is_returned_as_is() {
        let store = Arc::new(MemoryStore::with_entries([("device", SettingValue::from(""))]));
        let app = settings_over(Arc::clone(&store), quiet_paths());

        assert_eq!(app.device(), "");
        assert_eq!(store.get("device"), Some(SettingValue::from("")));
    }

    #[test]
    fn test_set_device_compares_against_migrated_name() {
        let store = Arc::new(MemoryStore::with_entries([(
            "device",
            SettingValue::from("Radeon RX 7900"),
        )]));
        let app = settings_over(store, quiet_paths());

        assert!(!app.set_device("Vulkan: Radeon RX 7900"));
        assert!(app.set_device("CPU"));
        assert_eq!(app.device(), "CPU");
    }

    #[test]
    fn test_network_flag_distinguishes_unset_from_false() {
        // Arrange
        let (store, app) = settings();
        assert!(!app.is_network_is_active_set());
        assert!(!app.network_is_active());

        // Act: writing the default still records an explicit choice
        let changed = app.set_network_is_active(false);

        // Assert
        assert!(changed);
        assert!(app.is_network_is_active_set());
        assert!(!app.network_is_active());
        assert_eq!(store.get("network/isActive"), Some(SettingValue::Bool(false)));

        // Repeating the same value is a no-op
        assert!(!app.set_network_is_active(false));
    }

    #[test]
    fn test_usage_stats_flag_has_its_own_key() {
        let (store, app) = settings();

        assert!(app.set_network_usage_stats_active(true));

        assert!(app.is_network_usage_stats_active_set());
        assert!(!app.is_network_is_active_set());
        assert!(store.contains("network/usageStatsActive"));
    }

    #[test]
    fn test_force_metal_is_memory_only() {
        // Arrange
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(ChangeNotifier::new());
        let rx = notifier.subscribe();
        let app = ApplicationSettings::new(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            notifier,
            Arc::new(quiet_paths()),
            EIGHT_CORES,
        );

        // Act
        assert!(app.set_force_metal(true));
        assert!(!app.set_force_metal(true));

        // Assert
        assert!(app.force_metal());
        assert!(store.is_empty());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ChangeEvent::ForceMetal(true)]);
    }

    #[test]
    fn test_selection_list_wraps_catalog_devices() {
        let mut catalog = MockCatalog::new();
        catalog.expect_gpu_devices().returning(|| {
            vec![
                GpuDevice::new("cuda", "RTX 4070"),
                GpuDevice::new("kompute", "RTX 4070"),
            ]
        });

        assert_eq!(
            selection_list(&catalog, false),
            vec!["Auto", "CUDA: RTX 4070", "Vulkan: RTX 4070", "CPU"]
        );
    }

    #[test]
    fn test_selection_list_on_metal_ignores_catalog() {
        let mut catalog = MockCatalog::new();
        catalog.expect_gpu_devices().never();

        assert_eq!(selection_list(&catalog, true), vec!["Auto", "Metal", "CPU"]);
    }

    #[test]
    fn test_set_device_list_emits_event() {
        let notifier = Arc::new(ChangeNotifier::new());
        let rx = notifier.subscribe();
        let app = ApplicationSettings::new(
            Arc::new(MemoryStore::new()),
            notifier,
            Arc::new(quiet_paths()),
            EIGHT_CORES,
        );
        assert_eq!(app.device_list(), vec!["Auto", "CPU"]);

        app.set_device_list(vec!["Auto".into(), "CUDA: A100".into(), "CPU".into()]);

        assert_eq!(app.device_list()[1], "CUDA: A100");
        assert_eq!(rx.try_recv(), Ok(ChangeEvent::DeviceList));
    }

    #[test]
    fn test_restore_application_defaults_leaves_local_docs_alone() {
        // Arrange
        let (store, app) = settings();
        app.set_chat_theme("Light");
        app.set_thread_count(2);
        app.set_model_path("/elsewhere/");
        app.set_force_metal(true);
        app.set_local_docs_chunk_size(512);

        // Act
        app.restore_application_defaults();

        // Assert
        assert_eq!(app.chat_theme(), "Dark");
        assert_eq!(app.thread_count(), 4);
        assert_eq!(app.model_path(), "/data/");
        assert!(!app.force_metal());
        assert_eq!(app.local_docs_chunk_size(), 512);
        assert_eq!(store.get("chatTheme"), Some(SettingValue::from("Dark")));
    }

    #[test]
    fn test_restore_local_docs_defaults() {
        let (_, app) = settings();
        app.set_local_docs_chunk_size(1024);
        app.set_local_docs_retrieval_size(10);
        app.set_local_docs_show_references(false);

        app.restore_local_docs_defaults();

        assert_eq!(app.local_docs_chunk_size(), 256);
        assert_eq!(app.local_docs_retrieval_size(), 3);
        assert!(app.local_docs_show_references());
    }

    #[test]
    fn test_generic_value_routes_special_settings() {
        let (store, app) = settings();
        store.set("threadCount", SettingValue::Int(99));

        assert_eq!(app.value(AppSetting::ThreadCount), SettingValue::Int(8));
        assert!(app.set_value(AppSetting::NetworkPort, SettingValue::from("8080")));
        assert_eq!(app.network_port(), 8080);
    }
}
