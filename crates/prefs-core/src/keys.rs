//! Storage keys for process-wide settings and the per-model namespace.
//!
//! Layout of the flat key space:
//!
//! ```text
//! threadCount                 un-grouped application settings
//! localdocs/chunkSize         local document indexing
//! network/isActive            telemetry / attribution
//! model-<id>/temperature      per-model overrides
//! ```

pub const THREAD_COUNT: &str = "threadCount";
pub const SAVE_CHATS_CONTEXT: &str = "saveChatsContext";
pub const SERVER_CHAT: &str = "serverChat";
pub const NETWORK_PORT: &str = "networkPort";
pub const MODEL_PATH: &str = "modelPath";
/// Key used for the model directory before it was renamed to [`MODEL_PATH`].
pub const LEGACY_MODEL_PATHS: &str = "modelPaths";
pub const USER_DEFAULT_MODEL: &str = "userDefaultModel";
pub const CHAT_THEME: &str = "chatTheme";
pub const FONT_SIZE: &str = "fontSize";
pub const DEVICE: &str = "device";
pub const LAST_VERSION_STARTED: &str = "lastVersionStarted";

pub const LOCAL_DOCS_CHUNK_SIZE: &str = "localdocs/chunkSize";
pub const LOCAL_DOCS_RETRIEVAL_SIZE: &str = "localdocs/retrievalSize";
pub const LOCAL_DOCS_SHOW_REFERENCES: &str = "localdocs/showReferences";

pub const NETWORK_ATTRIBUTION: &str = "network/attribution";
pub const NETWORK_IS_ACTIVE: &str = "network/isActive";
pub const NETWORK_USAGE_STATS_ACTIVE: &str = "network/usageStatsActive";

/// Prefix shared by every per-model group.
pub const MODEL_GROUP_PREFIX: &str = "model-";

/// Group holding every override of the profile with id `profile_id`.
pub fn model_group(profile_id: &str) -> String {
    format!("{MODEL_GROUP_PREFIX}{profile_id}")
}
