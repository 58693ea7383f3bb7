//! Model profile: identity plus compiled-in defaults of one selectable model.
//!
//! A profile's defaults come from the model's own metadata (a bundled
//! catalogue entry, a remote listing, or a clone of another profile).  They
//! are the fallback the resolver returns when no override is stored, and the
//! equality target the persister compares against when deciding whether a
//! write collapses back to the default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::field::ModelField;
use crate::domain::value::SettingValue;

const DEFAULT_PROMPT_TEMPLATE: &str = "### Human:\n%1\n\n### Assistant:\n";

/// Compiled-in baseline for every overridable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDefaults {
    pub name: String,
    pub filename: String,
    pub description: String,
    pub url: String,
    pub quant: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub is_clone: bool,
    pub is_discovered: bool,
    pub likes: i64,
    pub downloads: i64,
    /// Last time the model was used; the Unix epoch means "never".
    pub recency: DateTime<Utc>,
    pub temperature: f64,
    pub top_p: f64,
    pub min_p: f64,
    pub top_k: i64,
    pub max_length: i64,
    pub prompt_batch_size: i64,
    pub context_length: i64,
    pub gpu_layers: i64,
    pub repeat_penalty: f64,
    pub repeat_penalty_tokens: i64,
    pub prompt_template: String,
    pub system_prompt: String,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            name: String::new(),
            filename: String::new(),
            description: String::new(),
            url: String::new(),
            quant: String::new(),
            model_type: String::new(),
            is_clone: false,
            is_discovered: false,
            likes: 0,
            downloads: 0,
            recency: DateTime::<Utc>::default(),
            temperature: 0.7,
            top_p: 0.4,
            min_p: 0.0,
            top_k: 40,
            max_length: 4096,
            prompt_batch_size: 128,
            context_length: 2048,
            gpu_layers: 100,
            repeat_penalty: 1.18,
            repeat_penalty_tokens: 64,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            system_prompt: String::new(),
        }
    }
}

impl ModelDefaults {
    /// The baseline value of `field`.
    ///
    /// The display name falls back to the filename when the profile carries
    /// no name of its own.
    pub fn value(&self, field: ModelField) -> SettingValue {
        match field {
            ModelField::Name => {
                if self.name.is_empty() {
                    self.filename.clone().into()
                } else {
                    self.name.clone().into()
                }
            }
            ModelField::Filename => self.filename.clone().into(),
            ModelField::Description => self.description.clone().into(),
            ModelField::Url => self.url.clone().into(),
            ModelField::Quant => self.quant.clone().into(),
            ModelField::Type => self.model_type.clone().into(),
            ModelField::IsClone => self.is_clone.into(),
            ModelField::IsDiscovered => self.is_discovered.into(),
            ModelField::Likes => self.likes.into(),
            ModelField::Downloads => self.downloads.into(),
            ModelField::Recency => self.recency.into(),
            ModelField::Temperature => self.temperature.into(),
            ModelField::TopP => self.top_p.into(),
            ModelField::MinP => self.min_p.into(),
            ModelField::TopK => self.top_k.into(),
            ModelField::MaxLength => self.max_length.into(),
            ModelField::PromptBatchSize => self.prompt_batch_size.into(),
            ModelField::ContextLength => self.context_length.into(),
            ModelField::GpuLayers => self.gpu_layers.into(),
            ModelField::RepeatPenalty => self.repeat_penalty.into(),
            ModelField::RepeatPenaltyTokens => self.repeat_penalty_tokens.into(),
            ModelField::PromptTemplate => self.prompt_template.clone().into(),
            ModelField::SystemPrompt => self.system_prompt.clone().into(),
        }
    }

    /// Returns `true` if `value` is what this profile would resolve to
    /// without an override, i.e. storing it would be redundant.
    pub fn matches_default(&self, field: ModelField, value: &SettingValue) -> bool {
        self.value(field).same_as(value)
    }
}

/// One selectable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Stable identifier namespacing this profile's storage keys.  Empty
    /// means "no identity yet".
    #[serde(default)]
    pub id: String,
    /// Persist every override verbatim, even when it equals the default.
    /// Set for cloned and remotely discovered profiles whose metadata must
    /// round-trip through the store.
    #[serde(default)]
    pub should_save_metadata: bool,
    #[serde(default)]
    pub defaults: ModelDefaults,
}

impl ModelProfile {
    pub fn new(id: impl Into<String>, defaults: ModelDefaults) -> Self {
        Self {
            id: id.into(),
            should_save_metadata: false,
            defaults,
        }
    }

    /// Returns a copy of this profile with the metadata-saving flag set.
    pub fn saving_metadata(mut self, save: bool) -> Self {
        self.should_save_metadata = save;
        self
    }

    /// Returns `true` when the profile has no identity yet.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }

    /// Creates a clone of this profile under a fresh UUID.
    ///
    /// Clones always persist their metadata, since nothing but the store
    /// remembers them.
    pub fn clone_as_new(&self) -> ModelProfile {
        let mut defaults = self.defaults.clone();
        defaults.is_clone = true;
        ModelProfile {
            id: Uuid::new_v4().to_string(),
            should_save_metadata: true,
            defaults,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
