//! The per-model field table.
//!
//! Every overridable field of a model profile has exactly one entry here: the
//! storage-key suffix it lives under (`model-<id>/<suffix>`) and the value
//! kind the resolver coerces stored values into.  The resolver and persister
//! are generic over this table, so adding a field means adding one row and
//! one default accessor in [`crate::ModelDefaults`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::value::ValueKind;

/// Error returned when a field or setting name is not recognised.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("unknown model field: {0}")]
    UnknownModelField(String),
    #[error("unknown application setting: {0}")]
    UnknownSetting(String),
}

/// One overridable field of a model profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelField {
    Name,
    Filename,
    Description,
    Url,
    Quant,
    Type,
    IsClone,
    IsDiscovered,
    Likes,
    Downloads,
    Recency,
    Temperature,
    TopP,
    MinP,
    TopK,
    MaxLength,
    PromptBatchSize,
    ContextLength,
    GpuLayers,
    RepeatPenalty,
    RepeatPenaltyTokens,
    PromptTemplate,
    SystemPrompt,
}

/// Static description of one row of the field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: ModelField,
    /// Storage-key suffix, appended to `model-<id>/`.
    pub key: &'static str,
    pub kind: ValueKind,
}

const fn spec(field: ModelField, key: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec { field, key, kind }
}

/// The field table, in declaration order of [`ModelField`].
pub const FIELD_TABLE: [FieldSpec; 23] = [
    spec(ModelField::Name, "name", ValueKind::Text),
    spec(ModelField::Filename, "filename", ValueKind::Text),
    spec(ModelField::Description, "description", ValueKind::Text),
    spec(ModelField::Url, "url", ValueKind::Text),
    spec(ModelField::Quant, "quant", ValueKind::Text),
    spec(ModelField::Type, "type", ValueKind::Text),
    spec(ModelField::IsClone, "isClone", ValueKind::Bool),
    spec(ModelField::IsDiscovered, "isDiscovered", ValueKind::Bool),
    spec(ModelField::Likes, "likes", ValueKind::Int),
    spec(ModelField::Downloads, "downloads", ValueKind::Int),
    spec(ModelField::Recency, "recency", ValueKind::Timestamp),
    spec(ModelField::Temperature, "temperature", ValueKind::Double),
    spec(ModelField::TopP, "topP", ValueKind::Double),
    spec(ModelField::MinP, "minP", ValueKind::Double),
    spec(ModelField::TopK, "topK", ValueKind::Int),
    spec(ModelField::MaxLength, "maxLength", ValueKind::Int),
    spec(ModelField::PromptBatchSize, "promptBatchSize", ValueKind::Int),
    spec(ModelField::ContextLength, "contextLength", ValueKind::Int),
    spec(ModelField::GpuLayers, "gpuLayers", ValueKind::Int),
    spec(ModelField::RepeatPenalty, "repeatPenalty", ValueKind::Double),
    spec(ModelField::RepeatPenaltyTokens, "repeatPenaltyTokens", ValueKind::Int),
    spec(ModelField::PromptTemplate, "promptTemplate", ValueKind::Text),
    spec(ModelField::SystemPrompt, "systemPrompt", ValueKind::Text),
];

impl ModelField {
    /// All fields, in table order.
    pub const ALL: [ModelField; 23] = [
        ModelField::Name,
        ModelField::Filename,
        ModelField::Description,
        ModelField::Url,
        ModelField::Quant,
        ModelField::Type,
        ModelField::IsClone,
        ModelField::IsDiscovered,
        ModelField::Likes,
        ModelField::Downloads,
        ModelField::Recency,
        ModelField::Temperature,
        ModelField::TopP,
        ModelField::MinP,
        ModelField::TopK,
        ModelField::MaxLength,
        ModelField::PromptBatchSize,
        ModelField::ContextLength,
        ModelField::GpuLayers,
        ModelField::RepeatPenalty,
        ModelField::RepeatPenaltyTokens,
        ModelField::PromptTemplate,
        ModelField::SystemPrompt,
    ];

    /// The generation parameters reset by "restore model defaults".
    pub const GENERATION: [ModelField; 12] = [
        ModelField::Temperature,
        ModelField::TopP,
        ModelField::MinP,
        ModelField::TopK,
        ModelField::MaxLength,
        ModelField::PromptBatchSize,
        ModelField::ContextLength,
        ModelField::GpuLayers,
        ModelField::RepeatPenalty,
        ModelField::RepeatPenaltyTokens,
        ModelField::PromptTemplate,
        ModelField::SystemPrompt,
    ];

    /// Returns this field's row in [`FIELD_TABLE`].
    pub fn spec(self) -> &'static FieldSpec {
        // ALL and FIELD_TABLE share the enum's declaration order.
        &FIELD_TABLE[self as usize]
    }

    /// Storage-key suffix for this field.
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Value kind stored under this field.
    pub fn kind(self) -> ValueKind {
        self.spec().kind
    }

    /// Full storage key for this field of the profile with id `profile_id`.
    pub fn storage_key(self, profile_id: &str) -> String {
        format!("{}/{}", crate::keys::model_group(profile_id), self.key())
    }
}

impl fmt::Display for ModelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelField {
    type Err = FieldError;

    /// Parses a storage-key suffix (`"topP"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELD_TABLE
            .iter()
            .find(|row| row.key.eq_ignore_ascii_case(s))
            .map(|row| row.field)
            .ok_or_else(|| FieldError::UnknownModelField(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
