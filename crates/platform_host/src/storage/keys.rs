//! Logical storage keys and their stable physical bindings.
//!
//! Each [`LogicalKey`] owns one browser storage slot (named by [`LogicalKey::as_str`]) and one
//! host file (named by [`LogicalKey::file_name`]). Both names are persisted user data locations
//! and must not change between releases.

use serde_json::{json, Value};

/// Closed set of persisted application state units.
///
/// Variant order is the declaration order used when restoring a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalKey {
    /// Saved exam archive.
    Exams,
    /// Vocabulary bank.
    Vocab,
    /// Application settings object.
    Settings,
    /// Generative-AI API credential.
    ApiKey,
    /// Game leaderboard.
    Leaderboard,
    /// Manually authored speaking questions.
    SpeakingManual,
    /// Topic-based speaking question bank.
    SpeakingTopicBank,
}

/// Minimal JSON shape expected for a key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON string.
    String,
}

impl ValueShape {
    /// Returns whether `value` has this shape.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::String => value.is_string(),
        }
    }

    /// Returns a short label for diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
            Self::String => "string",
        }
    }
}

impl LogicalKey {
    /// Every logical key in declaration order.
    pub const ALL: [LogicalKey; 7] = [
        LogicalKey::Exams,
        LogicalKey::Vocab,
        LogicalKey::Settings,
        LogicalKey::ApiKey,
        LogicalKey::Leaderboard,
        LogicalKey::SpeakingManual,
        LogicalKey::SpeakingTopicBank,
    ];

    /// Stable storage slot key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exams => "edugen_ultimate_db",
            Self::Vocab => "edugen_vocab_bank",
            Self::Settings => "edugen_settings",
            Self::ApiKey => "edugen_api_key",
            Self::Leaderboard => "edugen_leaderboard",
            Self::SpeakingManual => "edugen_speaking_manual",
            Self::SpeakingTopicBank => "edugen_speaking_topic_bank",
        }
    }

    /// Field name used for this key inside a backup document's `data` block.
    pub const fn backup_field(self) -> &'static str {
        match self {
            Self::Exams => "exams",
            Self::Vocab => "vocab",
            Self::Settings => "settings",
            Self::ApiKey => "apiKey",
            Self::Leaderboard => "leaderboard",
            Self::SpeakingManual => "speakingManual",
            Self::SpeakingTopicBank => "speakingTopicBank",
        }
    }

    /// File name used by the host file store.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Exams => "exams.json",
            Self::Vocab => "vocab.json",
            Self::Settings => "settings.json",
            Self::ApiKey => "api_key.json",
            Self::Leaderboard => "leaderboard.json",
            Self::SpeakingManual => "speaking_manual.json",
            Self::SpeakingTopicBank => "speaking_topic_bank.json",
        }
    }

    /// Expected value shape.
    pub const fn shape(self) -> ValueShape {
        match self {
            Self::Settings => ValueShape::Object,
            Self::ApiKey => ValueShape::String,
            _ => ValueShape::Array,
        }
    }

    /// Empty value returned when nothing has been stored yet.
    pub fn default_value(self) -> Value {
        match self.shape() {
            ValueShape::Array => json!([]),
            ValueShape::Object => json!({}),
            ValueShape::String => json!(""),
        }
    }

    /// Whether the value is a credential that export may omit.
    pub const fn is_sensitive(self) -> bool {
        matches!(self, Self::ApiKey)
    }

    /// Resolves a storage slot key.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }

    /// Resolves a backup document field name.
    pub fn from_backup_field(field: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.backup_field() == field)
    }
}

impl AsRef<str> for LogicalKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a storage key before it is mapped to a physical resource.
///
/// # Errors
///
/// Returns a message when the key is empty or contains characters outside `[A-Za-z0-9._-]`.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("Storage key must not be empty".to_string());
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err(format!("Storage key `{key}` contains unsupported characters"));
    }
    if key.chars().all(|ch| ch == '.') {
        return Err(format!("Storage key `{key}` contains unsupported characters"));
    }
    Ok(())
}

/// Maps a storage key to its host file name.
///
/// Keys outside the static table map to `<key>.json`.
pub fn file_name_for_key(key: &str) -> String {
    match LogicalKey::from_storage_key(key) {
        Some(logical) => logical.file_name().to_string(),
        None => format!("{key}.json"),
    }
}
