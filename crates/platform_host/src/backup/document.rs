//! Versioned backup document bundling every logical key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BackupError;
use crate::{storage::keys::LogicalKey, time::utc_date_stamp};

/// Format version written into new backups.
pub const BACKUP_FORMAT_VERSION: &str = "2.0";
/// Platform tag written into new backups.
pub const BACKUP_PLATFORM: &str = "EduGen Pro";
/// File name prefix suggested for exported backups.
pub const BACKUP_FILE_STEM: &str = "EduGen_Backup";

/// Backup metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMeta {
    /// Document format version.
    #[serde(default)]
    pub version: String,
    /// Export time in unix milliseconds.
    #[serde(default)]
    pub timestamp: u64,
    /// Exporting application tag.
    #[serde(default)]
    pub platform: String,
}

/// Backup data block, one optional value per logical key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    /// [`LogicalKey::Exams`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exams: Option<Value>,
    /// [`LogicalKey::Vocab`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<Value>,
    /// [`LogicalKey::Settings`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    /// [`LogicalKey::ApiKey`]; absent when the export omitted the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Value>,
    /// [`LogicalKey::SpeakingManual`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_manual: Option<Value>,
    /// [`LogicalKey::SpeakingTopicBank`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_topic_bank: Option<Value>,
    /// [`LogicalKey::Leaderboard`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Value>,
}

impl BackupData {
    /// Value carried for `key`.
    pub fn get(&self, key: LogicalKey) -> Option<&Value> {
        self.slot(key).as_ref()
    }

    /// Stores `value` for `key`.
    pub fn set(&mut self, key: LogicalKey, value: Option<Value>) {
        *self.slot_mut(key) = value;
    }

    /// Values to restore, in [`LogicalKey::ALL`] order.
    ///
    /// `null` values and an empty credential are skipped so the current value stays untouched.
    pub fn staged_entries(&self) -> Vec<(LogicalKey, Value)> {
        LogicalKey::ALL
            .into_iter()
            .filter_map(|key| {
                let value = self.get(key)?;
                if value.is_null() || (key.is_sensitive() && value.as_str() == Some("")) {
                    return None;
                }
                Some((key, value.clone()))
            })
            .collect()
    }

    /// Checks every staged value against its key's expected shape.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFormat`] naming the first mismatching field.
    pub fn check_shapes(&self) -> Result<(), BackupError> {
        for (key, value) in self.staged_entries() {
            let shape = key.shape();
            if !shape.matches(&value) {
                return Err(BackupError::InvalidFormat(format!(
                    "`data.{}` must be a JSON {}",
                    key.backup_field(),
                    shape.label()
                )));
            }
        }
        Ok(())
    }

    fn slot(&self, key: LogicalKey) -> &Option<Value> {
        match key {
            LogicalKey::Exams => &self.exams,
            LogicalKey::Vocab => &self.vocab,
            LogicalKey::Settings => &self.settings,
            LogicalKey::ApiKey => &self.api_key,
            LogicalKey::Leaderboard => &self.leaderboard,
            LogicalKey::SpeakingManual => &self.speaking_manual,
            LogicalKey::SpeakingTopicBank => &self.speaking_topic_bank,
        }
    }

    fn slot_mut(&mut self, key: LogicalKey) -> &mut Option<Value> {
        match key {
            LogicalKey::Exams => &mut self.exams,
            LogicalKey::Vocab => &mut self.vocab,
            LogicalKey::Settings => &mut self.settings,
            LogicalKey::ApiKey => &mut self.api_key,
            LogicalKey::Leaderboard => &mut self.leaderboard,
            LogicalKey::SpeakingManual => &mut self.speaking_manual,
            LogicalKey::SpeakingTopicBank => &mut self.speaking_topic_bank,
        }
    }
}

/// Complete backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Metadata block.
    pub meta: BackupMeta,
    /// Data block.
    pub data: BackupData,
}

/// Parses backup text, requiring both the `meta` and `data` blocks.
///
/// # Errors
///
/// Returns [`BackupError::InvalidFormat`] for non-JSON text, a non-object root, a missing or
/// non-object `meta`/`data` block, or a malformed metadata field.
pub fn parse_backup(text: &str) -> Result<BackupDocument, BackupError> {
    let root: Value = serde_json::from_str(text)
        .map_err(|err| BackupError::InvalidFormat(format!("backup is not valid JSON: {err}")))?;
    let Some(object) = root.as_object() else {
        return Err(BackupError::InvalidFormat(
            "backup root must be a JSON object".to_string(),
        ));
    };
    for block in ["meta", "data"] {
        if !object.get(block).is_some_and(Value::is_object) {
            return Err(BackupError::InvalidFormat(format!(
                "backup is missing the `{block}` block"
            )));
        }
    }
    serde_json::from_value(root)
        .map_err(|err| BackupError::InvalidFormat(format!("backup envelope is malformed: {err}")))
}

/// Renders a backup document as two-space indented JSON.
///
/// # Errors
///
/// Returns [`BackupError::Serialize`] when serialization fails.
pub fn render_backup(document: &BackupDocument) -> Result<String, BackupError> {
    serde_json::to_string_pretty(document).map_err(|err| BackupError::Serialize(err.to_string()))
}

/// Suggested backup file name, `<stem>_YYYY-MM-DD.json` in UTC.
pub fn backup_file_name(stem: &str, timestamp_ms: u64) -> String {
    format!("{stem}_{}.json", utc_date_stamp(timestamp_ms))
}
