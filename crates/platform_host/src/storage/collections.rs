//! Typed helpers for collections persisted through the [`StorageAdapter`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{adapter::StorageAdapter, keys::LogicalKey};

/// Topic assigned to vocabulary items saved without one.
pub const DEFAULT_VOCAB_TOPIC: &str = "Chung";
/// Number of entries kept on the leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// One vocabulary bank entry.
///
/// Fields this crate does not interpret are kept in `extra` so a load/save cycle never drops
/// data written by newer UI code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Headword.
    #[serde(default)]
    pub word: String,
    /// Meaning or translation.
    #[serde(default)]
    pub meaning: String,
    /// Unit/topic label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Remaining fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VocabularyItem {
    /// Topic label with the default applied.
    pub fn topic_or_default(&self) -> &str {
        match self.topic.as_deref() {
            Some(topic) if !topic.is_empty() => topic,
            _ => DEFAULT_VOCAB_TOPIC,
        }
    }
}

/// Vocabulary bank stored under [`LogicalKey::Vocab`].
#[derive(Debug, Clone)]
pub struct VocabBank {
    storage: StorageAdapter,
}

impl VocabBank {
    /// Creates a vocabulary bank view over `storage`.
    pub fn new(storage: StorageAdapter) -> Self {
        Self { storage }
    }

    /// Loads every vocabulary item.
    pub async fn all(&self) -> Vec<VocabularyItem> {
        self.storage
            .get(LogicalKey::Vocab.as_str(), Vec::new())
            .await
    }

    /// Replaces the whole vocabulary bank.
    pub async fn save_all(&self, items: &[VocabularyItem]) {
        self.storage.set(LogicalKey::Vocab.as_str(), items).await;
    }

    /// Distinct topics in first-seen order.
    pub async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for item in self.all().await {
            let topic = item.topic_or_default();
            if !topics.iter().any(|seen| seen == topic) {
                topics.push(topic.to_string());
            }
        }
        topics
    }

    /// Items whose topic equals `topic` exactly.
    pub async fn by_topic(&self, topic: &str) -> Vec<VocabularyItem> {
        self.all()
            .await
            .into_iter()
            .filter(|item| item.topic.as_deref() == Some(topic))
            .collect()
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Player display name.
    pub player_name: String,
    /// Rounded score.
    pub score: i64,
    /// Local time label recorded by the UI.
    pub time: String,
    /// Exam or topic title that was played.
    pub topic: String,
}

/// Leaderboard stored under [`LogicalKey::Leaderboard`].
#[derive(Debug, Clone)]
pub struct Leaderboard {
    storage: StorageAdapter,
}

impl Leaderboard {
    /// Creates a leaderboard view over `storage`.
    pub fn new(storage: StorageAdapter) -> Self {
        Self { storage }
    }

    /// Loads the stored leaderboard.
    pub async fn entries(&self) -> Vec<LeaderboardEntry> {
        self.storage
            .get(LogicalKey::Leaderboard.as_str(), Vec::new())
            .await
    }

    /// Adds `entry`, keeps the best [`LEADERBOARD_CAPACITY`] scores, persists and returns them.
    ///
    /// Among equal scores the newest entry ranks first.
    pub async fn record(&self, entry: LeaderboardEntry) -> Vec<LeaderboardEntry> {
        let mut board = Vec::with_capacity(LEADERBOARD_CAPACITY + 1);
        board.push(entry);
        board.extend(self.entries().await);
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board.truncate(LEADERBOARD_CAPACITY);
        self.storage
            .set(LogicalKey::Leaderboard.as_str(), &board)
            .await;
        board
    }
}
