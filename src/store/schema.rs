use chrono::{DateTime, Local};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Resumable capture of a session.
///
/// Restoring overwrites score, mistakes, round and the retry set; the active
/// words always come from the dictionary loaded at start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub score: u32,
    pub mistakes: u32,
    pub date: DateTime<Local>,
    pub round_number: u32,
    #[serde(default)]
    pub words: IndexSet<String>,
    #[serde(default)]
    pub wrong_words: IndexSet<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SessionSnapshot {
    pub fn new(
        score: u32,
        mistakes: u32,
        round_number: u32,
        words: IndexSet<String>,
        wrong_words: IndexSet<String>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            score,
            mistakes,
            date: Local::now(),
            round_number,
            words,
            wrong_words,
        }
    }

    /// File name the snapshot is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.date.format("%Y-%m-%d_%H-%M-%S"))
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION || self.round_number == 0
    }
}
