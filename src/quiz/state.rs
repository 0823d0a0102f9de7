use serde::{Deserialize, Serialize};

/// Counters owned by the main loop. Only the engine writes to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub round_number: u32,
    pub score: u32,
    pub mistakes: u32,
    pub current_word: Option<String>,
    pub words_remaining: usize,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            round_number: 1,
            score: 0,
            mistakes: 0,
            current_word: None,
            words_remaining: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Presenting,
    Timing,
    AwaitingAnswer,
    Resolved(Outcome),
    Cooldown,
    RoundComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::Correct => "Right!",
            Outcome::Incorrect => "Wrong!",
            Outcome::TimedOut => "Time is up!",
        }
    }
}

/// Summary handed back when a session stops.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// `false` when the session was cancelled before the retry set emptied.
    pub completed: bool,
    pub rounds: u32,
    pub score: u32,
    pub mistakes: u32,
    pub top_mistakes: Vec<(String, u32)>,
}
