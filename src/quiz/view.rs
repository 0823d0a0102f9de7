use crate::quiz::state::{Outcome, Phase, RoundState};
use crate::quiz::timer::QuestionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub score: u32,
    pub mistakes: u32,
    pub round: u32,
}

impl From<&RoundState> for Header {
    fn from(state: &RoundState) -> Self {
        Self {
            score: state.score,
            mistakes: state.mistakes,
            round: state.round_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub outcome: Outcome,
    pub answer: String,
}

/// Everything the presentation layer needs to draw one question screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionView {
    pub question: QuestionId,
    pub phase: Phase,
    pub header: Header,
    pub words_left: usize,
    pub word: String,
    pub prompt: String,
    pub choices: Vec<String>,
    /// `None` when the question is untimed.
    pub time_remaining: Option<u32>,
    pub time_limit: u32,
    pub feedback: Option<Feedback>,
    /// One-off status line, e.g. where a save went.
    pub notice: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PauseView {
    pub header: Option<Header>,
    pub status: Option<String>,
}

pub const PAUSE_OPTIONS: [&str; 3] = ["Continue", "Save and continue", "Exit to menu"];

/// Receives display payloads from the engine. Implementations draw; they
/// never drive the engine directly.
pub trait Presenter {
    fn show_question(&mut self, view: &QuestionView) -> anyhow::Result<()>;
    fn show_pause(&mut self, view: &PauseView) -> anyhow::Result<()>;
}
