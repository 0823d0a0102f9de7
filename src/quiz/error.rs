use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("no translation for '{0}' in the loaded dictionary")]
    MissingTranslation(String),

    #[error("session cancelled")]
    Cancelled,
}

impl QuizError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QuizError::Cancelled)
    }
}
