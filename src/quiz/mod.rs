pub mod deck;
pub mod engine;
pub mod error;
pub mod input;
pub mod mistakes;
pub mod pause;
pub mod question;
pub mod state;
pub mod timer;
pub mod view;

pub use engine::{EngineSettings, RoundEngine, SessionIo, SnapshotSink};
pub use error::QuizError;
