use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::quiz::input::QuizEvent;
use crate::quiz::pause::{CancelToken, PauseGate};

/// Translate a key press into a session event.
///
/// `Esc` closes the pause gate right here, before the main loop hears about
/// it, so the countdown freezes without waiting on the loop.
pub fn map_key(key: KeyEvent, gate: &PauseGate) -> Option<QuizEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(QuizEvent::Cancel);
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(QuizEvent::Continue),
        KeyCode::Char(ch) => ch
            .to_digit(10)
            .map(|d| QuizEvent::Choice(d as usize)),
        KeyCode::Esc => {
            gate.pause();
            Some(QuizEvent::Pause)
        }
        _ => None,
    }
}

/// Background key reader for one session. Stops when the session's cancel
/// token is set or the engine drops its receiver.
pub struct KeyListener {
    handle: JoinHandle<()>,
}

impl KeyListener {
    pub fn spawn(
        tx: Sender<QuizEvent>,
        gate: PauseGate,
        cancel: CancelToken,
        poll_rate: Duration,
    ) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                while !cancel.is_cancelled() {
                    if !event::poll(poll_rate).unwrap_or(false) {
                        continue;
                    }
                    let Ok(Event::Key(key)) = event::read() else {
                        continue;
                    };
                    if let Some(ev) = map_key(key, &gate)
                        && tx.send(ev).is_err()
                    {
                        return;
                    }
                }
            })?;
        Ok(Self { handle })
    }

    /// Wait for the listener to notice cancellation and exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::warn!("key listener panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_digits_map_to_choices() {
        let gate = PauseGate::new();
        assert_eq!(map_key(press(KeyCode::Char('3')), &gate), Some(QuizEvent::Choice(3)));
        assert_eq!(map_key(press(KeyCode::Char('x')), &gate), None);
        assert_eq!(map_key(press(KeyCode::Enter), &gate), Some(QuizEvent::Continue));
    }

    #[test]
    fn test_space_skips_cooldown() {
        let gate = PauseGate::new();
        assert_eq!(map_key(press(KeyCode::Char(' ')), &gate), Some(QuizEvent::Continue));
    }

    #[test]
    fn test_escape_pauses_gate() {
        let gate = PauseGate::new();
        assert_eq!(map_key(press(KeyCode::Esc), &gate), Some(QuizEvent::Pause));
        assert!(gate.is_paused());
    }

    #[test]
    fn test_ctrl_c_cancels() {
        let gate = PauseGate::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, &gate), Some(QuizEvent::Cancel));
    }

    #[test]
    fn test_release_events_ignored() {
        let gate = PauseGate::new();
        let key = KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(key, &gate), None);
        assert!(!gate.is_paused());
    }
}
