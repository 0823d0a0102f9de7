use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::quiz::error::QuizError;
use crate::quiz::pause::CancelToken;
use crate::quiz::timer::{QuestionId, TimerEvent};

/// Everything the main loop can be woken by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    /// A digit key, 1-based.
    Choice(usize),
    /// Skip the post-answer delay.
    Continue,
    /// The pause gate was closed; open the pause menu.
    Pause,
    /// End the session.
    Cancel,
    Timer(TimerEvent),
}

/// What [`InputChannel::get_choice`] hands back to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Choice(usize),
    Tick { question: QuestionId, remaining: u32 },
    Expired { question: QuestionId },
    Pause,
}

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Consumer side of the session event channel.
///
/// Waits are bounded by `poll_interval` so cancellation is noticed promptly
/// without spinning.
pub struct InputChannel {
    rx: Receiver<QuizEvent>,
    /// Events set aside by [`InputChannel::discard_key_presses`].
    backlog: VecDeque<QuizEvent>,
    poll_interval: Duration,
}

impl InputChannel {
    pub fn with_poll_interval(rx: Receiver<QuizEvent>, poll_interval: Duration) -> Self {
        Self {
            rx,
            backlog: VecDeque::new(),
            poll_interval,
        }
    }

    /// Drop choices and `Continue` presses already queued, so a key meant
    /// for an earlier question cannot answer the next one. Every other
    /// event is kept in arrival order. Returns how many presses were dropped.
    pub fn discard_key_presses(&mut self) -> usize {
        let mut dropped = 0;
        loop {
            match self.rx.try_recv() {
                Ok(QuizEvent::Choice(_) | QuizEvent::Continue) => dropped += 1,
                Ok(event) => self.backlog.push_back(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        dropped
    }

    /// Wait for a choice in `1..=choices`, or for a timer/pause signal.
    ///
    /// Digits outside the range and stray `Continue` presses are ignored.
    /// Cancellation unwinds with [`QuizError::Cancelled`].
    pub fn get_choice(&mut self, choices: usize, cancel: &CancelToken) -> Result<Signal, QuizError> {
        loop {
            let Some(event) = self.poll(cancel)? else {
                continue;
            };
            match event {
                QuizEvent::Choice(n) if (1..=choices).contains(&n) => return Ok(Signal::Choice(n)),
                QuizEvent::Choice(_) | QuizEvent::Continue => {}
                QuizEvent::Pause => return Ok(Signal::Pause),
                QuizEvent::Cancel => {
                    cancel.cancel();
                    return Err(QuizError::Cancelled);
                }
                QuizEvent::Timer(TimerEvent::Tick { question, remaining }) => {
                    return Ok(Signal::Tick { question, remaining });
                }
                QuizEvent::Timer(TimerEvent::Expired { question }) => {
                    return Ok(Signal::Expired { question });
                }
            }
        }
    }

    /// Next event arriving before `deadline`, or `None` once it passes.
    pub fn next_before(
        &mut self,
        deadline: Instant,
        cancel: &CancelToken,
    ) -> Result<Option<QuizEvent>, QuizError> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let wait = (deadline - now).min(self.poll_interval);
            match self.recv(wait, cancel)? {
                Some(QuizEvent::Cancel) => {
                    cancel.cancel();
                    return Err(QuizError::Cancelled);
                }
                Some(event) => return Ok(Some(event)),
                None => {}
            }
        }
    }

    fn poll(&mut self, cancel: &CancelToken) -> Result<Option<QuizEvent>, QuizError> {
        self.recv(self.poll_interval, cancel)
    }

    fn recv(&mut self, wait: Duration, cancel: &CancelToken) -> Result<Option<QuizEvent>, QuizError> {
        if cancel.is_cancelled() {
            return Err(QuizError::Cancelled);
        }
        if let Some(event) = self.backlog.pop_front() {
            return Ok(Some(event));
        }
        match self.rx.recv_timeout(wait) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                cancel.cancel();
                Err(QuizError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[test]
    fn test_out_of_range_digits_are_ignored() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputChannel::with_poll_interval(rx, DEFAULT_POLL_INTERVAL);
        let cancel = CancelToken::new();
        tx.send(QuizEvent::Choice(0)).unwrap();
        tx.send(QuizEvent::Choice(9)).unwrap();
        tx.send(QuizEvent::Continue).unwrap();
        tx.send(QuizEvent::Choice(3)).unwrap();
        assert_eq!(input.get_choice(4, &cancel).unwrap(), Signal::Choice(3));
    }

    #[test]
    fn test_timer_events_are_forwarded() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputChannel::with_poll_interval(rx, DEFAULT_POLL_INTERVAL);
        let cancel = CancelToken::new();
        let q = QuestionId(5);
        tx.send(QuizEvent::Timer(TimerEvent::Tick { question: q, remaining: 4 }))
            .unwrap();
        tx.send(QuizEvent::Timer(TimerEvent::Expired { question: q }))
            .unwrap();
        assert_eq!(
            input.get_choice(4, &cancel).unwrap(),
            Signal::Tick { question: q, remaining: 4 }
        );
        assert_eq!(
            input.get_choice(4, &cancel).unwrap(),
            Signal::Expired { question: q }
        );
    }

    #[test]
    fn test_cancel_token_unwinds_waiting_call() {
        let (tx, rx) = mpsc::channel::<QuizEvent>();
        let mut input = InputChannel::with_poll_interval(rx, Duration::from_millis(5));
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.cancel();
        });
        let result = input.get_choice(4, &cancel);
        assert!(matches!(result, Err(QuizError::Cancelled)));
        handle.join().unwrap();
        drop(tx);
    }

    #[test]
    fn test_cancel_event_sets_token() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputChannel::with_poll_interval(rx, DEFAULT_POLL_INTERVAL);
        let cancel = CancelToken::new();
        tx.send(QuizEvent::Cancel).unwrap();
        assert!(input.get_choice(4, &cancel).is_err());
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_disconnected_channel_cancels() {
        let (tx, rx) = mpsc::channel::<QuizEvent>();
        drop(tx);
        let mut input = InputChannel::with_poll_interval(rx, DEFAULT_POLL_INTERVAL);
        let cancel = CancelToken::new();
        assert!(input.get_choice(4, &cancel).is_err());
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_next_before_times_out() {
        let (_tx, rx) = mpsc::channel::<QuizEvent>();
        let mut input = InputChannel::with_poll_interval(rx, Duration::from_millis(5));
        let cancel = CancelToken::new();
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(input.next_before(deadline, &cancel).unwrap(), None);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_discard_drops_presses_but_keeps_signals() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputChannel::with_poll_interval(rx, Duration::from_millis(5));
        let cancel = CancelToken::new();
        let q = QuestionId(2);
        tx.send(QuizEvent::Choice(1)).unwrap();
        tx.send(QuizEvent::Timer(TimerEvent::Expired { question: q })).unwrap();
        tx.send(QuizEvent::Continue).unwrap();
        tx.send(QuizEvent::Pause).unwrap();
        tx.send(QuizEvent::Choice(2)).unwrap();

        assert_eq!(input.discard_key_presses(), 3);
        assert_eq!(
            input.get_choice(4, &cancel).unwrap(),
            Signal::Expired { question: q }
        );
        assert_eq!(input.get_choice(4, &cancel).unwrap(), Signal::Pause);

        tx.send(QuizEvent::Choice(4)).unwrap();
        assert_eq!(input.get_choice(4, &cancel).unwrap(), Signal::Choice(4));
    }
}
