use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::quiz::input::QuizEvent;
use crate::quiz::pause::PauseGate;

/// Monotonic stamp identifying one presented question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(pub u64);

impl QuestionId {
    pub fn next(self) -> Self {
        QuestionId(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { question: QuestionId, remaining: u32 },
    Expired { question: QuestionId },
}

const LIVE: u8 = 0;
const RESOLVED: u8 = 1;
const EXPIRED: u8 = 2;

struct ActiveTimer {
    question: QuestionId,
    state: Arc<AtomicU8>,
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Countdown for the current question, ticking on its own thread.
///
/// At most one countdown runs at a time: `start` stops the previous one
/// first. The ticker publishes ticks and the final expiry onto the session
/// event channel and never writes any other state.
pub struct QuestionTimer {
    tick: Duration,
    active: Option<ActiveTimer>,
}

impl QuestionTimer {
    pub fn new(tick: Duration) -> Self {
        Self { tick, active: None }
    }

    /// Start counting down `seconds` ticks for `question`.
    ///
    /// Fails only if the ticker thread cannot be spawned; the caller then
    /// runs the question untimed.
    pub fn start(
        &mut self,
        question: QuestionId,
        seconds: u32,
        gate: &PauseGate,
        events: &Sender<QuizEvent>,
    ) -> std::io::Result<()> {
        self.stop();

        let state = Arc::new(AtomicU8::new(LIVE));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticker = Ticker {
            question,
            remaining: seconds.max(1),
            tick: self.tick,
            state: Arc::clone(&state),
            gate: gate.clone(),
            events: events.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("countdown-{}", question.0))
            .spawn(move || ticker.run(stop_rx))?;

        self.active = Some(ActiveTimer {
            question,
            state,
            stop_tx,
            handle,
        });
        Ok(())
    }

    /// Cancel the running countdown, if any, and wait for its thread.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            drop(active.stop_tx);
            if active.handle.join().is_err() {
                tracing::warn!(question = active.question.0, "countdown thread panicked");
            }
        }
    }

    /// Whether the countdown for the current question reached zero.
    pub fn time_is_up(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.state.load(Ordering::Acquire) == EXPIRED)
    }

    /// Claim the current question for an answer. Returns `false` when the
    /// countdown already expired, in which case the answer must be discarded.
    /// Untimed questions can always be claimed.
    pub fn resolve(&self) -> bool {
        match &self.active {
            Some(active) => active
                .state
                .compare_exchange(LIVE, RESOLVED, Ordering::AcqRel, Ordering::Acquire)
                .map_or_else(|current| current == RESOLVED, |_| true),
            None => true,
        }
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Ticker {
    question: QuestionId,
    remaining: u32,
    tick: Duration,
    state: Arc<AtomicU8>,
    gate: PauseGate,
    events: Sender<QuizEvent>,
}

impl Ticker {
    fn run(mut self, stop_rx: mpsc::Receiver<()>) {
        loop {
            match stop_rx.recv_timeout(self.tick) {
                Err(RecvTimeoutError::Timeout) => {}
                // stop() drops the sender
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }

            // Paused: the remaining time stays frozen and a resume starts
            // the current tick over.
            if self.gate.is_paused() {
                self.gate.wait_until_running_timeout(self.tick);
                continue;
            }
            if self.state.load(Ordering::Acquire) != LIVE {
                return;
            }

            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                let expired = self
                    .state
                    .compare_exchange(LIVE, EXPIRED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if expired {
                    let _ = self.events.send(QuizEvent::Timer(TimerEvent::Expired {
                        question: self.question,
                    }));
                }
                return;
            }

            let tick = TimerEvent::Tick {
                question: self.question,
                remaining: self.remaining,
            };
            if self.events.send(QuizEvent::Timer(tick)).is_err() {
                return;
            }
        }
    }
}
