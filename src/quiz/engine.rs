use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::quiz::deck::QuestionDeck;
use crate::quiz::error::QuizError;
use crate::quiz::input::{DEFAULT_POLL_INTERVAL, InputChannel, QuizEvent, Signal};
use crate::quiz::mistakes::MistakeTracker;
use crate::quiz::pause::{CancelToken, PauseGate};
use crate::quiz::question::Question;
use crate::quiz::state::{Outcome, Phase, RoundState, SessionReport};
use crate::quiz::timer::{QuestionId, QuestionTimer};
use crate::quiz::view::{Feedback, Header, PAUSE_OPTIONS, PauseView, Presenter, QuestionView};
use crate::store::schema::SessionSnapshot;

/// Destination for snapshots requested from the pause menu.
pub trait SnapshotSink {
    /// Persist `snapshot`, returning a human-readable location.
    fn persist(&mut self, snapshot: &SessionSnapshot) -> Result<String>;
}

#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub time_limit_secs: u32,
    /// Length of one countdown unit. One second outside of tests.
    pub tick: Duration,
    pub cooldown: Duration,
    pub count_timeouts_as_mistakes: bool,
    pub report_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 10,
            tick: Duration::from_secs(1),
            cooldown: Duration::from_millis(1500),
            count_timeouts_as_mistakes: false,
            report_size: 5,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            time_limit_secs: config.time_limit_secs,
            cooldown: Duration::from_millis(config.cooldown_ms),
            count_timeouts_as_mistakes: config.count_timeouts_as_mistakes,
            report_size: config.report_size,
            ..Self::default()
        }
    }
}

/// The shared plumbing of one session: the event channel, the pause gate
/// and the cancellation token. Clone the handles you need (listener,
/// tests) before handing it to [`RoundEngine::new`].
pub struct SessionIo {
    pub events: Sender<QuizEvent>,
    pub input: InputChannel,
    pub gate: PauseGate,
    pub cancel: CancelToken,
}

impl SessionIo {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        let (events, rx) = mpsc::channel();
        Self {
            events,
            input: InputChannel::with_poll_interval(rx, poll_interval),
            gate: PauseGate::new(),
            cancel: CancelToken::new(),
        }
    }
}

impl Default for SessionIo {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives rounds of questions until every word has been answered correctly
/// in its latest round, or the session is cancelled.
///
/// The engine is the only writer of score, mistakes, round and deck state.
/// The countdown ticker and the key listener talk to it through the event
/// channel and the pause gate only.
pub struct RoundEngine<'a> {
    dictionary: &'a Dictionary,
    presenter: &'a mut dyn Presenter,
    sink: Option<&'a mut dyn SnapshotSink>,
    settings: EngineSettings,
    deck: QuestionDeck,
    mistakes: MistakeTracker,
    state: RoundState,
    phase: Phase,
    events: Sender<QuizEvent>,
    input: InputChannel,
    gate: PauseGate,
    cancel: CancelToken,
    timer: QuestionTimer,
    last_question: QuestionId,
    pending_notice: Option<String>,
    rng: SmallRng,
}

impl<'a> RoundEngine<'a> {
    pub fn new(
        dictionary: &'a Dictionary,
        settings: EngineSettings,
        io: SessionIo,
        presenter: &'a mut dyn Presenter,
    ) -> Self {
        let timer = QuestionTimer::new(settings.tick);
        Self {
            dictionary,
            presenter,
            sink: None,
            deck: QuestionDeck::new(dictionary.words()),
            mistakes: MistakeTracker::default(),
            state: RoundState::default(),
            phase: Phase::Presenting,
            events: io.events,
            input: io.input,
            gate: io.gate,
            cancel: io.cancel,
            timer,
            last_question: QuestionId::default(),
            pending_notice: None,
            rng: SmallRng::from_entropy(),
            settings,
        }
    }

    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    /// Status line shown with the first question, e.g. why a saved game
    /// could not be resumed.
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.pending_notice = Some(notice.into());
        self
    }

    pub fn with_snapshot_sink(mut self, sink: &'a mut dyn SnapshotSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Overwrite counters and the retry set with a saved session.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) {
        self.state.score = snapshot.score;
        self.state.mistakes = snapshot.mistakes;
        self.state.round_number = snapshot.round_number.max(1);
        let dropped = self.deck.restore_wrong(snapshot.wrong_words.iter().cloned());
        if !dropped.is_empty() {
            tracing::warn!(
                ?dropped,
                "saved retry words are missing from the dictionary and were skipped"
            );
        }
        tracing::info!(
            score = self.state.score,
            mistakes = self.state.mistakes,
            round = self.state.round_number,
            retries = self.deck.wrong_words().len(),
            "session restored"
        );
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(
            self.state.score,
            self.state.mistakes,
            self.state.round_number,
            self.deck.active_words().clone(),
            self.deck.wrong_words().clone(),
        )
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn deck(&self) -> &QuestionDeck {
        &self.deck
    }

    pub fn mistakes(&self) -> &MistakeTracker {
        &self.mistakes
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Play until the retry set is empty after a round.
    ///
    /// Cancellation is not an error: it ends the session with
    /// `completed: false` and the score reached so far.
    pub fn run(&mut self) -> Result<SessionReport> {
        let result = self.play_session();
        self.timer.stop();

        match result {
            Ok(()) => {
                tracing::info!(
                    rounds = self.state.round_number,
                    score = self.state.score,
                    mistakes = self.state.mistakes,
                    "session complete"
                );
                Ok(self.report(true))
            }
            Err(err) if err.downcast_ref::<QuizError>().is_some_and(QuizError::is_cancelled) => {
                self.cancel.cancel();
                tracing::info!(score = self.state.score, "game over: session cancelled");
                Ok(self.report(false))
            }
            Err(err) => {
                self.cancel.cancel();
                Err(err)
            }
        }
    }

    fn report(&self, completed: bool) -> SessionReport {
        SessionReport {
            completed,
            rounds: self.state.round_number,
            score: self.state.score,
            mistakes: self.state.mistakes,
            top_mistakes: self.mistakes.top(self.settings.report_size),
        }
    }

    fn play_session(&mut self) -> Result<()> {
        loop {
            self.play_round()?;
            if !self.deck.has_pending_retries() {
                return Ok(());
            }
            self.state.round_number += 1;
            tracing::info!(
                round = self.state.round_number,
                retries = self.deck.wrong_words().len(),
                "starting retry round"
            );
        }
    }

    fn play_round(&mut self) -> Result<()> {
        let words = self.deck.next_round_words(&mut self.rng);
        let total = words.len();
        tracing::info!(round = self.state.round_number, words = total, "round started");

        for (i, word) in words.into_iter().enumerate() {
            self.state.words_remaining = total - i;
            self.ask(word)?;
        }

        self.state.words_remaining = 0;
        self.state.current_word = None;
        self.phase = Phase::RoundComplete;
        Ok(())
    }

    fn ask(&mut self, word: String) -> Result<()> {
        while self.hold_while_paused(None)? {}
        if self.cancel.is_cancelled() {
            return Err(QuizError::Cancelled.into());
        }

        let stale = self.input.discard_key_presses();
        if stale > 0 {
            tracing::debug!(stale, "dropped key presses left over from the previous question");
        }

        self.phase = Phase::Presenting;
        self.last_question = self.last_question.next();
        let question = Question::build(self.last_question, &word, self.dictionary, &mut self.rng)?;
        self.state.current_word = Some(word);

        self.phase = Phase::Timing;
        let timed = match self.timer.start(
            question.id,
            self.settings.time_limit_secs,
            &self.gate,
            &self.events,
        ) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    word = %question.word,
                    error = %err,
                    "timer disabled for this question"
                );
                false
            }
        };

        self.phase = Phase::AwaitingAnswer;
        let mut view = self.question_view(&question, timed);
        view.notice = self.pending_notice.take();
        self.presenter.show_question(&view)?;

        let outcome = self.await_answer(&question, &mut view)?;
        self.timer.stop();
        self.apply(&question, outcome);

        self.phase = Phase::Resolved(outcome);
        view.phase = self.phase;
        view.header = Header::from(&self.state);
        view.feedback = Some(Feedback {
            outcome,
            answer: question.answer.clone(),
        });
        self.presenter.show_question(&view)?;

        self.cooldown(&mut view)
    }

    fn await_answer(&mut self, question: &Question, view: &mut QuestionView) -> Result<Outcome> {
        loop {
            match self.input.get_choice(question.choices.len(), &self.cancel)? {
                Signal::Choice(n) => {
                    // Losing the claim means the countdown hit zero first.
                    if !self.timer.resolve() {
                        return Ok(Outcome::TimedOut);
                    }
                    return Ok(if question.is_correct(n) {
                        Outcome::Correct
                    } else {
                        Outcome::Incorrect
                    });
                }
                Signal::Expired { question: id } if id == question.id => {
                    return Ok(Outcome::TimedOut);
                }
                Signal::Tick {
                    question: id,
                    remaining,
                } if id == question.id => {
                    view.time_remaining = Some(remaining);
                    self.presenter.show_question(view)?;
                }
                Signal::Pause => {
                    self.hold_while_paused(Some(&mut *view))?;
                    if self.timer.time_is_up() {
                        return Ok(Outcome::TimedOut);
                    }
                }
                // leftovers from an earlier question
                Signal::Tick { .. } | Signal::Expired { .. } => {}
            }
        }
    }

    fn apply(&mut self, question: &Question, outcome: Outcome) {
        let word = question.word.as_str();
        match outcome {
            Outcome::Correct => {
                self.state.score += 1;
                self.deck.mark_correct(word);
            }
            Outcome::Incorrect => {
                self.state.mistakes += 1;
                self.mistakes.record(word);
                self.deck.mark_incorrect(word);
            }
            Outcome::TimedOut => {
                if self.settings.count_timeouts_as_mistakes {
                    self.state.mistakes += 1;
                    self.mistakes.record(word);
                }
                self.deck.mark_incorrect(word);
            }
        }
        tracing::debug!(
            word,
            ?outcome,
            score = self.state.score,
            mistakes = self.state.mistakes,
            "question resolved"
        );
    }

    /// Short pause after feedback. `Continue` skips it; timer events cannot.
    fn cooldown(&mut self, view: &mut QuestionView) -> Result<()> {
        self.phase = Phase::Cooldown;
        let deadline = Instant::now() + self.settings.cooldown;
        loop {
            match self.input.next_before(deadline, &self.cancel)? {
                None | Some(QuizEvent::Continue) => return Ok(()),
                Some(QuizEvent::Pause) => {
                    if self.hold_while_paused(Some(&mut *view))? {
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Run the pause menu if the gate is closed. Returns whether a pause
    /// actually happened. On resume, `view` is shown again unchanged apart
    /// from ticks that raced the pause.
    fn hold_while_paused(&mut self, mut view: Option<&mut QuestionView>) -> Result<bool> {
        if !self.gate.is_paused() {
            return Ok(false);
        }
        tracing::info!(word = ?self.state.current_word, "paused");

        let mut pause_view = PauseView {
            header: Some(Header::from(&self.state)),
            status: None,
        };
        self.presenter.show_pause(&pause_view)?;

        let mut notice = None;
        loop {
            match self.input.get_choice(PAUSE_OPTIONS.len(), &self.cancel)? {
                Signal::Choice(1) => break,
                Signal::Choice(2) => match self.save_snapshot() {
                    Ok(location) => {
                        notice = Some(format!("Saved to {location}"));
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to save session");
                        pause_view.status = Some(format!("Save failed: {err}"));
                        self.presenter.show_pause(&pause_view)?;
                    }
                },
                Signal::Choice(_) => {
                    self.cancel.cancel();
                    self.gate.resume();
                    return Err(QuizError::Cancelled.into());
                }
                Signal::Tick {
                    question,
                    remaining,
                } => {
                    if let Some(v) = view.as_deref_mut()
                        && v.question == question
                    {
                        v.time_remaining = Some(remaining);
                    }
                }
                // expiry is read back from the timer after resuming
                Signal::Expired { .. } | Signal::Pause => {}
            }
        }

        self.gate.resume();
        tracing::info!("resumed");
        if let Some(v) = view {
            v.notice = notice;
            self.presenter.show_question(v)?;
        }
        Ok(true)
    }

    fn save_snapshot(&mut self) -> Result<String> {
        let snapshot = self.snapshot();
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| anyhow!("saving is not available"))?;
        sink.persist(&snapshot)
    }

    fn question_view(&self, question: &Question, timed: bool) -> QuestionView {
        let limit = self.settings.time_limit_secs;
        QuestionView {
            question: question.id,
            phase: self.phase,
            header: Header::from(&self.state),
            words_left: self.state.words_remaining,
            word: question.word.clone(),
            prompt: format!("What does the word '{}' mean?", question.word),
            choices: question.choices.clone(),
            time_remaining: timed.then_some(limit),
            time_limit: limit,
            feedback: None,
            notice: None,
        }
    }
}
