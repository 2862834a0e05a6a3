//! Session worker that owns the authoritative session state.
//!
//! Receives commands from [`SessionHandle`](crate::api::SessionHandle),
//! executes them via the quiz-core engines, and publishes events. The worker
//! is also the effect scheduler demanded by the engines' pure design: after
//! every dispatch it observes the fresh snapshot and reconciles the outside
//! world with it. An armed clock gets a one-second ticker, a checking phase
//! gets its grade resolved (locally, or through the external judge with the
//! exact-match fallback), and everything else gets torn down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, interval_at};
use tracing::{debug, warn};

use quiz_core::{
    ClockTick, CommandResult, GradeResult, Hall, HallGrading, MatchCommand, MatchEngine,
    MatchPhase, MatchState, PcgRng, QuestCommand, QuestEngine, QuestPhase, QuestState, Question,
    QuestionBank, QuizEnv, RuleSet, grade_exact,
};

use super::Command;
use crate::api::{Result, RuntimeError};
use crate::events::{AuthoringEvent, ClockEvent, Event, EventBus, SessionEvent};
use crate::providers::{AnswerJudge, AuthoringRequest, JudgeRequest, QuestionAuthor};
use crate::types::{SessionCommand, SessionSnapshot};

/// The one mutable aggregate, wrapped per mode.
pub(crate) enum ModeState {
    Match(MatchState),
    Quest(QuestState),
}

/// Background task that processes session commands.
pub(crate) struct SessionWorker {
    mode: ModeState,
    bank: Arc<QuestionBank>,
    halls: Arc<Vec<Hall>>,
    rules: Arc<RuleSet>,
    rng: PcgRng,
    judge: Option<Arc<dyn AnswerJudge>>,
    author: Option<Arc<dyn QuestionAuthor>>,
    judge_timeout: Duration,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    verdict_tx: mpsc::Sender<(u64, GradeResult)>,
    verdict_rx: mpsc::Receiver<(u64, GradeResult)>,
    /// Live while the session clock is armed; dropped to cancel.
    ticker: Option<Interval>,
    /// Attempt id the ticker was armed for; ticks carry it so a tick raced
    /// against a transition can never land in a newer question.
    ticker_attempt: u64,
    /// Attempt id currently out with the judge, if any.
    pending_judge: Option<u64>,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        mode: ModeState,
        bank: Arc<QuestionBank>,
        halls: Arc<Vec<Hall>>,
        rules: Arc<RuleSet>,
        judge: Option<Arc<dyn AnswerJudge>>,
        author: Option<Arc<dyn QuestionAuthor>>,
        judge_timeout: Duration,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let (verdict_tx, verdict_rx) = mpsc::channel(8);
        Self {
            mode,
            bank,
            halls,
            rules,
            rng: PcgRng,
            judge,
            author,
            judge_timeout,
            command_rx,
            event_bus,
            verdict_tx,
            verdict_rx,
            ticker: None,
            ticker_attempt: 0,
            pending_judge: None,
        }
    }

    /// Main worker loop. Exits when every handle is dropped, which also
    /// cancels the ticker and orphans any in-flight judge call.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => break,
                    }
                }
                Some((attempt, verdict)) = self.verdict_rx.recv() => {
                    self.resolve_verdict(attempt, verdict);
                }
                _ = Self::next_tick(&mut self.ticker) => {
                    self.advance_clock();
                }
            }
        }
        debug!("session worker shutting down");
    }

    /// Waits for the next armed tick, or forever when the clock is idle.
    async fn next_tick(ticker: &mut Option<Interval>) {
        match ticker {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Dispatch { command, reply } => {
                let result = self.dispatch(command);
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Compose { request, reply } => {
                self.spawn_compose(request, reply);
            }
        }
    }

    /// Executes one engine command, publishes what it did, and reconciles
    /// effects with the fresh snapshot.
    fn dispatch(&mut self, command: SessionCommand) -> Result<CommandResult> {
        let name = command.name();
        let phase_before = self.phase_label();

        let env = QuizEnv::new(&self.bank, &self.halls, &self.rules, &self.rng);
        let result = match (&mut self.mode, &command) {
            (ModeState::Match(state), SessionCommand::Match(cmd)) => {
                MatchEngine::new(state).execute(env, cmd)?
            }
            (ModeState::Quest(state), SessionCommand::Quest(cmd)) => {
                QuestEngine::new(state).execute(env, cmd)?
            }
            _ => return Err(RuntimeError::ModeMismatch(name)),
        };

        if matches!(result, CommandResult::Ignored) {
            debug!(command = name, "discarded stale session event");
        } else {
            let phase_changed = self.phase_label() != phase_before;
            self.publish(&result, phase_changed);
        }
        self.sync_effects();
        Ok(result)
    }

    fn phase_label(&self) -> &'static str {
        match &self.mode {
            ModeState::Match(state) => state.phase.label(),
            ModeState::Quest(state) => state.phase.label(),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        match &self.mode {
            ModeState::Match(state) => SessionSnapshot::Match(Box::new(state.clone())),
            ModeState::Quest(state) => SessionSnapshot::Quest(Box::new(state.clone())),
        }
    }

    // ----- event publishing -----

    fn publish(&self, result: &CommandResult, phase_changed: bool) {
        if phase_changed {
            self.event_bus.publish(Event::Session(SessionEvent::PhaseEntered {
                phase: self.phase_label().to_owned(),
            }));
        }

        match result {
            CommandResult::Graded(grade) => {
                self.event_bus.publish(Event::Session(SessionEvent::AnswerGraded {
                    is_correct: grade.is_correct,
                    feedback: grade.feedback.clone(),
                }));
                self.publish_scores();
            }
            CommandResult::Ticked(ClockTick::Running(remaining)) => {
                self.event_bus.publish(Event::Clock(ClockEvent::Tick {
                    remaining: *remaining,
                }));
            }
            CommandResult::Ticked(ClockTick::Expired) => {
                self.event_bus.publish(Event::Clock(ClockEvent::Expired));
                self.publish_scores();
            }
            CommandResult::ResetDone => {
                self.event_bus
                    .publish(Event::Session(SessionEvent::SessionReset));
            }
            _ => {}
        }

        if phase_changed {
            self.publish_terminal();
        }
    }

    fn publish_scores(&self) {
        let event = match &self.mode {
            ModeState::Match(state) => SessionEvent::MatchScore {
                home: state.scores.home,
                away: state.scores.away,
            },
            ModeState::Quest(state) => SessionEvent::QuestScore {
                seeker: state.seeker_score,
                keeper: state.keeper_score,
                memory_keys: state.memory_keys,
            },
        };
        self.event_bus.publish(Event::Session(event));
    }

    fn publish_terminal(&self) {
        let event = match &self.mode {
            ModeState::Match(state) => match &state.phase {
                MatchPhase::Victory { winner } => Some(SessionEvent::MatchDecided { winner: *winner }),
                _ => None,
            },
            ModeState::Quest(state) => match &state.phase {
                QuestPhase::Victory { margin } => Some(SessionEvent::QuestDecided {
                    victory: true,
                    margin: Some(*margin),
                }),
                QuestPhase::Defeat => Some(SessionEvent::QuestDecided {
                    victory: false,
                    margin: None,
                }),
                _ => None,
            },
        };
        if let Some(event) = event {
            self.event_bus.publish(Event::Session(event));
        }
    }

    // ----- effect reconciliation -----

    fn sync_effects(&mut self) {
        self.sync_ticker();
        self.sync_grading();
    }

    /// Keep the 1 Hz ticker alive exactly while the session clock is armed.
    fn sync_ticker(&mut self) {
        let (armed, attempt) = match &self.mode {
            ModeState::Match(state) => (state.clock.is_armed(), state.attempt),
            ModeState::Quest(state) => (state.clock.is_armed(), state.attempt),
        };

        if armed {
            if self.ticker.is_none() || self.ticker_attempt != attempt {
                // Fresh countdown: the first tick lands a full second out
                let period = Duration::from_secs(1);
                self.ticker = Some(interval_at(Instant::now() + period, period));
                self.ticker_attempt = attempt;
            }
        } else {
            self.ticker = None;
        }
    }

    /// Resolve a parked submission: locally in the same command turn, or by
    /// sending it out to the judge for fuzzy halls.
    fn sync_grading(&mut self) {
        let checking = match &self.mode {
            ModeState::Match(state) => match &state.phase {
                MatchPhase::Checking { question, submitted } => {
                    Some((state.attempt, question.clone(), submitted.clone(), false))
                }
                _ => None,
            },
            ModeState::Quest(state) => match &state.phase {
                QuestPhase::Checking { question, submitted } => {
                    let delegated = self.judge.is_some()
                        && self
                            .halls
                            .get(state.hall_index)
                            .is_some_and(|hall| hall.grading == HallGrading::Fuzzy);
                    Some((state.attempt, question.clone(), submitted.clone(), delegated))
                }
                _ => None,
            },
        };

        let Some((attempt, question, submitted, delegated)) = checking else {
            self.pending_judge = None;
            return;
        };
        if self.pending_judge == Some(attempt) {
            return;
        }

        if delegated {
            self.pending_judge = Some(attempt);
            self.spawn_judge(attempt, question, submitted);
        } else {
            let resolve = match &self.mode {
                ModeState::Match(_) => SessionCommand::Match(MatchCommand::resolve(attempt, None)),
                ModeState::Quest(_) => SessionCommand::Quest(QuestCommand::resolve(attempt, None)),
            };
            if let Err(error) = self.dispatch(resolve) {
                warn!(%error, "local grade resolution failed");
            }
        }
    }

    /// Fire the judge round-trip. Whatever happens (error, timeout,
    /// malformed verdict), a grade comes back, falling back to exact
    /// matching so the state machine is never stuck on the collaborator.
    fn spawn_judge(&self, attempt: u64, question: Question, submitted: String) {
        let Some(judge) = self.judge.clone() else {
            return;
        };
        let request = JudgeRequest::for_question(&question, &submitted);
        let timeout = self.judge_timeout;
        let verdict_tx = self.verdict_tx.clone();

        tokio::spawn(async move {
            let verdict = match tokio::time::timeout(timeout, judge.judge(&request)).await {
                Ok(Ok(verdict)) => GradeResult {
                    is_correct: verdict.is_correct,
                    feedback: verdict.feedback,
                },
                Ok(Err(error)) => {
                    warn!(%error, "answer judge failed; falling back to exact grading");
                    grade_exact(&question, &submitted)
                }
                Err(_) => {
                    warn!("answer judge timed out; falling back to exact grading");
                    grade_exact(&question, &submitted)
                }
            };
            // The session may have moved on; the attempt guard discards
            // the verdict in that case
            let _ = verdict_tx.send((attempt, verdict)).await;
        });
    }

    fn resolve_verdict(&mut self, attempt: u64, verdict: GradeResult) {
        self.pending_judge = None;
        let resolve = match &self.mode {
            ModeState::Match(_) => SessionCommand::Match(MatchCommand::resolve(attempt, Some(verdict))),
            ModeState::Quest(_) => SessionCommand::Quest(QuestCommand::resolve(attempt, Some(verdict))),
        };
        match self.dispatch(resolve) {
            Ok(CommandResult::Ignored) => debug!("late judge verdict discarded"),
            Ok(_) => {}
            Err(error) => warn!(%error, "verdict resolution failed"),
        }
    }

    fn advance_clock(&mut self) {
        let attempt = self.ticker_attempt;
        let tick = match &self.mode {
            ModeState::Match(_) => SessionCommand::Match(MatchCommand::tick(attempt)),
            ModeState::Quest(_) => SessionCommand::Quest(QuestCommand::tick(attempt)),
        };
        if let Err(error) = self.dispatch(tick) {
            warn!(%error, "clock tick dispatch failed");
        }
    }

    // ----- authoring -----

    /// Authoring runs in its own task so a slow author never stalls the
    /// session or its ticker. Failures surface to the operator and to the
    /// authoring topic; the in-progress game is untouched either way.
    fn spawn_compose(
        &self,
        request: AuthoringRequest,
        reply: tokio::sync::oneshot::Sender<Result<Vec<Question>>>,
    ) {
        let Some(author) = self.author.clone() else {
            let _ = reply.send(Err(RuntimeError::AuthorNotSet));
            return;
        };
        let event_bus = self.event_bus.clone();

        tokio::spawn(async move {
            match author.compose(&request).await {
                Ok(questions) => {
                    event_bus.publish(Event::Authoring(AuthoringEvent::Composed {
                        count: questions.len(),
                    }));
                    let _ = reply.send(Ok(questions));
                }
                Err(error) => {
                    event_bus.publish(Event::Authoring(AuthoringEvent::Failed {
                        error: error.to_string(),
                    }));
                    let _ = reply.send(Err(RuntimeError::Authoring(error)));
                }
            }
        });
    }
}
