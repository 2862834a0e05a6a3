//! Cloneable façade for issuing commands to the session.
//!
//! [`SessionHandle`] hides channel plumbing behind one named method per legal
//! phase-advancing action (the whole UI boundary of the engines), plus
//! read-only snapshots and per-topic event streams.

use tokio::sync::{broadcast, mpsc, oneshot};

use quiz_core::{
    CommandResult, MatchCommand, MatchState, QuestCommand, QuestState, Question, command,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::providers::AuthoringRequest;
use crate::types::{SessionCommand, SessionMode, SessionSnapshot};
use crate::workers::Command;

/// Client-facing handle to interact with the session
#[derive(Clone)]
pub struct SessionHandle {
    mode: SessionMode,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(
        mode: SessionMode,
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            mode,
            command_tx,
            event_bus,
        }
    }

    /// The game mode this session was built for.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Execute an arbitrary engine command.
    ///
    /// The named helpers below cover every legal action; this is the raw
    /// entry point they share.
    pub async fn dispatch(&self, command: SessionCommand) -> Result<CommandResult> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Dispatch {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Build the mode-appropriate variant of a command both games share.
    fn by_mode(&self, match_cmd: MatchCommand, quest_cmd: QuestCommand) -> SessionCommand {
        match self.mode {
            SessionMode::Match => SessionCommand::Match(match_cmd),
            SessionMode::Quest => SessionCommand::Quest(quest_cmd),
        }
    }

    // ----- shared actions -----

    /// Submit an answer for the live question. Blank text is rejected at
    /// this boundary and never reaches the grader.
    pub async fn submit_answer(&self, text: impl Into<String>) -> Result<CommandResult> {
        let text = text.into();
        self.dispatch(self.by_mode(
            MatchCommand::submit(text.clone()),
            QuestCommand::submit(text),
        ))
        .await
    }

    /// Leave the current result screen.
    pub async fn advance(&self) -> Result<CommandResult> {
        self.dispatch(self.by_mode(
            MatchCommand::Advance(command::AdvanceFromResult),
            QuestCommand::Advance(command::AdvanceFromResult),
        ))
        .await
    }

    /// Abandon the session back to team setup, cancelling the countdown and
    /// discarding any in-flight grading.
    pub async fn reset(&self) -> Result<CommandResult> {
        self.dispatch(self.by_mode(
            MatchCommand::Reset(command::ResetToSetup),
            QuestCommand::Reset(command::ResetToSetup),
        ))
        .await
    }

    // ----- match-mode actions -----

    pub async fn start_match(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::Start(
            command::StartMatch,
        )))
        .await
    }

    pub async fn spin_difficulty(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::SpinDifficulty(
            command::SpinDifficulty,
        )))
        .await
    }

    pub async fn reveal_difficulty(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::RevealDifficulty(
            command::RevealDifficulty,
        )))
        .await
    }

    pub async fn spin_topic(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::SpinTopic(
            command::SpinTopic,
        )))
        .await
    }

    pub async fn reveal_topic(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::RevealTopic(
            command::RevealTopic,
        )))
        .await
    }

    pub async fn ask_question(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::Ask(
            command::AskQuestion,
        )))
        .await
    }

    pub async fn begin_next_round(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Match(MatchCommand::NextRound(
            command::BeginNextRound,
        )))
        .await
    }

    // ----- quest-mode actions -----

    pub async fn start_quest(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Quest(QuestCommand::Start(
            command::StartQuest,
        )))
        .await
    }

    pub async fn enter_first_hall(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Quest(QuestCommand::EnterFirstHall(
            command::EnterFirstHall,
        )))
        .await
    }

    pub async fn begin_challenges(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Quest(QuestCommand::BeginChallenges(
            command::BeginChallenges,
        )))
        .await
    }

    pub async fn use_hint(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Quest(QuestCommand::UseHint(
            command::UseHint,
        )))
        .await
    }

    pub async fn advance_hall(&self) -> Result<CommandResult> {
        self.dispatch(SessionCommand::Quest(QuestCommand::AdvanceHall(
            command::AdvanceFromHallComplete,
        )))
        .await
    }

    // ----- queries and streams -----

    /// Query the current session state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Match-mode snapshot, or a mode mismatch for quest sessions.
    pub async fn match_snapshot(&self) -> Result<MatchState> {
        match self.snapshot().await? {
            SessionSnapshot::Match(state) => Ok(*state),
            SessionSnapshot::Quest(_) => Err(RuntimeError::ModeMismatch("match-snapshot")),
        }
    }

    /// Quest-mode snapshot, or a mode mismatch for match sessions.
    pub async fn quest_snapshot(&self) -> Result<QuestState> {
        match self.snapshot().await? {
            SessionSnapshot::Quest(state) => Ok(*state),
            SessionSnapshot::Match(_) => Err(RuntimeError::ModeMismatch("quest-snapshot")),
        }
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Phase changes, grades, scores, terminal outcomes
    /// - `Topic::Clock` - Countdown ticks and expiry
    /// - `Topic::Authoring` - Content-authoring results
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Ask the authoring collaborator for new questions. Failures surface
    /// here and on the authoring topic; the running game is unaffected.
    pub async fn compose_questions(&self, request: AuthoringRequest) -> Result<Vec<Question>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Compose {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
