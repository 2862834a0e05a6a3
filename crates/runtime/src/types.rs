//! Shared session types at the runtime API boundary.

use quiz_core::{MatchCommand, MatchState, QuestCommand, QuestState};

/// Which game the session plays. Fixed at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    Match,
    Quest,
}

/// A core command addressed to the session's engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Match(MatchCommand),
    Quest(QuestCommand),
}

impl SessionCommand {
    /// Command name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Match(cmd) => cmd.name(),
            SessionCommand::Quest(cmd) => cmd.name(),
        }
    }

    /// The mode this command belongs to.
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionCommand::Match(_) => SessionMode::Match,
            SessionCommand::Quest(_) => SessionMode::Quest,
        }
    }
}

/// Read-only snapshot of the session state, cloned per query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSnapshot {
    Match(Box<MatchState>),
    Quest(Box<QuestState>),
}

impl SessionSnapshot {
    /// Stable label of the current phase.
    pub fn phase_label(&self) -> &'static str {
        match self {
            SessionSnapshot::Match(state) => state.phase.label(),
            SessionSnapshot::Quest(state) => state.phase.label(),
        }
    }

    /// The stale-event guard for the live question.
    pub fn attempt(&self) -> u64 {
        match self {
            SessionSnapshot::Match(state) => state.attempt,
            SessionSnapshot::Quest(state) => state.attempt,
        }
    }
}
