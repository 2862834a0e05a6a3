//! Error types for the command execution pipeline.

use crate::command::{MatchError, QuestError};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionStage {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStage::PreValidate => "pre_validate",
            TransitionStage::Apply => "apply",
            TransitionStage::PostValidate => "post_validate",
        }
    }
}

/// Associates a pipeline stage with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionStageError<E> {
    pub stage: TransitionStage,
    pub error: E,
}

impl<E> TransitionStageError<E> {
    pub fn new(stage: TransitionStage, error: E) -> Self {
        Self { stage, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionStageError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.stage.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionStageError<E> {}

/// Errors surfaced while executing a command through an engine.
///
/// Phase-illegal commands land here without having mutated state; the caller
/// reports them and the session keeps its previous snapshot.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("match command `{command}` failed: {source}")]
    Match {
        command: &'static str,
        source: TransitionStageError<MatchError>,
    },

    #[error("quest command `{command}` failed: {source}")]
    Quest {
        command: &'static str,
        source: TransitionStageError<QuestError>,
    },
}

impl ExecuteError {
    /// The command name the error belongs to.
    pub fn command(&self) -> &'static str {
        match self {
            ExecuteError::Match { command, .. } | ExecuteError::Quest { command, .. } => command,
        }
    }
}
