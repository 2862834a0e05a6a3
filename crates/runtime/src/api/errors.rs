//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, engine execution, and the
//! authoring collaborator so clients can bubble them up with consistent
//! context. Gameplay-internal failures (judge errors, pool exhaustion) never
//! appear here: they degrade inside the session per the grading fallback
//! and retry policies.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::providers::AuthorError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session command `{0}` does not apply to this game mode")]
    ModeMismatch(&'static str),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Execute(#[from] quiz_core::ExecuteError),

    #[error("question author not configured")]
    AuthorNotSet,

    #[error("question authoring failed")]
    Authoring(#[source] AuthorError),
}
