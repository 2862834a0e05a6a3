//! Background tasks internal to the crate.

mod session;

pub(crate) use session::{ModeState, SessionWorker};

use tokio::sync::oneshot;

use quiz_core::{CommandResult, Question};

use crate::api::Result;
use crate::providers::AuthoringRequest;
use crate::types::{SessionCommand, SessionSnapshot};

/// Commands that can be sent to the session worker
pub(crate) enum Command {
    /// Execute an engine command and reply with its result.
    Dispatch {
        command: SessionCommand,
        reply: oneshot::Sender<Result<CommandResult>>,
    },
    /// Query the current session state (read-only clone).
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Ask the authoring collaborator for new questions.
    Compose {
        request: AuthoringRequest,
        reply: oneshot::Sender<Result<Vec<Question>>>,
    },
}
