//! Runtime orchestration for trivia game sessions.
//!
//! This crate wires the pure quiz-core engines to the outside world: a
//! background worker owns the authoritative session state, schedules the
//! once-per-second countdown ticker, resolves grading (locally or through
//! the external judge with its exact-match fallback), and publishes events.
//! Consumers embed [`SessionRuntime`] to host a game and interact with it
//! through [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus for flexible routing
//! - [`providers`] defines the judge and authoring collaborator seams
//! - `workers` keeps the background session task internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod session;
pub mod types;

mod workers;

pub use api::{Result, RuntimeError, SessionHandle};
pub use events::{AuthoringEvent, ClockEvent, Event, EventBus, SessionEvent, Topic};
pub use providers::{
    AnswerJudge, AuthorError, AuthoringRequest, JudgeError, JudgeRequest, JudgeVerdict,
    KeywordJudge, QuestionAuthor,
};
pub use session::{SessionConfig, SessionRuntime, SessionRuntimeBuilder};
pub use types::{SessionCommand, SessionMode, SessionSnapshot};
