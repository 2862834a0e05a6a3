//! Content-authoring collaborator.
//!
//! Generates whole new question records outside of play. Unlike the judge,
//! its failures are surfaced to the operator, since a failed batch is a visible
//! authoring problem, not something to silently degrade. They never
//! touch an in-progress session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quiz_core::{Category, Question, Tier};

/// Request for a batch of new questions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthoringRequest {
    pub category: Category,
    pub tier: Tier,
    pub count: usize,
}

/// Authoring failures, surfaced through the runtime API.
#[derive(Debug, thiserror::Error)]
pub enum AuthorError {
    #[error("author transport failed: {0}")]
    Transport(String),

    #[error("author returned malformed questions: {0}")]
    Malformed(String),
}

/// Async collaborator producing new question records.
#[async_trait]
pub trait QuestionAuthor: Send + Sync {
    async fn compose(&self, request: &AuthoringRequest) -> Result<Vec<Question>, AuthorError>;
}
