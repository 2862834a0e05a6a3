//! High-level session orchestrator.
//!
//! The runtime owns the background session worker, wires up command/event
//! channels, and exposes a builder-based API for clients to drive a game.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use quiz_core::{Hall, MatchState, QuestState, QuestionBank, RuleSet};

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::events::{Event, EventBus, Topic};
use crate::providers::{AnswerJudge, QuestionAuthor};
use crate::types::SessionMode;
use crate::workers::{ModeState, SessionWorker};

/// Session configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Budget for one judge round-trip before the exact-match fallback kicks in.
    pub judge_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            judge_timeout: Duration::from_secs(8),
        }
    }
}

/// Main runtime that hosts one game session
///
/// Design: the runtime owns the worker; [`SessionHandle`] provides a
/// cloneable façade for clients.
pub struct SessionRuntime {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
}

impl SessionRuntime {
    /// Create a new session builder for the given mode
    pub fn builder(mode: SessionMode) -> SessionRuntimeBuilder {
        SessionRuntimeBuilder::new(mode)
    }

    /// Get a cloneable handle to this session
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the session gracefully
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`SessionRuntime`] with flexible configuration.
///
/// Content defaults to the standard embedded bank, halls, and rules; the
/// session seed defaults to fresh entropy so every game spins differently.
pub struct SessionRuntimeBuilder {
    mode: SessionMode,
    config: SessionConfig,
    seed: Option<u64>,
    bank: Option<Arc<QuestionBank>>,
    halls: Option<Arc<Vec<Hall>>>,
    rules: Option<Arc<RuleSet>>,
    judge: Option<Arc<dyn AnswerJudge>>,
    author: Option<Arc<dyn QuestionAuthor>>,
}

impl SessionRuntimeBuilder {
    fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            config: SessionConfig::default(),
            seed: None,
            bank: None,
            halls: None,
            rules: None,
            judge: None,
            author: None,
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the session seed for reproducible spins and draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = Some(Arc::new(bank));
        self
    }

    pub fn with_halls(mut self, halls: Vec<Hall>) -> Self {
        self.halls = Some(Arc::new(halls));
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    /// Plug in the delegated answer judge used by fuzzy halls.
    pub fn with_judge(mut self, judge: impl AnswerJudge + 'static) -> Self {
        self.judge = Some(Arc::new(judge));
        self
    }

    /// Plug in the content-authoring collaborator.
    pub fn with_author(mut self, author: impl QuestionAuthor + 'static) -> Self {
        self.author = Some(Arc::new(author));
        self
    }

    /// Spawn the session worker and return the running runtime.
    pub fn build(self) -> SessionRuntime {
        let bank = self
            .bank
            .unwrap_or_else(|| Arc::new(quiz_content::standard_bank().clone()));
        let halls = self
            .halls
            .unwrap_or_else(|| Arc::new(quiz_content::standard_halls().to_vec()));
        let rules = self
            .rules
            .unwrap_or_else(|| Arc::new(quiz_content::standard_rules().clone()));
        let seed = self.seed.unwrap_or_else(rand::random);

        let mode_state = match self.mode {
            SessionMode::Match => ModeState::Match(MatchState::new(seed)),
            SessionMode::Quest => ModeState::Quest(QuestState::new(seed)),
        };

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let worker = SessionWorker::new(
            mode_state,
            bank,
            halls,
            rules,
            self.judge,
            self.author,
            self.config.judge_timeout,
            command_rx,
            event_bus.clone(),
        );
        let worker_handle = tokio::spawn(worker.run());

        SessionRuntime {
            handle: SessionHandle::new(self.mode, command_tx, event_bus),
            worker_handle,
        }
    }
}
