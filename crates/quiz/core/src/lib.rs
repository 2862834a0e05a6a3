//! Deterministic trivia-game rules shared across embedders.
//!
//! `quiz-core` defines the canonical progression rules for both game modes:
//! the two-team match (spun difficulty and topic, timed questions, race to
//! the winning score) and the single-team quest through themed halls against
//! the Keeper. All state mutation flows through [`engine::MatchEngine`] and
//! [`engine::QuestEngine`]; the runtime layer schedules effects (the ticker,
//! delegated grading) by observing the snapshots these engines produce.
pub mod bank;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod grading;
pub mod rng;
pub mod state;

pub use bank::{
    Category, ConsumedSet, Hall, HallGrading, HallKind, MatchPolicy, Question, QuestionBank,
    QuestionKey, QuestionSelector, Tier,
};
pub use clock::{ClockTick, GameClock};
pub use command::{CommandResult, MatchCommand, MatchError, QuestCommand, QuestError};
pub use config::{MatchRules, QuestRules, RoundPlan, RuleSet};
pub use engine::{ExecuteError, MatchEngine, QuestEngine, TransitionStage, TransitionStageError};
pub use env::QuizEnv;
pub use grading::{GradeResult, grade, grade_exact, grade_fuzzy, normalize};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use state::{
    InvariantViolation, MatchPhase, MatchState, QuestPhase, QuestState, Scoreboard, TeamSide,
    VictoryMargin,
};
