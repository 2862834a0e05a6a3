//! Commands and their transition implementations.
//!
//! Every phase-advancing action at the UI boundary is a command. Each command
//! is a transition struct implementing [`CommandTransition`]; the engines
//! drive them through the three-stage pipeline (`pre_validate` → `apply` →
//! `post_validate`), so every mutation of session state flows through the
//! same audited path.

pub mod match_mode;
pub mod quest_mode;

use crate::bank::{Category, HallKind, Tier};
use crate::clock::ClockTick;
use crate::config::RuleSet;
use crate::env::QuizEnv;
use crate::grading::GradeResult;
use crate::state::{InvariantViolation, MatchState, QuestState};

pub use match_mode::{
    AskQuestion, BeginNextRound, MatchCommand, MatchError, RevealDifficulty, RevealTopic,
    SpinDifficulty, SpinTopic, StartMatch,
};
pub use quest_mode::{
    AdvanceFromHallComplete, BeginChallenges, EnterFirstHall, QuestCommand, QuestError,
    StartQuest, UseHint,
};

/// Session states that can self-check their structural invariants.
pub trait StateView {
    fn check_invariants(&self, rules: &RuleSet) -> Result<(), InvariantViolation>;
}

impl StateView for MatchState {
    fn check_invariants(&self, rules: &RuleSet) -> Result<(), InvariantViolation> {
        MatchState::check_invariants(self, rules)
    }
}

impl StateView for QuestState {
    fn check_invariants(&self, rules: &RuleSet) -> Result<(), InvariantViolation> {
        QuestState::check_invariants(self, rules)
    }
}

/// A single state transition driven by the engine pipeline.
///
/// Stages:
/// 1. `pre_validate`: check phase legality and preconditions before mutation
/// 2. `apply`: mutate the session state and report what happened
/// 3. `post_validate`: verify structural invariants after mutation
pub trait CommandTransition<S: StateView> {
    type Error: From<InvariantViolation>;

    fn pre_validate(&self, state: &S, env: &QuizEnv<'_>) -> Result<(), Self::Error>;

    fn apply(&self, state: &mut S, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error>;

    fn post_validate(&self, state: &S, env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        state.check_invariants(env.rules).map_err(Into::into)
    }
}

/// Submit an answer for the live question. Blank submissions are rejected
/// here, at the boundary, and never reach the grader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitAnswer {
    pub text: String,
}

impl SubmitAnswer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Resolve the grade for the submission parked in the checking phase.
///
/// `verdict: None` grades locally by the question's own policy. `Some`
/// injects a delegated verdict, either the external judge's or the exact-match
/// fallback computed when the judge failed. A mismatched `attempt` marks a
/// verdict for a superseded question; it is discarded, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveGrade {
    pub attempt: u64,
    pub verdict: Option<GradeResult>,
}

/// One-second tick from the runtime ticker. Stale ticks (attempt mismatch or
/// no live question) are discarded without touching state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockAdvance {
    pub attempt: u64,
}

/// Leave a result screen toward whatever the resolution decided: the next
/// question cycle, round/hall completion, or straight to the terminal phase
/// when a winner was recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceFromResult;

/// Abandon the session and return to team setup. Cancels the countdown and
/// orphans any in-flight grade verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetToSetup;

/// What a successfully executed command did.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandResult {
    /// A session opened (match or quest).
    Started,
    /// The difficulty wheel settled on a tier.
    DifficultySpun(Tier),
    /// The topic wheel settled on a category.
    TopicSpun(Category),
    /// A spin outcome was revealed to the players.
    Revealed,
    /// A question went live and its countdown armed.
    QuestionAsked,
    /// A submission was accepted and is awaiting its grade.
    AnswerAccepted,
    /// A grade resolved and the result phase was entered.
    Graded(GradeResult),
    /// The countdown advanced (possibly to expiry).
    Ticked(ClockTick),
    /// A result or hall-complete screen was advanced past.
    Advanced,
    /// A new round opened.
    RoundOpened,
    /// The question pool ran dry and the round force-ended early.
    RoundExhausted,
    /// A hint was revealed.
    HintRevealed(String),
    /// The player stepped into a hall.
    HallEntered(HallKind),
    /// A hall's first or next challenge went live.
    ChallengeStarted,
    /// Every challenge in the hall resolved.
    HallFinished(HallKind),
    /// The session was discarded back to setup.
    ResetDone,
    /// The command referenced a superseded question attempt (late tick or
    /// verdict) and was discarded without touching state.
    Ignored,
}
