//! Quest-mode (single-team) command transitions.
//!
//! The quest walks a fixed ordered hall sequence. Every resolved challenge
//! scores exactly one point: the seeker's on a correct answer (plus a
//! memory-key award reduced by hints), the Keeper's on a miss or expiry.
//! Halls never lock on failure; after the last hall the final scores decide
//! victory or defeat.

use crate::clock::ClockTick;
use crate::command::{
    AdvanceFromResult, ClockAdvance, CommandResult, CommandTransition, ResetToSetup, ResolveGrade,
    SubmitAnswer,
};
use crate::env::QuizEnv;
use crate::grading::{self, GradeResult};
use crate::state::{InvariantViolation, QuestPhase, QuestState, VictoryMargin};

/// Errors surfaced by quest-mode transitions.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestError {
    #[error("command is not legal in phase `{phase}`")]
    PhaseMismatch { phase: &'static str },

    #[error("an answer is already being checked")]
    AnswerPending,

    #[error("submitted answer is empty")]
    EmptyAnswer,

    #[error("no halls configured for the quest")]
    NoHalls,

    #[error("no hints left for this challenge")]
    HintsExhausted,

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// All quest-mode commands, one per legal phase-advancing action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestCommand {
    Start(StartQuest),
    EnterFirstHall(EnterFirstHall),
    BeginChallenges(BeginChallenges),
    Submit(SubmitAnswer),
    Resolve(ResolveGrade),
    Tick(ClockAdvance),
    UseHint(UseHint),
    Advance(AdvanceFromResult),
    AdvanceHall(AdvanceFromHallComplete),
    Reset(ResetToSetup),
}

impl QuestCommand {
    /// Command name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            QuestCommand::Start(_) => "start-quest",
            QuestCommand::EnterFirstHall(_) => "enter-first-hall",
            QuestCommand::BeginChallenges(_) => "begin-challenges",
            QuestCommand::Submit(_) => "submit-answer",
            QuestCommand::Resolve(_) => "resolve-grade",
            QuestCommand::Tick(_) => "clock-tick",
            QuestCommand::UseHint(_) => "use-hint",
            QuestCommand::Advance(_) => "advance",
            QuestCommand::AdvanceHall(_) => "advance-hall",
            QuestCommand::Reset(_) => "reset",
        }
    }

    pub fn submit(text: impl Into<String>) -> Self {
        QuestCommand::Submit(SubmitAnswer::new(text))
    }

    pub fn resolve(attempt: u64, verdict: Option<GradeResult>) -> Self {
        QuestCommand::Resolve(ResolveGrade { attempt, verdict })
    }

    pub fn tick(attempt: u64) -> Self {
        QuestCommand::Tick(ClockAdvance { attempt })
    }
}

fn phase_mismatch(state: &QuestState) -> QuestError {
    QuestError::PhaseMismatch {
        phase: state.phase.label(),
    }
}

/// Arm the next challenge at `state.challenge_index`, or report the hall
/// finished when the list is exhausted.
fn arm_challenge(state: &mut QuestState, env: &QuizEnv<'_>) -> CommandResult {
    let hall = env.halls[state.hall_index].kind;
    match state.current_hall_challenges().get(state.challenge_index) {
        Some(question) => {
            let question = question.clone();
            state.hints_used = 0;
            state.attempt += 1;
            state.clock.arm(env.rules.quest_rules.challenge_seconds);
            state.phase = QuestPhase::Challenge { question };
            CommandResult::ChallengeStarted
        }
        None => {
            state.clock.cancel();
            state.phase = QuestPhase::HallComplete { hall };
            CommandResult::HallFinished(hall)
        }
    }
}

/// Enter the result phase for a resolved challenge, applying the two-sided
/// scoring: the seeker earns the point and a memory-key award on a correct
/// answer, the Keeper earns it otherwise.
fn enter_result(
    state: &mut QuestState,
    env: &QuizEnv<'_>,
    question: crate::bank::Question,
    grade: GradeResult,
    expired: bool,
) {
    state.clock.cancel();
    if grade.is_correct {
        state.seeker_score += 1;
        state.memory_keys += env.rules.quest_rules.memory_key_award(state.hints_used);
    } else {
        state.keeper_score += 1;
    }
    state.phase = QuestPhase::Result {
        question,
        grade,
        expired,
    };
}

/// Open the quest: build every hall's challenge list (with its cap applied)
/// and roll the opening narration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartQuest;

impl CommandTransition<QuestState> for StartQuest {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        if env.halls.is_empty() {
            return Err(QuestError::NoHalls);
        }
        match state.phase {
            QuestPhase::TeamSetup => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.challenges = env
            .halls
            .iter()
            .map(|hall| env.bank.hall_questions(hall.kind, hall.question_cap))
            .collect();
        state.phase = QuestPhase::Prologue;
        Ok(CommandResult::Started)
    }
}

/// Step from the prologue into the first hall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnterFirstHall;

impl CommandTransition<QuestState> for EnterFirstHall {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        if env.halls.is_empty() {
            return Err(QuestError::NoHalls);
        }
        match state.phase {
            QuestPhase::Prologue => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.hall_index = 0;
        state.challenge_index = 0;
        let hall = env.halls[0].kind;
        state.phase = QuestPhase::HallIntro { hall };
        Ok(CommandResult::HallEntered(hall))
    }
}

/// Leave the hall intro and arm the hall's first challenge. An empty
/// challenge list degrades straight to hall completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeginChallenges;

impl CommandTransition<QuestState> for BeginChallenges {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            QuestPhase::HallIntro { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.challenge_index = 0;
        Ok(arm_challenge(state, env))
    }
}

impl CommandTransition<QuestState> for SubmitAnswer {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            QuestPhase::Challenge { .. } => {
                if self.text.trim().is_empty() {
                    Err(QuestError::EmptyAnswer)
                } else {
                    Ok(())
                }
            }
            QuestPhase::Checking { .. } => Err(QuestError::AnswerPending),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let QuestPhase::Challenge { question } = state.phase.clone() else {
            return Err(phase_mismatch(state));
        };
        state.clock.cancel();
        state.phase = QuestPhase::Checking {
            question,
            submitted: self.text.trim().to_owned(),
        };
        Ok(CommandResult::AnswerAccepted)
    }
}

impl CommandTransition<QuestState> for ResolveGrade {
    type Error = QuestError;

    fn pre_validate(&self, _state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        // Late verdicts are discarded in apply, never rejected as errors
        Ok(())
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        if self.attempt != state.attempt {
            return Ok(CommandResult::Ignored);
        }
        let QuestPhase::Checking { question, submitted } = state.phase.clone() else {
            return Ok(CommandResult::Ignored);
        };

        let grade = self
            .verdict
            .clone()
            .unwrap_or_else(|| grading::grade(&question, &submitted));
        enter_result(state, env, question, grade.clone(), false);
        Ok(CommandResult::Graded(grade))
    }
}

impl CommandTransition<QuestState> for ClockAdvance {
    type Error = QuestError;

    fn pre_validate(&self, _state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        // Stale ticks are discarded in apply, never rejected as errors
        Ok(())
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        if self.attempt != state.attempt {
            return Ok(CommandResult::Ignored);
        }
        let QuestPhase::Challenge { question } = state.phase.clone() else {
            return Ok(CommandResult::Ignored);
        };

        let tick = state.clock.tick();
        if tick == ClockTick::Expired {
            // Expiry awards the Keeper, exactly like a wrong answer. The hall
            // stays open regardless.
            enter_result(state, env, question, GradeResult::incorrect(), true);
        }
        Ok(CommandResult::Ticked(tick))
    }
}

/// Reveal the next hint for the live challenge. Each reveal reduces the
/// memory-key award for a later correct answer, floored at one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UseHint;

impl CommandTransition<QuestState> for UseHint {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match &state.phase {
            QuestPhase::Challenge { question } => {
                if (state.hints_used as usize) < question.hints.len() {
                    Ok(())
                } else {
                    Err(QuestError::HintsExhausted)
                }
            }
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let hint = match &state.phase {
            QuestPhase::Challenge { question } => question
                .hints
                .get(state.hints_used as usize)
                .cloned()
                .ok_or(QuestError::HintsExhausted)?,
            _ => return Err(phase_mismatch(state)),
        };
        state.hints_used += 1;
        Ok(CommandResult::HintRevealed(hint))
    }
}

impl CommandTransition<QuestState> for AdvanceFromResult {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            QuestPhase::Result { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        // More challenges in this hall continue directly, no re-intro
        state.challenge_index += 1;
        Ok(arm_challenge(state, env))
    }
}

/// Leave a finished hall: on to the next hall's intro, or the terminal
/// score comparison after the last one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceFromHallComplete;

impl CommandTransition<QuestState> for AdvanceFromHallComplete {
    type Error = QuestError;

    fn pre_validate(&self, state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            QuestPhase::HallComplete { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut QuestState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let next = state.hall_index + 1;
        if next < env.halls.len() {
            state.hall_index = next;
            state.challenge_index = 0;
            let hall = env.halls[next].kind;
            state.phase = QuestPhase::HallIntro { hall };
            Ok(CommandResult::HallEntered(hall))
        } else if state.seeker_score > state.keeper_score {
            let margin = VictoryMargin::from_lead(state.seeker_score - state.keeper_score);
            state.phase = QuestPhase::Victory { margin };
            Ok(CommandResult::Advanced)
        } else {
            // Tie goes to the Keeper
            state.phase = QuestPhase::Defeat;
            Ok(CommandResult::Advanced)
        }
    }
}

impl CommandTransition<QuestState> for ResetToSetup {
    type Error = QuestError;

    fn pre_validate(&self, _state: &QuestState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply(&self, state: &mut QuestState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.reset();
        Ok(CommandResult::ResetDone)
    }
}
