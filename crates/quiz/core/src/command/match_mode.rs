//! Match-mode (two-team) command transitions.
//!
//! The round loop: the operator opens a round, spins difficulty and topic,
//! and asks questions until the answering team either completes the round's
//! question count (+1 for them) or misses once (+1 for the opposition, round
//! forfeit). First side at the winning score takes the match.

use crate::bank::{Category, Question, QuestionSelector, Tier};
use crate::clock::ClockTick;
use crate::command::{
    AdvanceFromResult, ClockAdvance, CommandResult, CommandTransition, ResetToSetup, ResolveGrade,
    SubmitAnswer,
};
use crate::config::MatchRules;
use crate::env::QuizEnv;
use crate::grading::{self, GradeResult};
use crate::rng::{compute_seed, context};
use crate::state::{InvariantViolation, MatchPhase, MatchState, TeamSide};

/// Errors surfaced by match-mode transitions.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("command is not legal in phase `{phase}`")]
    PhaseMismatch { phase: &'static str },

    #[error("an answer is already being checked")]
    AnswerPending,

    #[error("submitted answer is empty")]
    EmptyAnswer,

    #[error("round context missing (no tier spun)")]
    RoundContextMissing,

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// All match-mode commands, one per legal phase-advancing action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchCommand {
    Start(StartMatch),
    SpinDifficulty(SpinDifficulty),
    RevealDifficulty(RevealDifficulty),
    SpinTopic(SpinTopic),
    RevealTopic(RevealTopic),
    Ask(AskQuestion),
    Submit(SubmitAnswer),
    Resolve(ResolveGrade),
    Tick(ClockAdvance),
    Advance(AdvanceFromResult),
    NextRound(BeginNextRound),
    Reset(ResetToSetup),
}

impl MatchCommand {
    /// Command name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            MatchCommand::Start(_) => "start-match",
            MatchCommand::SpinDifficulty(_) => "spin-difficulty",
            MatchCommand::RevealDifficulty(_) => "reveal-difficulty",
            MatchCommand::SpinTopic(_) => "spin-topic",
            MatchCommand::RevealTopic(_) => "reveal-topic",
            MatchCommand::Ask(_) => "ask-question",
            MatchCommand::Submit(_) => "submit-answer",
            MatchCommand::Resolve(_) => "resolve-grade",
            MatchCommand::Tick(_) => "clock-tick",
            MatchCommand::Advance(_) => "advance",
            MatchCommand::NextRound(_) => "begin-next-round",
            MatchCommand::Reset(_) => "reset",
        }
    }

    pub fn submit(text: impl Into<String>) -> Self {
        MatchCommand::Submit(SubmitAnswer::new(text))
    }

    pub fn resolve(attempt: u64, verdict: Option<GradeResult>) -> Self {
        MatchCommand::Resolve(ResolveGrade { attempt, verdict })
    }

    pub fn tick(attempt: u64) -> Self {
        MatchCommand::Tick(ClockAdvance { attempt })
    }
}

fn phase_mismatch(state: &MatchState) -> MatchError {
    MatchError::PhaseMismatch {
        phase: state.phase.label(),
    }
}

/// Spin the topic wheel: pick uniformly among categories that still hold an
/// unused question at the round's tier.
fn spin_open_category(state: &MatchState, env: &QuizEnv<'_>) -> Option<Category> {
    let tier = state.tier?;
    let open = env.bank.categories_with_unused(tier, &state.consumed);
    let seed = compute_seed(state.seed, state.nonce, context::TOPIC_SPIN);
    let index = env.rng.pick_index(seed, open.len())?;
    Some(open[index])
}

/// Enter the result phase for a resolved grade, applying scoring and
/// recording the winner the moment a side reaches the threshold.
fn enter_result(
    state: &mut MatchState,
    env: &QuizEnv<'_>,
    question: Question,
    grade: GradeResult,
    expired: bool,
) {
    state.clock.cancel();
    let winning_score = env.rules.match_rules.winning_score;

    if grade.is_correct {
        state.round_tally += 1;
        let round_won = state
            .tier
            .map(|tier| state.round_tally >= MatchRules::round_plan(tier).questions)
            .unwrap_or(true);
        if round_won {
            state.scores.add(state.active_team, 1);
            if state.scores.get(state.active_team) >= winning_score {
                state.winner = Some(state.active_team);
            }
        }
        state.phase = MatchPhase::ResultCorrect {
            question,
            grade,
            round_won,
        };
    } else {
        let opponent = state.active_team.opponent();
        state.scores.add(opponent, 1);
        if state.scores.get(opponent) >= winning_score {
            state.winner = Some(opponent);
        }
        state.phase = MatchPhase::ResultIncorrect {
            question,
            grade,
            expired,
        };
    }
}

/// Open the match: team setup is done and the first round awaits its spin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartMatch;

impl CommandTransition<MatchState> for StartMatch {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::TeamSetup => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.phase = MatchPhase::RoundStart;
        Ok(CommandResult::Started)
    }
}

/// Spin the difficulty wheel: tier chosen uniformly at random; the round's
/// question count and time budget derive from the difficulty table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpinDifficulty;

impl CommandTransition<MatchState> for SpinDifficulty {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::RoundStart => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let seed = compute_seed(state.seed, state.nonce, context::DIFFICULTY_SPIN);
        let index = env
            .rng
            .pick_index(seed, Tier::ALL.len())
            .unwrap_or_default();
        let tier = Tier::ALL[index];

        state.tier = Some(tier);
        state.round_tally = 0;
        state.phase = MatchPhase::SpinningDifficulty { tier };
        Ok(CommandResult::DifficultySpun(tier))
    }
}

/// Settle the difficulty wheel and show the spun tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealDifficulty;

impl CommandTransition<MatchState> for RevealDifficulty {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::SpinningDifficulty { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let tier = match &state.phase {
            MatchPhase::SpinningDifficulty { tier } => *tier,
            _ => return Err(phase_mismatch(state)),
        };
        state.phase = MatchPhase::ShowDifficulty { tier };
        Ok(CommandResult::Revealed)
    }
}

/// Spin the topic wheel among categories that still have unused questions at
/// the round's tier. An empty wheel force-ends the round early.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpinTopic;

impl CommandTransition<MatchState> for SpinTopic {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::ShowDifficulty { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        if state.tier.is_none() {
            return Err(MatchError::RoundContextMissing);
        }
        match spin_open_category(state, env) {
            Some(category) => {
                state.phase = MatchPhase::SpinningTopic { category };
                Ok(CommandResult::TopicSpun(category))
            }
            None => {
                state.clear_round();
                state.phase = MatchPhase::RoundComplete;
                Ok(CommandResult::RoundExhausted)
            }
        }
    }
}

/// Settle the topic wheel and show the spun category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealTopic;

impl CommandTransition<MatchState> for RevealTopic {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::SpinningTopic { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let category = match &state.phase {
            MatchPhase::SpinningTopic { category } => *category,
            _ => return Err(phase_mismatch(state)),
        };
        state.phase = MatchPhase::ShowTopic { category };
        Ok(CommandResult::Revealed)
    }
}

/// Draw a question for the shown topic and arm the countdown.
///
/// If the spun category ran dry since the spin, every other category at the
/// tier is tried before the round is declared exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AskQuestion;

impl CommandTransition<MatchState> for AskQuestion {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::ShowTopic { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let category = match &state.phase {
            MatchPhase::ShowTopic { category } => *category,
            _ => return Err(phase_mismatch(state)),
        };
        let tier = state.tier.ok_or(MatchError::RoundContextMissing)?;
        let plan = MatchRules::round_plan(tier);

        // Spun category first, then every other category still open at the tier
        let mut candidates = vec![category];
        candidates.extend(
            env.bank
                .categories_with_unused(tier, &state.consumed)
                .into_iter()
                .filter(|&c| c != category),
        );

        let seed = compute_seed(state.seed, state.nonce, context::QUESTION_DRAW);
        for (offset, candidate) in candidates.into_iter().enumerate() {
            if let Some(question) = QuestionSelector::draw(
                env.bank,
                tier,
                candidate,
                &state.consumed,
                env.rng,
                seed.wrapping_add(offset as u64),
            ) {
                let question = question.clone();
                state.consumed.insert(question.key());
                state.attempt += 1;
                state.clock.arm(plan.seconds);
                state.phase = MatchPhase::Question { question };
                return Ok(CommandResult::QuestionAsked);
            }
        }

        // Whole tier exhausted: force-end the round, no points either way
        state.clear_round();
        state.phase = MatchPhase::RoundComplete;
        Ok(CommandResult::RoundExhausted)
    }
}

impl CommandTransition<MatchState> for SubmitAnswer {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::Question { .. } => {
                if self.text.trim().is_empty() {
                    Err(MatchError::EmptyAnswer)
                } else {
                    Ok(())
                }
            }
            MatchPhase::Checking { .. } => Err(MatchError::AnswerPending),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        let MatchPhase::Question { question } = state.phase.clone() else {
            return Err(phase_mismatch(state));
        };
        state.clock.cancel();
        state.phase = MatchPhase::Checking {
            question,
            submitted: self.text.trim().to_owned(),
        };
        Ok(CommandResult::AnswerAccepted)
    }
}

impl CommandTransition<MatchState> for ResolveGrade {
    type Error = MatchError;

    fn pre_validate(&self, _state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        // Late verdicts are discarded in apply, never rejected as errors
        Ok(())
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        if self.attempt != state.attempt {
            return Ok(CommandResult::Ignored);
        }
        let MatchPhase::Checking { question, submitted } = state.phase.clone() else {
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

impl CommandTransition<MatchState> for ClockAdvance {
    type Error = MatchError;

    fn pre_validate(&self, _state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        // Stale ticks are discarded in apply, never rejected as errors
        Ok(())
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        if self.attempt != state.attempt {
            return Ok(CommandResult::Ignored);
        }
        let MatchPhase::Question { question } = state.phase.clone() else {
            return Ok(CommandResult::Ignored);
        };

        let tick = state.clock.tick();
        if tick == ClockTick::Expired {
            // Expiry is a first-class wrong answer
            enter_result(state, env, question, GradeResult::incorrect(), true);
        }
        Ok(CommandResult::Ticked(tick))
    }
}

impl CommandTransition<MatchState> for AdvanceFromResult {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::ResultCorrect { .. } | MatchPhase::ResultIncorrect { .. } => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        // A decided winner pre-empts the round cycle entirely
        if let Some(winner) = state.winner {
            state.clear_round();
            state.phase = MatchPhase::Victory { winner };
            return Ok(CommandResult::Advanced);
        }

        match state.phase.clone() {
            MatchPhase::ResultCorrect { round_won, .. } => {
                if round_won {
                    state.clear_round();
                    state.phase = MatchPhase::RoundComplete;
                    Ok(CommandResult::Advanced)
                } else {
                    // Same round, next question: spin a fresh topic
                    match spin_open_category(state, env) {
                        Some(category) => {
                            state.phase = MatchPhase::SpinningTopic { category };
                            Ok(CommandResult::TopicSpun(category))
                        }
                        None => {
                            state.clear_round();
                            state.phase = MatchPhase::RoundComplete;
                            Ok(CommandResult::RoundExhausted)
                        }
                    }
                }
            }
            MatchPhase::ResultIncorrect { .. } => {
                // Round forfeited: open the next one
                state.round += 1;
                state.active_team = TeamSide::for_round(state.round);
                state.clear_round();
                state.phase = MatchPhase::RoundStart;
                Ok(CommandResult::Advanced)
            }
            _ => Err(phase_mismatch(state)),
        }
    }
}

/// Open the next round after a completed one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeginNextRound;

impl CommandTransition<MatchState> for BeginNextRound {
    type Error = MatchError;

    fn pre_validate(&self, state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        match state.phase {
            MatchPhase::RoundComplete => Ok(()),
            _ => Err(phase_mismatch(state)),
        }
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.round += 1;
        state.active_team = TeamSide::for_round(state.round);
        state.clear_round();
        state.phase = MatchPhase::RoundStart;
        Ok(CommandResult::RoundOpened)
    }
}

impl CommandTransition<MatchState> for ResetToSetup {
    type Error = MatchError;

    fn pre_validate(&self, _state: &MatchState, _env: &QuizEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply(&self, state: &mut MatchState, _env: &QuizEnv<'_>) -> Result<CommandResult, Self::Error> {
        state.reset();
        Ok(CommandResult::ResetDone)
    }
}
