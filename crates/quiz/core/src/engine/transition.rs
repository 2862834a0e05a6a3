//! Command transition dispatch and pipeline driver.

use crate::command::{
    CommandResult, CommandTransition, MatchCommand, QuestCommand, StateView,
};
use crate::env::QuizEnv;
use crate::state::{MatchState, QuestState};

use super::errors::{ExecuteError, TransitionStage, TransitionStageError};

/// Executes a transition through the three-stage pipeline.
///
/// Stages:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the session state and return the result
/// 3. `post_validate` - Verify structural invariants after mutation
#[inline]
fn drive_transition<S, T>(
    transition: &T,
    state: &mut S,
    env: &QuizEnv<'_>,
) -> Result<CommandResult, TransitionStageError<T::Error>>
where
    S: StateView,
    T: CommandTransition<S>,
{
    transition
        .pre_validate(state, env)
        .map_err(|error| TransitionStageError::new(TransitionStage::PreValidate, error))?;

    let result = transition
        .apply(state, env)
        .map_err(|error| TransitionStageError::new(TransitionStage::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionStageError::new(TransitionStage::PostValidate, error))?;

    Ok(result)
}

/// Routes a match-mode command to its transition.
pub(super) fn execute_match(
    command: &MatchCommand,
    state: &mut MatchState,
    env: &QuizEnv<'_>,
) -> Result<CommandResult, ExecuteError> {
    let name = command.name();
    let wrap = |source| ExecuteError::Match {
        command: name,
        source,
    };

    match command {
        MatchCommand::Start(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::SpinDifficulty(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::RevealDifficulty(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::SpinTopic(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::RevealTopic(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Ask(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Submit(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Resolve(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Tick(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Advance(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::NextRound(t) => drive_transition(t, state, env).map_err(wrap),
        MatchCommand::Reset(t) => drive_transition(t, state, env).map_err(wrap),
    }
}

/// Routes a quest-mode command to its transition.
pub(super) fn execute_quest(
    command: &QuestCommand,
    state: &mut QuestState,
    env: &QuizEnv<'_>,
) -> Result<CommandResult, ExecuteError> {
    let name = command.name();
    let wrap = |source| ExecuteError::Quest {
        command: name,
        source,
    };

    match command {
        QuestCommand::Start(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::EnterFirstHall(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::BeginChallenges(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::Submit(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::Resolve(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::Tick(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::UseHint(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::Advance(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::AdvanceHall(t) => drive_transition(t, state, env).map_err(wrap),
        QuestCommand::Reset(t) => drive_transition(t, state, env).map_err(wrap),
    }
}
