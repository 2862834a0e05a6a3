//! Progression engines: the authoritative reducers for session state.
//!
//! A [`MatchEngine`] or [`QuestEngine`] is the only writer of its state. All
//! mutations, including clock ticks and grade resolutions fed back by the
//! runtime, flow through the same `execute()` pipeline, so every state change
//! is validated the same way and observers always see coherent snapshots.

mod errors;
mod transition;

pub use errors::{ExecuteError, TransitionStage, TransitionStageError};

use crate::command::{CommandResult, MatchCommand, QuestCommand};
use crate::env::QuizEnv;
use crate::state::{MatchState, QuestState};

/// Reducer for a two-team match session.
pub struct MatchEngine<'a> {
    state: &'a mut MatchState,
}

impl<'a> MatchEngine<'a> {
    pub fn new(state: &'a mut MatchState) -> Self {
        Self { state }
    }

    /// Executes a command through the three-stage transition pipeline.
    ///
    /// On success the command nonce increments so later random draws stay
    /// decorrelated. On failure the state is untouched and the error names
    /// the command and the stage that rejected it.
    pub fn execute(
        &mut self,
        env: QuizEnv<'_>,
        command: &MatchCommand,
    ) -> Result<CommandResult, ExecuteError> {
        let result = transition::execute_match(command, self.state, &env)?;
        self.state.nonce += 1;
        Ok(result)
    }

    pub fn state(&self) -> &MatchState {
        self.state
    }
}

/// Reducer for a single-team quest session.
pub struct QuestEngine<'a> {
    state: &'a mut QuestState,
}

impl<'a> QuestEngine<'a> {
    pub fn new(state: &'a mut QuestState) -> Self {
        Self { state }
    }

    /// Executes a command through the three-stage transition pipeline.
    pub fn execute(
        &mut self,
        env: QuizEnv<'_>,
        command: &QuestCommand,
    ) -> Result<CommandResult, ExecuteError> {
        let result = transition::execute_quest(command, self.state, &env)?;
        self.state.nonce += 1;
        Ok(result)
    }

    pub fn state(&self) -> &QuestState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{
        Category, Hall, HallGrading, HallKind, MatchPolicy, Question, QuestionBank, Tier,
    };
    use crate::clock::ClockTick;
    use crate::command::{
        AdvanceFromHallComplete, AdvanceFromResult, BeginChallenges, BeginNextRound,
        EnterFirstHall, MatchError, QuestError, ResetToSetup, StartMatch, StartQuest,
        SpinDifficulty, RevealDifficulty, SpinTopic, RevealTopic, AskQuestion, UseHint,
    };
    use crate::config::RuleSet;
    use crate::grading::GradeResult;
    use crate::rng::RngOracle;
    use crate::state::{MatchPhase, QuestPhase, TeamSide, VictoryMargin};

    /// Deterministic oracle: every draw picks index `value % len`.
    struct StubRng(u32);

    impl RngOracle for StubRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn question(prompt: &str, answer: &str, tier: Tier, category: Category) -> Question {
        Question {
            prompt: prompt.to_owned(),
            answer: answer.to_owned(),
            policy: MatchPolicy::Exact,
            keywords: vec![],
            tier,
            category,
            hall: None,
            reference: None,
            hints: vec![],
        }
    }

    fn match_bank() -> QuestionBank {
        QuestionBank::new(vec![
            question("np1", "a1", Tier::Novice, Category::People),
            question("np2", "a2", Tier::Novice, Category::People),
            question("np3", "a3", Tier::Novice, Category::People),
            question("np4", "a4", Tier::Novice, Category::People),
            question("nv1", "b1", Tier::Novice, Category::Verses),
        ])
    }

    fn quest_halls() -> Vec<Hall> {
        vec![
            Hall {
                kind: HallKind::Beginnings,
                name: "Hall of Beginnings".to_owned(),
                intro: "First hall".to_owned(),
                grading: HallGrading::Exact,
                question_cap: 2,
            },
            Hall {
                kind: HallKind::Prophets,
                name: "Hall of Prophets".to_owned(),
                intro: "Second hall".to_owned(),
                grading: HallGrading::Fuzzy,
                question_cap: 2,
            },
        ]
    }

    fn quest_bank() -> QuestionBank {
        let mut questions = Vec::new();
        for (i, kind) in [(0, HallKind::Beginnings), (1, HallKind::Prophets)] {
            for j in 0..2 {
                let mut q = question(
                    &format!("hall{i}-q{j}"),
                    &format!("ans{i}{j}"),
                    Tier::Novice,
                    Category::Events,
                );
                q.hall = Some(kind);
                q.hints = vec!["hint one".to_owned(), "hint two".to_owned()];
                questions.push(q);
            }
        }
        QuestionBank::new(questions)
    }

    /// Drive a match session to the point where a question is live, assuming
    /// StubRng(0) so the spin lands on Novice/People.
    fn open_question(
        engine: &mut MatchEngine<'_>,
        bank: &QuestionBank,
        rules: &RuleSet,
        rng: &dyn RngOracle,
    ) {
        let env = QuizEnv::new(bank, &[], rules, rng);
        engine
            .execute(env, &MatchCommand::SpinDifficulty(SpinDifficulty))
            .unwrap();
        engine
            .execute(env, &MatchCommand::RevealDifficulty(RevealDifficulty))
            .unwrap();
        engine
            .execute(env, &MatchCommand::SpinTopic(SpinTopic))
            .unwrap();
        engine
            .execute(env, &MatchCommand::RevealTopic(RevealTopic))
            .unwrap();
        engine
            .execute(env, &MatchCommand::Ask(AskQuestion))
            .unwrap();
    }

    fn live_answer(state: &MatchState) -> String {
        match &state.phase {
            MatchPhase::Question { question } => question.answer.clone(),
            other => panic!("expected a live question, got {}", other.label()),
        }
    }

    #[test]
    fn novice_round_of_three_correct_answers_completes_and_scores_once() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();

        for i in 0..3 {
            if i == 0 {
                open_question(&mut engine, &bank, &rules, &rng);
            } else {
                // Mid-round continuation re-spins the topic directly
                engine
                    .execute(env, &MatchCommand::RevealTopic(RevealTopic))
                    .unwrap();
                engine
                    .execute(env, &MatchCommand::Ask(AskQuestion))
                    .unwrap();
            }
            assert_eq!(engine.state().phase.label(), "question");
            assert_eq!(engine.state().clock.remaining(), Some(15));

            let answer = live_answer(engine.state());
            engine.execute(env, &MatchCommand::submit(answer)).unwrap();
            assert_eq!(engine.state().phase.label(), "checking");

            let attempt = engine.state().attempt;
            engine
                .execute(env, &MatchCommand::resolve(attempt, None))
                .unwrap();
            assert_eq!(engine.state().phase.label(), "result-correct");

            engine
                .execute(env, &MatchCommand::Advance(AdvanceFromResult))
                .unwrap();
        }

        // Three correct answers: round complete, exactly one point
        assert_eq!(engine.state().phase, MatchPhase::RoundComplete);
        assert_eq!(engine.state().scores.home, 1);
        assert_eq!(engine.state().scores.away, 0);
    }

    #[test]
    fn single_wrong_answer_forfeits_round_and_scores_opponent_once() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);

        // Two correct answers first: the streak does not survive the miss
        for _ in 0..2 {
            let answer = live_answer(engine.state());
            engine.execute(env, &MatchCommand::submit(answer)).unwrap();
            let attempt = engine.state().attempt;
            engine
                .execute(env, &MatchCommand::resolve(attempt, None))
                .unwrap();
            engine
                .execute(env, &MatchCommand::Advance(AdvanceFromResult))
                .unwrap();
            engine
                .execute(env, &MatchCommand::RevealTopic(RevealTopic))
                .unwrap();
            engine
                .execute(env, &MatchCommand::Ask(AskQuestion))
                .unwrap();
        }

        engine
            .execute(env, &MatchCommand::submit("definitely wrong"))
            .unwrap();
        let attempt = engine.state().attempt;
        engine
            .execute(env, &MatchCommand::resolve(attempt, None))
            .unwrap();
        assert_eq!(engine.state().phase.label(), "result-incorrect");
        assert_eq!(engine.state().scores.away, 1);
        assert_eq!(engine.state().scores.home, 0);

        engine
            .execute(env, &MatchCommand::Advance(AdvanceFromResult))
            .unwrap();
        assert_eq!(engine.state().phase, MatchPhase::RoundStart);
        assert_eq!(engine.state().round, 1);
        assert_eq!(engine.state().active_team, TeamSide::Away);
    }

    #[test]
    fn clock_expiry_resolves_to_result_incorrect_without_user_action() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);
        let attempt = engine.state().attempt;

        // Novice budget is 15 seconds
        for _ in 0..14 {
            let result = engine.execute(env, &MatchCommand::tick(attempt)).unwrap();
            assert!(matches!(result, CommandResult::Ticked(ClockTick::Running(_))));
        }
        let result = engine.execute(env, &MatchCommand::tick(attempt)).unwrap();
        assert_eq!(result, CommandResult::Ticked(ClockTick::Expired));

        match &engine.state().phase {
            MatchPhase::ResultIncorrect { expired, .. } => assert!(expired),
            other => panic!("expected result-incorrect, got {}", other.label()),
        }
        assert_eq!(engine.state().scores.away, 1);
    }

    #[test]
    fn reaching_winning_score_advances_directly_to_victory() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        state.scores.away = 9;
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);

        engine
            .execute(env, &MatchCommand::submit("wrong"))
            .unwrap();
        let attempt = engine.state().attempt;
        engine
            .execute(env, &MatchCommand::resolve(attempt, None))
            .unwrap();
        assert_eq!(engine.state().winner, Some(TeamSide::Away));

        // Advance pre-empts round-start and lands on victory
        engine
            .execute(env, &MatchCommand::Advance(AdvanceFromResult))
            .unwrap();
        assert_eq!(
            engine.state().phase,
            MatchPhase::Victory {
                winner: TeamSide::Away
            }
        );
    }

    #[test]
    fn blank_submission_is_rejected_before_grading() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);

        let error = engine
            .execute(env, &MatchCommand::submit("   "))
            .unwrap_err();
        match error {
            ExecuteError::Match { source, .. } => {
                assert_eq!(source.stage, TransitionStage::PreValidate);
                assert_eq!(source.error, MatchError::EmptyAnswer);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Still on the live question, clock untouched
        assert_eq!(engine.state().phase.label(), "question");
        assert!(engine.state().clock.is_armed());
    }

    #[test]
    fn duplicate_submission_is_blocked_while_checking() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);
        engine
            .execute(env, &MatchCommand::submit("first"))
            .unwrap();

        let error = engine
            .execute(env, &MatchCommand::submit("second"))
            .unwrap_err();
        match error {
            ExecuteError::Match { source, .. } => {
                assert_eq!(source.error, MatchError::AnswerPending);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stale_ticks_and_verdicts_are_discarded() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::Start(StartMatch))
            .unwrap();
        open_question(&mut engine, &bank, &rules, &rng);
        let attempt = engine.state().attempt;

        // A tick for a previous attempt is a no-op
        let result = engine
            .execute(env, &MatchCommand::tick(attempt - 1))
            .unwrap();
        assert_eq!(result, CommandResult::Ignored);
        assert_eq!(engine.state().clock.remaining(), Some(15));

        // A verdict that lands after a reset is discarded too
        engine
            .execute(env, &MatchCommand::submit("something"))
            .unwrap();
        engine
            .execute(env, &MatchCommand::Reset(ResetToSetup))
            .unwrap();
        let result = engine
            .execute(
                env,
                &MatchCommand::resolve(attempt, Some(GradeResult::correct())),
            )
            .unwrap();
        assert_eq!(result, CommandResult::Ignored);
        assert_eq!(engine.state().phase, MatchPhase::TeamSetup);
        assert_eq!(engine.state().scores.home, 0);
    }

    #[test]
    fn begin_next_round_reopens_after_round_complete() {
        let bank = match_bank();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = MatchState::new(7);
        state.phase = MatchPhase::RoundComplete;
        let mut engine = MatchEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &[], &rules, &rng);

        engine
            .execute(env, &MatchCommand::NextRound(BeginNextRound))
            .unwrap();
        assert_eq!(engine.state().phase, MatchPhase::RoundStart);
        assert_eq!(engine.state().round, 1);
        assert_eq!(engine.state().tier, None);
    }

    #[test]
    fn quest_run_conserves_graded_challenge_count() {
        let bank = quest_bank();
        let halls = quest_halls();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = QuestState::new(11);
        let mut engine = QuestEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &halls, &rules, &rng);

        engine
            .execute(env, &QuestCommand::Start(StartQuest))
            .unwrap();
        assert_eq!(engine.state().phase, QuestPhase::Prologue);
        engine
            .execute(env, &QuestCommand::EnterFirstHall(EnterFirstHall))
            .unwrap();

        let mut graded = 0u32;
        for hall in 0..2 {
            engine
                .execute(env, &QuestCommand::BeginChallenges(BeginChallenges))
                .unwrap();
            for challenge in 0..2 {
                let answer = match &engine.state().phase {
                    QuestPhase::Challenge { question } => question.answer.clone(),
                    other => panic!("expected challenge, got {}", other.label()),
                };
                // Miss the first challenge of each hall, answer the second
                if challenge == 0 {
                    engine
                        .execute(env, &QuestCommand::submit("wrong guess"))
                        .unwrap();
                } else {
                    engine.execute(env, &QuestCommand::submit(answer)).unwrap();
                }
                let attempt = engine.state().attempt;
                engine
                    .execute(env, &QuestCommand::resolve(attempt, None))
                    .unwrap();
                graded += 1;
                engine
                    .execute(env, &QuestCommand::Advance(AdvanceFromResult))
                    .unwrap();
            }
            assert_eq!(
                engine.state().phase,
                QuestPhase::HallComplete {
                    hall: halls[hall].kind
                }
            );
            engine
                .execute(env, &QuestCommand::AdvanceHall(AdvanceFromHallComplete))
                .unwrap();
        }

        // Two misses, two hits: the tally always equals graded challenges
        assert_eq!(
            engine.state().seeker_score + engine.state().keeper_score,
            graded
        );
        // Tie goes to the Keeper
        assert_eq!(engine.state().phase, QuestPhase::Defeat);
    }

    #[test]
    fn quest_victory_margin_reflects_lead() {
        let bank = quest_bank();
        let halls = quest_halls();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = QuestState::new(11);
        state.seeker_score = 4;
        state.keeper_score = 1;
        state.hall_index = halls.len() - 1;
        state.phase = QuestPhase::HallComplete {
            hall: halls[1].kind,
        };
        let mut engine = QuestEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &halls, &rules, &rng);

        engine
            .execute(env, &QuestCommand::AdvanceHall(AdvanceFromHallComplete))
            .unwrap();
        assert_eq!(
            engine.state().phase,
            QuestPhase::Victory {
                margin: VictoryMargin::Clear
            }
        );
    }

    #[test]
    fn hints_reduce_memory_keys_with_floor_of_one() {
        let bank = quest_bank();
        let halls = quest_halls();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = QuestState::new(11);
        let mut engine = QuestEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &halls, &rules, &rng);

        engine
            .execute(env, &QuestCommand::Start(StartQuest))
            .unwrap();
        engine
            .execute(env, &QuestCommand::EnterFirstHall(EnterFirstHall))
            .unwrap();
        engine
            .execute(env, &QuestCommand::BeginChallenges(BeginChallenges))
            .unwrap();

        // Burn both hints: award drops from 3 to the floor of 1, never zero
        for expected in ["hint one", "hint two"] {
            let result = engine.execute(env, &QuestCommand::UseHint(UseHint)).unwrap();
            assert_eq!(result, CommandResult::HintRevealed(expected.to_owned()));
        }
        let error = engine
            .execute(env, &QuestCommand::UseHint(UseHint))
            .unwrap_err();
        match error {
            ExecuteError::Quest { source, .. } => {
                assert_eq!(source.error, QuestError::HintsExhausted);
            }
            other => panic!("unexpected error: {other}"),
        }

        let answer = match &engine.state().phase {
            QuestPhase::Challenge { question } => question.answer.clone(),
            other => panic!("expected challenge, got {}", other.label()),
        };
        engine.execute(env, &QuestCommand::submit(answer)).unwrap();
        let attempt = engine.state().attempt;
        engine
            .execute(env, &QuestCommand::resolve(attempt, None))
            .unwrap();
        assert_eq!(engine.state().memory_keys, 1);
        assert_eq!(engine.state().seeker_score, 1);
    }

    #[test]
    fn quest_expiry_scores_keeper_and_keeps_hall_open() {
        let bank = quest_bank();
        let halls = quest_halls();
        let rules = RuleSet::default();
        let rng = StubRng(0);
        let mut state = QuestState::new(11);
        let mut engine = QuestEngine::new(&mut state);
        let env = QuizEnv::new(&bank, &halls, &rules, &rng);

        engine
            .execute(env, &QuestCommand::Start(StartQuest))
            .unwrap();
        engine
            .execute(env, &QuestCommand::EnterFirstHall(EnterFirstHall))
            .unwrap();
        engine
            .execute(env, &QuestCommand::BeginChallenges(BeginChallenges))
            .unwrap();
        let attempt = engine.state().attempt;

        for _ in 0..rules.quest_rules.challenge_seconds {
            engine.execute(env, &QuestCommand::tick(attempt)).unwrap();
        }
        match &engine.state().phase {
            QuestPhase::Result { expired, .. } => assert!(expired),
            other => panic!("expected result, got {}", other.label()),
        }
        assert_eq!(engine.state().keeper_score, 1);

        // The hall stays open: the next challenge arms normally
        engine
            .execute(env, &QuestCommand::Advance(AdvanceFromResult))
            .unwrap();
        assert_eq!(engine.state().phase.label(), "challenge");
    }
}
