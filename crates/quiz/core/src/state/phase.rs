//! Phase unions for both progression engines.
//!
//! Phase payloads carry only the fields that are meaningful in that phase, so
//! there is no way to read an active question outside a question-bearing
//! phase. Views key their rendering off the variant; the kebab-case labels
//! are the stable names used in events and logs.

use crate::bank::{Category, HallKind, Question, Tier};
use crate::grading::GradeResult;
use crate::state::{TeamSide, VictoryMargin};

/// Match-mode (two-team) phase union.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "phase", rename_all = "kebab-case"))]
pub enum MatchPhase {
    /// Waiting for the operator to start a game.
    TeamSetup,
    /// A round is open; the difficulty spin is the next action.
    RoundStart,
    /// Difficulty wheel is spinning; the tier is already decided.
    SpinningDifficulty { tier: Tier },
    /// Spun tier revealed to the teams.
    ShowDifficulty { tier: Tier },
    /// Topic wheel is spinning; the category is already decided.
    SpinningTopic { category: Category },
    /// Spun category revealed.
    ShowTopic { category: Category },
    /// A question is live and the countdown is running.
    Question { question: Question },
    /// An answer was submitted and is being graded. Further submissions are
    /// rejected until the grade resolves.
    Checking { question: Question, submitted: String },
    /// The answer was correct. `round_won` marks the round's final question.
    ResultCorrect {
        question: Question,
        grade: GradeResult,
        round_won: bool,
    },
    /// The answer was wrong or the clock expired; the round is forfeit.
    ResultIncorrect {
        question: Question,
        grade: GradeResult,
        expired: bool,
    },
    /// Round finished successfully; awaiting the next-round trigger.
    RoundComplete,
    /// Terminal: a team reached the winning score.
    Victory { winner: TeamSide },
}

impl MatchPhase {
    /// Stable kebab-case label for events and logs.
    pub fn label(&self) -> &'static str {
        match self {
            MatchPhase::TeamSetup => "team-setup",
            MatchPhase::RoundStart => "round-start",
            MatchPhase::SpinningDifficulty { .. } => "spinning-difficulty",
            MatchPhase::ShowDifficulty { .. } => "show-difficulty",
            MatchPhase::SpinningTopic { .. } => "spinning-topic",
            MatchPhase::ShowTopic { .. } => "show-topic",
            MatchPhase::Question { .. } => "question",
            MatchPhase::Checking { .. } => "checking",
            MatchPhase::ResultCorrect { .. } => "result-correct",
            MatchPhase::ResultIncorrect { .. } => "result-incorrect",
            MatchPhase::RoundComplete => "round-complete",
            MatchPhase::Victory { .. } => "victory",
        }
    }

    /// The live question, present only in question-bearing phases.
    pub fn active_question(&self) -> Option<&Question> {
        match self {
            MatchPhase::Question { question }
            | MatchPhase::Checking { question, .. }
            | MatchPhase::ResultCorrect { question, .. }
            | MatchPhase::ResultIncorrect { question, .. } => Some(question),
            _ => None,
        }
    }
}

/// Quest-mode (single-team) phase union.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "phase", rename_all = "kebab-case"))]
pub enum QuestPhase {
    /// Waiting for the operator to start a quest.
    TeamSetup,
    /// Opening narration before the first hall.
    Prologue,
    /// Standing at a hall's entrance.
    HallIntro { hall: HallKind },
    /// A challenge is live and the countdown is running.
    Challenge { question: Question },
    /// An answer was submitted and is being graded (possibly by the external
    /// judge). Further submissions are rejected until the verdict lands.
    Checking { question: Question, submitted: String },
    /// The challenge resolved, correctly or not.
    Result {
        question: Question,
        grade: GradeResult,
        expired: bool,
    },
    /// All challenges in the hall are done. Halls never lock on failure.
    HallComplete { hall: HallKind },
    /// Terminal: the seeker out-scored the Keeper.
    Victory { margin: VictoryMargin },
    /// Terminal: tie or Keeper ahead.
    Defeat,
}

impl QuestPhase {
    /// Stable kebab-case label for events and logs.
    pub fn label(&self) -> &'static str {
        match self {
            QuestPhase::TeamSetup => "team-setup",
            QuestPhase::Prologue => "prologue",
            QuestPhase::HallIntro { .. } => "hall-intro",
            QuestPhase::Challenge { .. } => "challenge",
            QuestPhase::Checking { .. } => "checking",
            QuestPhase::Result { .. } => "result",
            QuestPhase::HallComplete { .. } => "hall-complete",
            QuestPhase::Victory { .. } => "victory",
            QuestPhase::Defeat => "defeat",
        }
    }

    /// The live challenge, present only in challenge-bearing phases.
    pub fn active_question(&self) -> Option<&Question> {
        match self {
            QuestPhase::Challenge { question }
            | QuestPhase::Checking { question, .. }
            | QuestPhase::Result { question, .. } => Some(question),
            _ => None,
        }
    }
}
