//! Event types for different topics.

use serde::{Deserialize, Serialize};

use quiz_core::{TeamSide, VictoryMargin};

/// Events describing session progression: phases entered, grades resolved,
/// scores, and terminal outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session entered a new phase.
    PhaseEntered { phase: String },

    /// A submission resolved to a verdict.
    AnswerGraded {
        is_correct: bool,
        feedback: Option<String>,
    },

    /// Match-mode scoreboard after a change.
    MatchScore { home: u32, away: u32 },

    /// Quest-mode tallies after a change.
    QuestScore {
        seeker: u32,
        keeper: u32,
        memory_keys: u32,
    },

    /// A team reached the winning score.
    MatchDecided { winner: TeamSide },

    /// The quest ended after the final hall.
    QuestDecided {
        victory: bool,
        margin: Option<VictoryMargin>,
    },

    /// The session was discarded back to setup.
    SessionReset,
}

/// Events from the countdown clock of the live question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ClockEvent {
    /// One second elapsed; this many remain.
    Tick { remaining: u32 },
    /// The countdown ran out.
    Expired,
}

/// Events from the content-authoring collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthoringEvent {
    /// The author produced this many new questions.
    Composed { count: usize },
    /// Authoring failed; surfaced to the operator, never to gameplay.
    Failed { error: String },
}
