//! Rule configuration constants and tunable parameters.

use crate::bank::Tier;

/// Shape of one match-mode round, derived from the spun difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundPlan {
    /// Correct answers required to complete the round.
    pub questions: u32,
    /// Countdown budget per question, in seconds.
    pub seconds: u32,
}

/// Match-mode (two-team) rule set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRules {
    /// Score at which a team wins outright.
    pub winning_score: u32,
}

impl MatchRules {
    pub const DEFAULT_WINNING_SCORE: u32 = 10;

    pub fn new() -> Self {
        Self {
            winning_score: Self::DEFAULT_WINNING_SCORE,
        }
    }

    /// Fixed difficulty table mapping each tier to its round length and per-question budget.
    pub const fn round_plan(tier: Tier) -> RoundPlan {
        match tier {
            Tier::Novice => RoundPlan {
                questions: 3,
                seconds: 15,
            },
            Tier::Scholar => RoundPlan {
                questions: 4,
                seconds: 20,
            },
            Tier::Sage => RoundPlan {
                questions: 5,
                seconds: 25,
            },
        }
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Quest-mode (single-team) rule set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestRules {
    /// Fixed countdown budget per challenge, in seconds.
    pub challenge_seconds: u32,
    /// Memory keys awarded for a correct answer before hint deductions.
    /// The award never drops below one.
    pub memory_key_base: u32,
}

impl QuestRules {
    pub const DEFAULT_CHALLENGE_SECONDS: u32 = 30;
    pub const DEFAULT_MEMORY_KEY_BASE: u32 = 3;

    pub fn new() -> Self {
        Self {
            challenge_seconds: Self::DEFAULT_CHALLENGE_SECONDS,
            memory_key_base: Self::DEFAULT_MEMORY_KEY_BASE,
        }
    }

    /// Memory keys for a correct answer after `hints_used` reveals.
    pub fn memory_key_award(&self, hints_used: u32) -> u32 {
        self.memory_key_base.saturating_sub(hints_used).max(1)
    }
}

impl Default for QuestRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined rule set handed to the engines through the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSet {
    #[cfg_attr(feature = "serde", serde(default))]
    pub match_rules: MatchRules,
    #[cfg_attr(feature = "serde", serde(default))]
    pub quest_rules: QuestRules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novice_round_is_three_questions_fifteen_seconds() {
        let plan = MatchRules::round_plan(Tier::Novice);
        assert_eq!(plan.questions, 3);
        assert_eq!(plan.seconds, 15);
    }

    #[test]
    fn memory_key_award_floors_at_one() {
        let rules = QuestRules::new();
        assert_eq!(rules.memory_key_award(0), 3);
        assert_eq!(rules.memory_key_award(1), 2);
        assert_eq!(rules.memory_key_award(2), 1);
        assert_eq!(rules.memory_key_award(10), 1);
    }
}
