//! Embedded standard content.
//!
//! The standard bank, hall sequence, and rule set ship inside the crate and
//! parse once on first use. Deployments that want their own content load it
//! through [`crate::loaders`] instead.

use std::sync::OnceLock;

use quiz_core::{Hall, QuestionBank, RuleSet};

use crate::loaders::{BankLoader, HallLoader, RulesLoader};

const BANK_RON: &str = include_str!("../data/standard_bank.ron");
const HALLS_RON: &str = include_str!("../data/halls.ron");
const RULES_TOML: &str = include_str!("../data/rules.toml");

/// The standard question bank.
pub fn standard_bank() -> &'static QuestionBank {
    static BANK: OnceLock<QuestionBank> = OnceLock::new();
    BANK.get_or_init(|| {
        BankLoader::from_str(BANK_RON).expect("embedded standard bank must parse")
    })
}

/// The standard quest hall sequence.
pub fn standard_halls() -> &'static [Hall] {
    static HALLS: OnceLock<Vec<Hall>> = OnceLock::new();
    HALLS
        .get_or_init(|| HallLoader::from_str(HALLS_RON).expect("embedded hall sequence must parse"))
}

/// The standard rule set.
pub fn standard_rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(|| RulesLoader::from_str(RULES_TOML).expect("embedded rules must parse"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Category, ConsumedSet, Tier};

    #[test]
    fn embedded_content_parses() {
        assert!(!standard_bank().is_empty());
        assert!(!standard_halls().is_empty());
        assert_eq!(standard_rules().match_rules.winning_score, 10);
    }

    #[test]
    fn every_tier_and_category_has_questions() {
        let bank = standard_bank();
        let consumed = ConsumedSet::new();
        for tier in Tier::ALL {
            let open = bank.categories_with_unused(tier, &consumed);
            assert_eq!(
                open,
                Category::ALL.to_vec(),
                "tier {tier} is missing a category"
            );
        }
    }

    #[test]
    fn every_hall_fills_its_cap() {
        let bank = standard_bank();
        for hall in standard_halls() {
            let challenges = bank.hall_questions(hall.kind, hall.question_cap);
            assert_eq!(
                challenges.len(),
                hall.question_cap,
                "hall {} is short of questions",
                hall.kind
            );
        }
    }

    #[test]
    fn fuzzy_questions_carry_keywords() {
        for q in standard_bank().iter() {
            if q.policy == quiz_core::MatchPolicy::Fuzzy {
                assert!(
                    !q.keywords.is_empty(),
                    "fuzzy question `{}` has no keywords",
                    q.prompt
                );
            }
        }
    }

    #[test]
    fn answers_grade_correct_against_their_own_questions() {
        for q in standard_bank().iter() {
            let grade = quiz_core::grade(q, &q.answer);
            assert!(grade.is_correct, "question `{}` rejects its answer", q.prompt);
        }
    }
}
