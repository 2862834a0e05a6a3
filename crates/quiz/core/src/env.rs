//! Read-only environment handed to the engines.
//!
//! Mirrors the split between session state (mutable, owned by the engine) and
//! static content (bank, halls, rules) plus the injected RNG oracle. The
//! engine borrows the environment per command and never stores it.

use crate::bank::{Hall, QuestionBank};
use crate::config::RuleSet;
use crate::rng::RngOracle;

/// Borrowed view of everything a transition may read.
#[derive(Clone, Copy)]
pub struct QuizEnv<'a> {
    pub bank: &'a QuestionBank,
    /// Ordered hall sequence for quest mode.
    pub halls: &'a [Hall],
    pub rules: &'a RuleSet,
    pub rng: &'a dyn RngOracle,
}

impl<'a> QuizEnv<'a> {
    pub fn new(
        bank: &'a QuestionBank,
        halls: &'a [Hall],
        rules: &'a RuleSet,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            bank,
            halls,
            rules,
            rng,
        }
    }
}
