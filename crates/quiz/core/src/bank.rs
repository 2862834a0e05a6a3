//! Question records and the in-memory question bank.
//!
//! The bank is a read-only table of [`Question`]s partitioned by tier,
//! category, and hall. Engines never mutate it; consumption is tracked per
//! session through [`QuestionKey`] exclusion sets so a question is asked at
//! most once per game.

use std::collections::BTreeSet;

use strum::{AsRefStr, Display, EnumIter};

use crate::grading::normalize;
use crate::rng::RngOracle;

/// Difficulty tier, ordinal 1–3. Controls the round's question count and
/// per-question time budget through the difficulty table in
/// [`MatchRules`](crate::config::MatchRules).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
    Novice,
    Scholar,
    Sage,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 3] = [Tier::Novice, Tier::Scholar, Tier::Sage];

    /// Ordinal rank, 1-based.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Novice => 1,
            Tier::Scholar => 2,
            Tier::Sage => 3,
        }
    }
}

/// Topic category for match-mode spins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    People,
    Places,
    Events,
    Verses,
}

impl Category {
    /// All categories in spin order.
    pub const ALL: [Category; 4] = [
        Category::People,
        Category::Places,
        Category::Events,
        Category::Verses,
    ];
}

/// Themed quest chamber. Tags which hall a question can appear in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HallKind {
    Beginnings,
    Kings,
    Prophets,
    Wisdom,
    Letters,
}

/// Grading policy attached to a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchPolicy {
    /// Normalized equality, with keyword containment as a leniency fallback.
    Exact,
    /// Keyword containment: at least `min(2, keyword_count)` keywords.
    Fuzzy,
}

/// Grading flavor of a hall. Fuzzy halls delegate verdicts to the external
/// judge when one is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HallGrading {
    Exact,
    Fuzzy,
}

/// One quest chamber: an ordered stop in the hall sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hall {
    pub kind: HallKind,
    pub name: String,
    /// Narration shown on the hall intro screen.
    pub intro: String,
    pub grading: HallGrading,
    /// Number of challenges drawn from the bank for this hall. The candidate
    /// list is truncated to this fixed prefix, not sampled.
    pub question_cap: usize,
}

/// Immutable trivia question record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Question {
    pub prompt: String,
    pub answer: String,
    pub policy: MatchPolicy,
    /// Acceptable keywords, in authoring order. Used by fuzzy grading and by
    /// the exact policy's keyword leniency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub keywords: Vec<String>,
    pub tier: Tier,
    pub category: Category,
    /// Hall this question may appear in during quest mode, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hall: Option<HallKind>,
    /// Citation for the answer, e.g. "Exodus 3:10".
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference: Option<String>,
    /// Hints in reveal order. Each reveal reduces the memory-key award.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hints: Vec<String>,
}

impl Question {
    /// Consumption identity: normalized prompt text.
    pub fn key(&self) -> QuestionKey {
        QuestionKey(normalize(&self.prompt))
    }
}

/// Identity of a consumed question within one session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestionKey(String);

impl QuestionKey {
    /// Build a key from raw prompt text (normalizing the same way
    /// [`Question::key`] does).
    pub fn from_prompt(prompt: &str) -> Self {
        Self(normalize(prompt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Set of question keys already consumed in the current session.
pub type ConsumedSet = BTreeSet<QuestionKey>;

/// Read-only, in-memory table of questions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Append authored questions (between sessions; the bank referenced by a
    /// running session is never touched).
    pub fn extend(&mut self, questions: impl IntoIterator<Item = Question>) {
        self.questions.extend(questions);
    }

    /// Questions matching an exact tier and category, in bank order.
    pub fn matching(&self, tier: Tier, category: Category) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.tier == tier && q.category == category)
    }

    /// Categories that still have at least one unconsumed question at `tier`.
    pub fn categories_with_unused(&self, tier: Tier, consumed: &ConsumedSet) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&category| {
                self.matching(tier, category)
                    .any(|q| !consumed.contains(&q.key()))
            })
            .collect()
    }

    /// Challenge list for a hall: bank-order candidates truncated to the
    /// hall's cap. The truncation is a fixed prefix by design, a per-hall
    /// length control rather than a random sample.
    pub fn hall_questions(&self, kind: HallKind, cap: usize) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.hall == Some(kind))
            .take(cap)
            .cloned()
            .collect()
    }
}

/// Uniform random draw over unconsumed questions.
pub struct QuestionSelector;

impl QuestionSelector {
    /// Pick an unconsumed question matching `tier` and `category`, uniformly
    /// at random among survivors. Returns `None` once the pool is exhausted;
    /// callers try every other category at the tier before giving up.
    pub fn draw<'a>(
        bank: &'a QuestionBank,
        tier: Tier,
        category: Category,
        consumed: &ConsumedSet,
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Option<&'a Question> {
        let survivors: Vec<&Question> = bank
            .matching(tier, category)
            .filter(|q| !consumed.contains(&q.key()))
            .collect();

        let index = rng.pick_index(seed, survivors.len())?;
        Some(survivors[index])
    }
}
