//! Answer grading policies.
//!
//! Grading is a pure function of the question and the submitted text; calling
//! it twice with the same inputs yields the same verdict. The delegated
//! judging path lives in the runtime; when the external judge fails, the
//! runtime falls back to [`grade_exact`] so gameplay never observes the
//! failure.

use crate::bank::{MatchPolicy, Question};

/// Verdict for one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeResult {
    pub is_correct: bool,
    /// Commentary for the result screen. Local grading leaves this empty;
    /// the delegated judge may fill it in.
    pub feedback: Option<String>,
}

impl GradeResult {
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            feedback: None,
        }
    }

    pub fn incorrect() -> Self {
        Self {
            is_correct: false,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Lowercase and trim for comparison.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Grade a submission according to the question's own policy.
pub fn grade(question: &Question, submitted: &str) -> GradeResult {
    match question.policy {
        MatchPolicy::Exact => grade_exact(question, submitted),
        MatchPolicy::Fuzzy => grade_fuzzy(question, submitted),
    }
}

/// Exact policy: normalized equality, or any acceptable keyword contained in
/// the submission. The keyword path is a deliberate leniency; an exact
/// question still accepts a matching keyword as a fallback.
pub fn grade_exact(question: &Question, submitted: &str) -> GradeResult {
    let submitted = normalize(submitted);
    if submitted == normalize(&question.answer) || keyword_hits(&question.keywords, &submitted) > 0
    {
        GradeResult::correct()
    } else {
        GradeResult::incorrect()
    }
}

/// Fuzzy policy: the submission must contain at least `min(2, k)` of the
/// question's `k` keywords. One keyword is enough only when one exists; with
/// no keywords at all, fall back to normalized equality.
pub fn grade_fuzzy(question: &Question, submitted: &str) -> GradeResult {
    let keyword_count = question.keywords.len();
    if keyword_count == 0 {
        return grade_exact(question, submitted);
    }

    let submitted = normalize(submitted);
    let required = keyword_count.min(2);
    if keyword_hits(&question.keywords, &submitted) >= required {
        GradeResult::correct()
    } else {
        GradeResult::incorrect()
    }
}

/// Count keywords contained in the normalized submission (case-insensitive
/// substring match).
fn keyword_hits(keywords: &[String], submitted_normalized: &str) -> usize {
    keywords
        .iter()
        .filter(|keyword| submitted_normalized.contains(&normalize(keyword)))
        .count()
}
