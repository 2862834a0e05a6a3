//! Delegated answer judging.
//!
//! Fuzzy halls hand free-form answers to an external judge, an untrusted,
//! possibly slow, possibly failing black box. The session worker wraps every
//! call in a timeout and falls back to local exact-match grading on any
//! failure, so gameplay never stalls on the judge and never sees its errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quiz_core::{Question, normalize};

/// Request wire shape handed to the judge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JudgeRequest {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub acceptable_keywords: Vec<String>,
}

impl JudgeRequest {
    /// Build a request for the live question and the submitted text.
    pub fn for_question(question: &Question, submitted: &str) -> Self {
        Self {
            question: question.prompt.clone(),
            correct_answer: question.answer.clone(),
            user_answer: submitted.to_owned(),
            acceptable_keywords: question.keywords.clone(),
        }
    }
}

/// Structured verdict returned by the judge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JudgeVerdict {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Judge-side failures. Never surfaced to gameplay; the worker logs them and
/// falls back to exact grading.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("judge transport failed: {0}")]
    Transport(String),

    #[error("judge returned a malformed verdict: {0}")]
    Malformed(String),
}

/// Async collaborator grading free-form answers.
#[async_trait]
pub trait AnswerJudge: Send + Sync {
    /// Judge a submission. Implementations may take network round-trips; the
    /// caller enforces its own timeout.
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict, JudgeError>;
}

/// Offline judge that applies the keyword-containment rule locally.
///
/// Useful as a fixture and as a no-network default: a submission must
/// contain `min(2, k)` of the `k` acceptable keywords, or equal the expected
/// answer outright.
pub struct KeywordJudge;

#[async_trait]
impl AnswerJudge for KeywordJudge {
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict, JudgeError> {
        let submitted = normalize(&request.user_answer);
        if submitted == normalize(&request.correct_answer) {
            return Ok(JudgeVerdict {
                is_correct: true,
                feedback: None,
            });
        }

        let hits = request
            .acceptable_keywords
            .iter()
            .filter(|keyword| submitted.contains(&normalize(keyword)))
            .count();
        let required = request.acceptable_keywords.len().min(2).max(1);

        Ok(JudgeVerdict {
            is_correct: hits >= required,
            feedback: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Category, MatchPolicy, Tier};

    fn request(keywords: &[&str], user_answer: &str) -> JudgeRequest {
        JudgeRequest {
            question: "q".to_owned(),
            correct_answer: "the expected answer".to_owned(),
            user_answer: user_answer.to_owned(),
            acceptable_keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn keyword_judge_applies_containment_threshold() {
        let judge = KeywordJudge;

        let verdict = judge.judge(&request(&["bread", "fish"], "bread and fish")).await.unwrap();
        assert!(verdict.is_correct);

        let verdict = judge.judge(&request(&["bread", "fish"], "only bread")).await.unwrap();
        assert!(!verdict.is_correct);

        let verdict = judge
            .judge(&request(&[], "THE EXPECTED ANSWER"))
            .await
            .unwrap();
        assert!(verdict.is_correct);
    }

    #[test]
    fn request_carries_question_fields() {
        let question = Question {
            prompt: "Who led them?".to_owned(),
            answer: "Moses".to_owned(),
            policy: MatchPolicy::Fuzzy,
            keywords: vec!["moses".to_owned()],
            tier: Tier::Novice,
            category: Category::People,
            hall: None,
            reference: None,
            hints: vec![],
        };
        let request = JudgeRequest::for_question(&question, "Moses maybe?");
        assert_eq!(request.correct_answer, "Moses");
        assert_eq!(request.acceptable_keywords, vec!["moses"]);
    }

    #[test]
    fn verdict_wire_shape_tolerates_missing_feedback() {
        let verdict: JudgeVerdict = serde_json::from_str(r#"{"is_correct": true}"#).unwrap();
        assert!(verdict.is_correct);
        assert!(verdict.feedback.is_none());

        let verdict: JudgeVerdict =
            serde_json::from_str(r#"{"is_correct": false, "feedback": "close"}"#).unwrap();
        assert_eq!(verdict.feedback.as_deref(), Some("close"));
    }
}
