//! Question bank loader.

use std::path::Path;

use quiz_core::QuestionBank;

use crate::loaders::{LoadResult, read_file};

/// Loader for question banks from RON files.
pub struct BankLoader;

impl BankLoader {
    /// Load a question bank from a RON file.
    pub fn load(path: &Path) -> LoadResult<QuestionBank> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse bank RON {}: {}", path.display(), e))
    }

    /// Parse a question bank from RON text.
    pub fn from_str(content: &str) -> LoadResult<QuestionBank> {
        let bank: QuestionBank =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse bank RON: {}", e))?;
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Category, MatchPolicy, Tier};

    #[test]
    fn parses_minimal_bank() {
        let ron = r#"
            (
                questions: [
                    (
                        prompt: "Who led the Israelites out of Egypt?",
                        answer: "Moses",
                        policy: Exact,
                        keywords: ["moses"],
                        tier: Novice,
                        category: People,
                    ),
                ],
            )
        "#;
        let bank = BankLoader::from_str(ron).unwrap();
        assert_eq!(bank.len(), 1);

        let q = bank.iter().next().unwrap();
        assert_eq!(q.answer, "Moses");
        assert_eq!(q.policy, MatchPolicy::Exact);
        assert_eq!(q.tier, Tier::Novice);
        assert_eq!(q.category, Category::People);
        // Omitted optional fields default cleanly
        assert!(q.hall.is_none());
        assert!(q.hints.is_empty());
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let error = BankLoader::load(Path::new("/nonexistent/bank.ron")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/bank.ron"));
    }

    #[test]
    fn load_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.ron");
        std::fs::write(
            &path,
            r#"(questions: [(prompt: "p", answer: "a", policy: Fuzzy, keywords: ["a", "b"], tier: Sage, category: Verses)])"#,
        )
        .unwrap();

        let bank = BankLoader::load(&path).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.iter().next().unwrap().keywords.len(), 2);
    }
}
