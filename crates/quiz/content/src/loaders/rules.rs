//! Rule set loader.

use std::path::Path;

use quiz_core::RuleSet;

use crate::loaders::{LoadResult, read_file};

/// Loader for rule configuration from TOML files.
pub struct RulesLoader;

impl RulesLoader {
    /// Load a rule set from a TOML file. Missing tables fall back to the
    /// built-in defaults.
    pub fn load(path: &Path) -> LoadResult<RuleSet> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML {}: {}", path.display(), e))
    }

    /// Parse a rule set from TOML text.
    pub fn from_str(content: &str) -> LoadResult<RuleSet> {
        let rules: RuleSet = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_rule_set() {
        let toml = r#"
            [match_rules]
            winning_score = 12

            [quest_rules]
            challenge_seconds = 45
            memory_key_base = 4
        "#;
        let rules = RulesLoader::from_str(toml).unwrap();
        assert_eq!(rules.match_rules.winning_score, 12);
        assert_eq!(rules.quest_rules.challenge_seconds, 45);
        assert_eq!(rules.quest_rules.memory_key_base, 4);
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let rules = RulesLoader::from_str("").unwrap();
        assert_eq!(rules, RuleSet::default());
    }
}
