//! Quest hall sequence loader.

use std::path::Path;

use quiz_core::Hall;

use crate::loaders::{LoadResult, read_file};

/// Loader for ordered hall sequences from RON files.
pub struct HallLoader;

impl HallLoader {
    /// Load a hall sequence from a RON file. Order in the file is the order
    /// the quest walks.
    pub fn load(path: &Path) -> LoadResult<Vec<Hall>> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse halls RON {}: {}", path.display(), e))
    }

    /// Parse a hall sequence from RON text.
    pub fn from_str(content: &str) -> LoadResult<Vec<Hall>> {
        let halls: Vec<Hall> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse halls RON: {}", e))?;
        Ok(halls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{HallGrading, HallKind};

    #[test]
    fn parses_hall_sequence_in_order() {
        let ron = r#"
            [
                (
                    kind: Beginnings,
                    name: "Hall of Beginnings",
                    intro: "Dust motes drift over the first scrolls.",
                    grading: Exact,
                    question_cap: 3,
                ),
                (
                    kind: Prophets,
                    name: "Hall of Prophets",
                    intro: "Voices echo from the high alcoves.",
                    grading: Fuzzy,
                    question_cap: 2,
                ),
            ]
        "#;
        let halls = HallLoader::from_str(ron).unwrap();
        assert_eq!(halls.len(), 2);
        assert_eq!(halls[0].kind, HallKind::Beginnings);
        assert_eq!(halls[0].grading, HallGrading::Exact);
        assert_eq!(halls[1].kind, HallKind::Prophets);
        assert_eq!(halls[1].question_cap, 2);
    }
}
