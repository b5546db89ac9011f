use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Rating used when neither the table nor the history knows a team.
pub const NEUTRAL_STRENGTH: f64 = 1500.0;

/// Team-strength ratings keyed by canonical team name.
#[derive(Debug, Clone, Default)]
pub struct StrengthTable {
    ratings: HashMap<String, f64>,
}

impl StrengthTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read strength ratings {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("failed to parse strength ratings {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let ratings: HashMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self { ratings })
    }

    pub fn get(&self, team: &str) -> Option<f64> {
        self.ratings.get(team).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl FromIterator<(String, f64)> for StrengthTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            ratings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let table =
            StrengthTable::from_json_str(r#"{"Man City": 1910.5, "Arsenal": 1850}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Arsenal"), Some(1850.0));
        assert_eq!(table.get("Luton"), None);
    }

    #[test]
    fn test_rejects_non_numeric_ratings() {
        assert!(StrengthTable::from_json_str(r#"{"Man City": "strong"}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(StrengthTable::load(Path::new("/nonexistent/ratings.json")).is_err());
    }
}
