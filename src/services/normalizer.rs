use std::collections::HashMap;

use crate::store::HistoricalDataset;
use crate::utils::title_case;

/// Common user spellings -> dataset team names.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("manchester city", "Man City"),
    ("man city", "Man City"),
    ("manchester united", "Man United"),
    ("man united", "Man United"),
    ("utd", "Man United"),
    ("nottingham forest", "Nott'm Forest"),
    ("nottm forest", "Nott'm Forest"),
    ("wolves", "Wolves"),
    ("wolverhampton", "Wolves"),
    ("sheffield united", "Sheffield United"),
    ("sheffield", "Sheffield United"),
    ("qpr", "QPR"),
    ("queens park rangers", "QPR"),
    ("brighton and hove albion", "Brighton"),
    ("west ham united", "West Ham"),
    ("tottenham hotspur", "Tottenham"),
    ("spurs", "Tottenham"),
];

/// Maps free-text team names to the names used as dataset keys.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    aliases: HashMap<String, String>,
    /// Lowercased dataset home-team name -> exact dataset spelling.
    known_teams: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new(dataset: &HistoricalDataset) -> Self {
        let mut aliases = HashMap::new();
        for (alias, canonical) in TEAM_ALIASES {
            aliases.insert(alias.to_string(), canonical.to_string());
            // Canonical targets must normalize to themselves even without a dataset.
            aliases
                .entry(canonical.to_lowercase())
                .or_insert_with(|| canonical.to_string());
        }

        let mut known_teams = HashMap::new();
        for team in dataset.home_teams() {
            known_teams.entry(team.to_lowercase()).or_insert_with(|| team.clone());
        }

        Self { aliases, known_teams }
    }

    /// Best-effort canonical name. Never fails; an unknown team comes back
    /// title-cased and simply misses every dataset lookup.
    pub fn normalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        let clean = trimmed.to_lowercase();

        if let Some(canonical) = self.aliases.get(&clean) {
            return canonical.clone();
        }

        if let Some(known) = self.known_teams.get(&clean) {
            return known.clone();
        }

        title_case(trimmed)
    }
}
