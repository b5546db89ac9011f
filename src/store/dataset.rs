use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use crate::models::{FeatureValue, HistoricalRecord};
use crate::utils::{is_form_column, parse_match_date};

const HOME_TEAM_COLUMN: &str = "HomeTeam";
const AWAY_TEAM_COLUMN: &str = "AwayTeam";
const DATE_COLUMN: &str = "Date";

/// Past matches, sorted by date ascending.
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    form_columns: Vec<String>,
    records: Vec<HistoricalRecord>,
    home_teams: Vec<String>,
}

impl HistoricalDataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to parse dataset {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| anyhow::anyhow!("dataset has no {} column", name))
        };
        let home_idx = position(HOME_TEAM_COLUMN)?;
        let away_idx = position(AWAY_TEAM_COLUMN)?;
        let date_idx = position(DATE_COLUMN)?;

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("malformed dataset row {}", line + 2))?;

            let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
            let mut fields = HashMap::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                fields.insert(name.clone(), FeatureValue::parse(cell(idx)));
            }

            records.push(HistoricalRecord {
                home_team: cell(home_idx).to_string(),
                away_team: cell(away_idx).to_string(),
                date: parse_match_date(cell(date_idx)),
                fields,
            });
        }

        Ok(Self::from_records(columns, records))
    }

    /// Build a dataset from already parsed rows, applying the date ordering.
    pub fn from_records(columns: Vec<String>, mut records: Vec<HistoricalRecord>) -> Self {
        // Stable, and rows with an unparseable date sort after every dated row.
        records.sort_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let mut seen = HashSet::new();
        let home_teams = records
            .iter()
            .filter(|r| seen.insert(r.home_team.clone()))
            .map(|r| r.home_team.clone())
            .collect();

        let form_columns = columns.iter().filter(|c| is_form_column(c)).cloned().collect();

        Self {
            form_columns,
            records,
            home_teams,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn form_columns(&self) -> &[String] {
        &self.form_columns
    }

    /// Distinct HomeTeam values in order of first appearance.
    pub fn home_teams(&self) -> &[String] {
        &self.home_teams
    }

    /// Most recent match played by `team` at home.
    pub fn latest_home(&self, team: &str) -> Option<&HistoricalRecord> {
        self.records.iter().rev().find(|r| r.home_team == team)
    }

    /// Most recent match played by `team` away.
    pub fn latest_away(&self, team: &str) -> Option<&HistoricalRecord> {
        self.records.iter().rev().find(|r| r.away_team == team)
    }

    pub fn home_match_count(&self, team: &str) -> usize {
        self.records.iter().filter(|r| r.home_team == team).count()
    }

    pub fn away_match_count(&self, team: &str) -> usize {
        self.records.iter().filter(|r| r.away_team == team).count()
    }
}
