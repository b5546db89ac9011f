use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub home_team: String,
    pub away_team: String,
    pub home_rank: i64,
    pub away_rank: i64,
}

/// Match outcome from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome probabilities expressed in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "Home")]
    pub home: f64,
    #[serde(rename = "Draw")]
    pub draw: f64,
    #[serde(rename = "Away")]
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Outcome,
    pub probabilities: Probabilities,
}

/// A single cell of a historical row or a feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Missing,
}

/// Cell contents the training pipeline's CSV reader treats as not available.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl FeatureValue {
    /// Parse a raw CSV cell. Empty cells and NA markers are missing, numeric
    /// cells are numbers.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
            return FeatureValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => FeatureValue::Number(n),
            Err(_) => FeatureValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

/// One past match from the historical dataset.
#[derive(Debug, Clone)]
pub struct HistoricalRecord {
    pub home_team: String,
    pub away_team: String,
    /// `None` when the Date cell could not be parsed.
    pub date: Option<NaiveDateTime>,
    pub fields: HashMap<String, FeatureValue>,
}

impl HistoricalRecord {
    /// Value of a column, treating empty cells as absent.
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.fields.get(column).filter(|v| !v.is_missing())
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FeatureValue::as_f64)
    }
}

/// Ordered single-row record handed to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value while keeping its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        let name = name.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Project the record onto `schema`, in schema order.
    ///
    /// Returns the first schema column the record lacks as the error.
    pub fn select(&self, schema: &[String]) -> std::result::Result<Vec<FeatureValue>, String> {
        schema
            .iter()
            .map(|col| self.get(col).cloned().ok_or_else(|| col.clone()))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub classifier_loaded: bool,
    pub history_rows: usize,
    pub rated_teams: usize,
}

/// Body returned with non-200 responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
