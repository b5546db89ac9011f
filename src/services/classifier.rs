//! Classifier artifact and the `predict_proba` contract.
//!
//! The production model is exported to JSON as a multinomial linear model:
//!
//! ```json
//! {
//!   "model": {
//!     "model_name": "epl_outcome_v3",
//!     "feature_names": ["HomeTeam", "HomeTeam_League_Rank", "..."],
//!     "classes": ["A", "D", "H"],
//!     "coefficients": [[...], [...], [...]],
//!     "intercepts": [0.1, -0.2, 0.1],
//!     "categorical": { "HomeTeam": { "Man City": [-0.3, 0.0, 0.4] } }
//!   }
//! }
//! ```
//!
//! The outer `{"model": ...}` wrapper is optional. Text features are scored
//! through `categorical` weights; unknown categories contribute nothing.

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::PredictError;
use crate::models::{FeatureValue, Outcome};
use crate::utils::softmax;

/// Opaque probabilistic classifier over a named, ordered feature schema.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Input columns, in the order `predict_proba` expects them.
    fn feature_names(&self) -> &[String];

    /// Class labels, aligned with the probabilities `predict_proba` returns.
    fn classes(&self) -> &[String];

    fn predict_proba(&self, row: &[FeatureValue]) -> Result<Vec<f64>, PredictError>;
}

#[derive(Debug, Deserialize)]
struct LinearClassifierJson {
    #[serde(default = "default_model_name")]
    model_name: String,
    feature_names: Vec<String>,
    classes: Vec<serde_json::Value>,
    #[serde(alias = "weights")]
    coefficients: Vec<Vec<f64>>,
    #[serde(alias = "biases")]
    intercepts: Vec<f64>,
    #[serde(default)]
    categorical: HashMap<String, HashMap<String, Vec<f64>>>,
}

fn default_model_name() -> String {
    "linear".to_string()
}

/// `softmax(W·x + b)` classifier loaded from a JSON export.
#[derive(Debug)]
pub struct LinearClassifier {
    name: String,
    feature_names: Vec<String>,
    classes: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    /// Per feature position: category -> per-class weight.
    categorical: Vec<Option<HashMap<String, Vec<f64>>>>,
}

impl LinearClassifier {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json).context("invalid JSON")?;
        if let Some(inner) = value.get_mut("model") {
            value = inner.take();
        }
        let parsed: LinearClassifierJson =
            serde_json::from_value(value).context("unexpected classifier layout")?;

        let n_classes = parsed.classes.len();
        let n_features = parsed.feature_names.len();
        ensure!(n_classes > 0, "classifier declares no classes");
        ensure!(
            parsed.coefficients.len() == n_classes,
            "expected {} coefficient rows, got {}",
            n_classes,
            parsed.coefficients.len()
        );
        for (i, row) in parsed.coefficients.iter().enumerate() {
            ensure!(
                row.len() == n_features,
                "coefficient row {} has {} elements, expected {}",
                i,
                row.len(),
                n_features
            );
        }
        ensure!(
            parsed.intercepts.len() == n_classes,
            "expected {} intercepts, got {}",
            n_classes,
            parsed.intercepts.len()
        );

        let mut categorical = vec![None; n_features];
        for (feature, weights) in parsed.categorical {
            let Some(pos) = parsed.feature_names.iter().position(|f| *f == feature) else {
                bail!("categorical weights given for unknown feature {}", feature);
            };
            for (category, w) in &weights {
                ensure!(
                    w.len() == n_classes,
                    "categorical weights for {}={} have {} elements, expected {}",
                    feature,
                    category,
                    w.len(),
                    n_classes
                );
            }
            categorical[pos] = Some(weights);
        }

        let classes = parsed
            .classes
            .iter()
            .map(|c| match c {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        Ok(Self {
            name: parsed.model_name,
            feature_names: parsed.feature_names,
            classes,
            coefficients: parsed.coefficients,
            intercepts: parsed.intercepts,
            categorical,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read classifier {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("failed to parse classifier {}", path.display()))
    }

    fn category_key(value: &FeatureValue) -> Option<String> {
        match value {
            FeatureValue::Text(s) => Some(s.clone()),
            FeatureValue::Number(n) => Some(n.to_string()),
            FeatureValue::Missing => None,
        }
    }
}

impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, row: &[FeatureValue]) -> Result<Vec<f64>, PredictError> {
        if row.len() != self.feature_names.len() {
            return Err(PredictError::Validation(format!(
                "classifier expects {} features, got {}",
                self.feature_names.len(),
                row.len()
            )));
        }

        let mut scores = self.intercepts.clone();
        for (pos, value) in row.iter().enumerate() {
            if let Some(weights) = &self.categorical[pos] {
                if let Some(w) = Self::category_key(value).and_then(|k| weights.get(&k)) {
                    for (score, w) in scores.iter_mut().zip(w) {
                        *score += w;
                    }
                }
                continue;
            }

            let x = match value {
                FeatureValue::Number(n) => *n,
                FeatureValue::Missing => f64::NAN,
                FeatureValue::Text(s) => {
                    return Err(PredictError::Validation(format!(
                        "could not convert {:?} to a number for feature {}",
                        s, self.feature_names[pos]
                    )))
                }
            };
            for (class, score) in scores.iter_mut().enumerate() {
                *score += self.coefficients[class][pos] * x;
            }
        }

        Ok(softmax(&scores))
    }
}

/// Positions of the H, D and A probabilities in the classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassIndex {
    pub home: usize,
    pub draw: usize,
    pub away: usize,
}

impl ClassIndex {
    /// Order assumed for unlabelled three-class models (A, D, H).
    pub const POSITIONAL: ClassIndex = ClassIndex { home: 2, draw: 1, away: 0 };

    /// Map class labels to outcomes.
    ///
    /// Labels must include "H", "D" and "A". Otherwise the positional order is
    /// used only when `allow_positional` is set and exactly three classes exist.
    pub fn resolve(classes: &[String], allow_positional: bool) -> Result<Self> {
        let find = |outcome: Outcome| classes.iter().position(|c| c == outcome.code());

        if let (Some(home), Some(draw), Some(away)) =
            (find(Outcome::Home), find(Outcome::Draw), find(Outcome::Away))
        {
            return Ok(Self { home, draw, away });
        }

        if allow_positional && classes.len() == 3 {
            tracing::warn!(
                "Classifier labels {:?} are not H/D/A; assuming positional order [A, D, H]",
                classes
            );
            return Ok(Self::POSITIONAL);
        }

        bail!(
            "classifier classes {:?} do not include H, D and A (set \
             MATCHCAST_POSITIONAL_CLASSES=true to assume [A, D, H] order for three-class models)",
            classes
        )
    }

    /// Read (home, draw, away) out of a probability vector.
    pub fn pick(&self, probs: &[f64]) -> Result<(f64, f64, f64), PredictError> {
        let get = |idx: usize| {
            probs.get(idx).copied().ok_or_else(|| {
                PredictError::Validation(format!(
                    "classifier returned {} probabilities, class index {} out of range",
                    probs.len(),
                    idx
                ))
            })
        };
        Ok((get(self.home)?, get(self.draw)?, get(self.away)?))
    }
}

/// A classifier together with its class mapping, validated at load time.
pub struct LoadedClassifier {
    pub model: Box<dyn Classifier>,
    pub index: ClassIndex,
}

impl LoadedClassifier {
    pub fn new(model: Box<dyn Classifier>, allow_positional: bool) -> Result<Self> {
        let index = ClassIndex::resolve(model.classes(), allow_positional)?;
        Ok(Self { model, index })
    }

    pub fn load(path: &Path, allow_positional: bool) -> Result<Self> {
        let model = LinearClassifier::load(path)?;
        Self::new(Box::new(model), allow_positional)
    }
}

impl std::fmt::Debug for LoadedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedClassifier")
            .field("model", &self.model.name())
            .field("index", &self.index)
            .finish()
    }
}
