//! Scoring profiles: chart dimensions and their formulas.

use serde::{Deserialize, Serialize};

use super::{clamp_score, Category, DerivedScore, Formula, Metric, ScoreSource, Scores};
use crate::error::{Error, Result};

/// Fewest dimensions a radar chart can usefully show.
pub const MIN_DIMENSIONS: usize = 3;
/// Most dimensions a profile may define.
pub const MAX_DIMENSIONS: usize = 5;

/// One chart axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Stable key.
    pub key: String,
    /// Axis label; `\n` starts a new line.
    pub label: String,
    /// How the raw score is computed.
    pub formula: Formula,
}

impl Dimension {
    /// Creates a dimension.
    pub fn new(key: impl Into<String>, label: impl Into<String>, formula: Formula) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            formula,
        }
    }
}

/// A named set of 3–5 dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    /// Profile name.
    pub name: String,
    /// Dimensions in chart order.
    pub dimensions: Vec<Dimension>,
}

const TECHNICAL_LABEL: &str = "Technical & Tactical\n(技術戰術)";
const COMPETITION_LABEL: &str = "Competition Behavior\n(競賽行為)";
const TRAINING_LABEL: &str = "Training Engagement\n(訓練投入)";

impl ScoringProfile {
    /// Names of the built-in profiles.
    pub const BUILTIN: &'static [&'static str] = &["standard", "rubric"];

    /// The scorecard's own formulas:
    ///
    /// - technical = (scoring effectiveness / 20) × 0.5 + (match control / 5) × 0.5
    /// - competition = 3.5 when consistency is high, else 2.5
    /// - training = attendance rate / 20, capped at 5
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            dimensions: vec![
                Dimension::new(
                    "technical",
                    TECHNICAL_LABEL,
                    Formula::blend([
                        (0.5, Formula::scaled(Metric::ScoringEffectiveness, 20.0)),
                        (0.5, Formula::scaled(Metric::MatchControl, 5.0)),
                    ]),
                ),
                Dimension::new(
                    "competition",
                    COMPETITION_LABEL,
                    Formula::choice(Category::Consistency, "high", 3.5, 2.5),
                ),
                Dimension::new(
                    "training",
                    TRAINING_LABEL,
                    Formula::scaled(Metric::AttendanceRate, 20.0),
                ),
            ],
        }
    }

    /// Averages three 1–5 rubric items per dimension.
    ///
    /// Expects the items `footwork`, `kicking`, `distance`, `composure`,
    /// `decision_making`, `work_rate`, `focus` and `recovery`; competition
    /// also counts match control.
    pub fn rubric() -> Self {
        let items = |names: &[&str]| {
            Formula::mean(names.iter().map(|n| Formula::rubric_item(*n, 1.0)))
        };
        Self {
            name: "rubric".to_string(),
            dimensions: vec![
                Dimension::new(
                    "technical",
                    TECHNICAL_LABEL,
                    items(&["footwork", "kicking", "distance"]),
                ),
                Dimension::new(
                    "competition",
                    COMPETITION_LABEL,
                    Formula::mean([
                        Formula::scaled(Metric::MatchControl, 1.0),
                        Formula::rubric_item("composure", 1.0),
                        Formula::rubric_item("decision_making", 1.0),
                    ]),
                ),
                Dimension::new(
                    "training",
                    TRAINING_LABEL,
                    items(&["work_rate", "focus", "recovery"]),
                ),
            ],
        }
    }

    /// Looks up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "rubric" => Some(Self::rubric()),
            _ => None,
        }
    }

    /// Checks dimension count, key uniqueness and every formula.
    pub fn validate(&self) -> Result<()> {
        let n = self.dimensions.len();
        if !(MIN_DIMENSIONS..=MAX_DIMENSIONS).contains(&n) {
            return Err(Error::profile(
                &self.name,
                format!("needs {MIN_DIMENSIONS} to {MAX_DIMENSIONS} dimensions, has {n}"),
            ));
        }
        for (i, dim) in self.dimensions.iter().enumerate() {
            if dim.key.trim().is_empty() {
                return Err(Error::profile(&self.name, format!("dimension {i} has no key")));
            }
            if self.dimensions[..i].iter().any(|d| d.key == dim.key) {
                return Err(Error::profile(
                    &self.name,
                    format!("duplicate dimension '{}'", dim.key),
                ));
            }
            dim.formula.check(&self.name)?;
        }
        Ok(())
    }

    /// Rubric items any dimension reads.
    pub fn rubric_items(&self) -> Vec<&str> {
        let mut items: Vec<&str> = Vec::new();
        for item in self.dimensions.iter().flat_map(|d| d.formula.rubric_items()) {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        items
    }

    /// Computes every dimension's score, clamped into `[0, 5]`.
    ///
    /// # Errors
    ///
    /// Returns a profile error if the profile is malformed, or a scoring
    /// error naming every rubric item it reads that was not rated.
    pub fn score(&self, source: &dyn ScoreSource) -> Result<Scores> {
        self.validate()?;
        let missing: Vec<&str> = self
            .rubric_items()
            .into_iter()
            .filter(|item| source.rubric(item).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::scoring(format!(
                "rubric items not rated: {}",
                missing.join(", ")
            )));
        }
        let scores = self
            .dimensions
            .iter()
            .map(|dim| {
                let raw = dim.formula.evaluate(source)?;
                let value = clamp_score(raw);
                tracing::debug!(profile = %self.name, dimension = %dim.key, raw, value, "Scored dimension");
                Ok(DerivedScore {
                    key: dim.key.clone(),
                    label: dim.label.clone(),
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Scores {
            profile: self.name.clone(),
            scores,
        })
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::standard()
    }
}
