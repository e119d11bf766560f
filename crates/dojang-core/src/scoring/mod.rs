//! Derived-score computation.
//!
//! A [`ScoringProfile`] maps each chart dimension to a [`Formula`]. Profiles
//! are data, so scorecard variants differ by configuration rather than by
//! code. Every derived score lands in `[0, 5]`.

mod formula;
mod profile;
mod proptests;

use serde::{Deserialize, Serialize};

use crate::assessment::Assessment;

pub use formula::{Formula, Term};
pub use profile::{Dimension, ScoringProfile, MAX_DIMENSIONS, MIN_DIMENSIONS};

/// Upper bound of every derived score (and of the chart's radial axis).
pub const SCORE_MAX: f64 = 5.0;

/// Numeric inputs a formula can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Scoring effectiveness, 0–100.
    ScoringEffectiveness,
    /// Match control rating, 1–5.
    MatchControl,
    /// Attendance rate, percent.
    AttendanceRate,
    /// Key-session rate, percent.
    KeySessionRate,
    /// Counter-attacks conceded per match.
    CountersConceded,
    /// Penalties received per match.
    PenaltiesReceived,
    /// International matches, lifetime.
    IntlMatches,
}

/// Categorical inputs a formula can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Performance consistency.
    Consistency,
    /// Pressure response.
    PressureResponse,
    /// Match load tolerance.
    LoadTolerance,
    /// Athlete status.
    AthleteStatus,
}

impl Category {
    /// Resolves an option (key or label) of this category to its key.
    pub fn option_key(self, option: &str) -> Option<&'static str> {
        use crate::catalogue::{AthleteStatus, Consistency, LoadTolerance, PressureResponse};
        match self {
            Category::Consistency => option.parse::<Consistency>().ok().map(|o| o.key()),
            Category::PressureResponse => {
                option.parse::<PressureResponse>().ok().map(|o| o.key())
            }
            Category::LoadTolerance => option.parse::<LoadTolerance>().ok().map(|o| o.key()),
            Category::AthleteStatus => option.parse::<AthleteStatus>().ok().map(|o| o.key()),
        }
    }
}

/// Anything formulas can be evaluated against.
pub trait ScoreSource {
    /// Value of a numeric input.
    fn metric(&self, metric: Metric) -> f64;

    /// Key of the selected option of a categorical input.
    fn category(&self, category: Category) -> &'static str;

    /// Rating of a named rubric item, if supplied.
    fn rubric(&self, item: &str) -> Option<f64>;
}

impl ScoreSource for Assessment {
    fn metric(&self, metric: Metric) -> f64 {
        let input = self.input();
        match metric {
            Metric::ScoringEffectiveness => f64::from(input.technical.scoring_effectiveness.get()),
            Metric::MatchControl => f64::from(input.technical.match_control.get()),
            Metric::AttendanceRate => self.attendance_rate(),
            Metric::KeySessionRate => self.key_session_rate(),
            Metric::CountersConceded => f64::from(input.technical.counters_conceded),
            Metric::PenaltiesReceived => f64::from(input.technical.penalties_received),
            Metric::IntlMatches => f64::from(input.competition.intl_matches),
        }
    }

    fn category(&self, category: Category) -> &'static str {
        let input = self.input();
        match category {
            Category::Consistency => input.competition.consistency.key(),
            Category::PressureResponse => input.competition.pressure_response.key(),
            Category::LoadTolerance => input.competition.load_tolerance.key(),
            Category::AthleteStatus => input.summary.athlete_status.key(),
        }
    }

    fn rubric(&self, item: &str) -> Option<f64> {
        self.input()
            .rubric
            .get(item.trim())
            .map(|rating| f64::from(rating.get()))
    }
}

/// One dimension's derived score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedScore {
    /// Dimension key.
    pub key: String,
    /// Dimension label (may contain a line break).
    pub label: String,
    /// Score in `[0, 5]`.
    pub value: f64,
}

/// The derived scores of one assessment under one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Profile that produced the scores.
    pub profile: String,
    /// Scores in dimension order.
    pub scores: Vec<DerivedScore>,
}

impl Scores {
    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether there are no dimensions.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score of the dimension with `key`.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.key == key).map(|s| s.value)
    }

    /// Iterates over the scores.
    pub fn iter(&self) -> std::slice::Iter<'_, DerivedScore> {
        self.scores.iter()
    }
}

/// Maps a raw formula result into `[0, 5]`; non-finite values become 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, SCORE_MAX)
    } else {
        0.0
    }
}
