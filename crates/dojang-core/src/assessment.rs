//! Assessment input and the validated assessment record.
//!
//! [`AssessmentInput`] is built fresh for every submission (from a form, a
//! TOML file or a JSON body) and is never mutated afterwards.
//! [`AssessmentInput::validate`] turns it into an [`Assessment`], resolving
//! defaults and deriving the percentage metrics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalogue::{
    resolve_weight_class, weight_classes, AthleteStatus, Consistency, Context, Division,
    EvalType, Gender, LoadTolerance, PressureResponse,
};
use crate::error::{Error, Result};
use crate::metrics::{format_rate, ratio_percent, Percentage, Rating, ATTENDANCE_WARNING_THRESHOLD};
use crate::risk::RiskFlags;
use crate::table::Record;

/// Sheet column headers, in write order.
pub mod columns {
    /// Evaluation date.
    pub const DATE: &str = "Date (日期)";
    /// Athlete name.
    pub const NAME: &str = "Name (姓名)";
    /// Age division.
    pub const DIVISION: &str = "Division (組別)";
    /// Gender.
    pub const GENDER: &str = "Gender (性別)";
    /// Weight class.
    pub const WEIGHT: &str = "Weight (量級)";
    /// Context.
    pub const CONTEXT: &str = "Context (情境)";
    /// Evaluation type.
    pub const EVAL_TYPE: &str = "Eval_Type (評估類型)";
    /// Athlete status.
    pub const ATHLETE_STATUS: &str = "Athlete_Status (定位)";
    /// Serialised risk flags.
    pub const RISK_FLAGS: &str = "Risk_Flags (風險)";
    /// Attendance rate, one decimal.
    pub const ATTENDANCE_RATE: &str = "Attendance_Rate (出席率%)";
    /// Key-session rate, one decimal.
    pub const KEY_SESSION_RATE: &str = "Key_Session_Rate (關鍵課程%)";
    /// Scoring effectiveness.
    pub const SCORING_EFFECTIVENESS: &str = "Scoring_Effectiveness (得分效率%)";
    /// Match control rating.
    pub const MATCH_CONTROL: &str = "Match_Control (比賽掌控)";
    /// Counter-attacks conceded per match.
    pub const COUNTERS_CONCEDED: &str = "Counters_Conceded (被反擊/場)";
    /// Penalties per match.
    pub const PENALTIES: &str = "Penalties (判罰/場)";
    /// International matches, lifetime.
    pub const INTL_MATCHES: &str = "Intl_Matches (國際比賽場數)";
    /// Performance consistency.
    pub const CONSISTENCY: &str = "Consistency (表現一致性)";
    /// Pressure response.
    pub const PRESSURE_RESPONSE: &str = "Pressure_Response (壓力反應)";
    /// Match load tolerance.
    pub const MATCH_LOAD_TOLERANCE: &str = "Match_Load_Tolerance (比賽負荷承受)";
    /// Pre-match tactical observation.
    pub const PRE_MATCH_TACTIC: &str = "Pre_Match_Tactic (賽前戰術)";
    /// In-match tactical observation.
    pub const IN_MATCH_TACTIC: &str = "In_Match_Tactic (比賽中戰術)";
    /// Technical observation.
    pub const TECH_OBSERVATION: &str = "Tech_Observation (技術觀察)";
    /// Competition observation.
    pub const COMP_OBSERVATION: &str = "Comp_Observation (競賽觀察)";
    /// Training observation.
    pub const TRAIN_OBSERVATION: &str = "Train_Observation (訓練觀察)";
    /// Executive summary.
    pub const EXECUTIVE_SUMMARY: &str = "Executive_Summary (摘要)";
    /// Next actions.
    pub const NEXT_ACTIONS: &str = "Next_Actions (下階段行動)";

    /// Prefix of optional rubric item columns.
    pub const RUBRIC_PREFIX: &str = "Rubric: ";
}

/// Warning raised when attendance falls below the continuity threshold.
pub const CONTINUITY_WARNING: &str = "Training continuity below 75% - flagged automatically";

/// Technical & tactical execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TechnicalSection {
    /// Pre-match tactical planning observation.
    pub pre_match_tactic: String,
    /// In-match tactical execution observation.
    pub in_match_tactic: String,
    /// Match control and opponent-style adaptation observation.
    pub observation: String,
    /// Scoring effectiveness (%).
    pub scoring_effectiveness: Percentage,
    /// Match control rating.
    pub match_control: Rating,
    /// Counter-attacks conceded per match.
    pub counters_conceded: u32,
    /// Penalties received per match.
    pub penalties_received: u32,
}

impl Default for TechnicalSection {
    fn default() -> Self {
        Self {
            pre_match_tactic: String::new(),
            in_match_tactic: String::new(),
            observation: String::new(),
            scoring_effectiveness: Percentage::default(),
            match_control: Rating::default(),
            counters_conceded: 0,
            penalties_received: 0,
        }
    }
}

/// Competition behaviour & readiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompetitionSection {
    /// Coaching observation.
    pub observation: String,
    /// International matches competed, lifetime.
    pub intl_matches: u32,
    /// Performance consistency.
    pub consistency: Consistency,
    /// Pressure response.
    pub pressure_response: PressureResponse,
    /// Match load tolerance.
    pub load_tolerance: LoadTolerance,
}

/// Training continuity & engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingSection {
    /// Coaching observation.
    pub observation: String,
    /// Sessions required this period.
    pub sessions_required: u32,
    /// Sessions attended.
    pub sessions_attended: u32,
    /// Key sessions attended.
    pub key_sessions_attended: u32,
    /// Key sessions held.
    pub key_sessions_held: u32,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            observation: String::new(),
            sessions_required: 20,
            sessions_attended: 18,
            key_sessions_attended: 0,
            key_sessions_held: 0,
        }
    }
}

/// Status, summary and action plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarySection {
    /// Current role.
    pub athlete_status: AthleteStatus,
    /// One or two sentence overview.
    pub executive_summary: String,
    /// Actions for the next 4–8 weeks.
    pub next_actions: String,
}

/// Everything an evaluator enters for one assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentInput {
    /// Athlete name; the only required field.
    pub athlete_name: String,
    /// Evaluation date; today when absent.
    pub eval_date: Option<NaiveDate>,
    /// Age division.
    pub division: Division,
    /// Gender.
    pub gender: Gender,
    /// Weight class; the lightest class of the division when absent.
    pub weight_class: Option<String>,
    /// Context.
    pub context: Context,
    /// Evaluation type.
    pub eval_type: EvalType,
    /// Technical & tactical execution.
    pub technical: TechnicalSection,
    /// Competition behaviour & readiness.
    pub competition: CompetitionSection,
    /// Training continuity & engagement.
    pub training: TrainingSection,
    /// Selected risk flags.
    pub risk_flags: RiskFlags,
    /// Status and action plan.
    pub summary: SummarySection,
    /// Optional named rubric items, used by rubric scoring profiles.
    pub rubric: BTreeMap<String, Rating>,
}

impl AssessmentInput {
    /// Creates an input with defaults for everything but the name.
    pub fn new(athlete_name: impl Into<String>) -> Self {
        Self {
            athlete_name: athlete_name.into(),
            ..Default::default()
        }
    }

    /// Validates the input and resolves defaults.
    ///
    /// `today` is used when no evaluation date was given.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the athlete name is empty or blank, if
    /// the weight class is not offered for the division and gender, or if
    /// two rubric item names are equal once trimmed.
    pub fn validate(mut self, today: NaiveDate) -> Result<Assessment> {
        let athlete_name = self.athlete_name.trim().to_string();
        if athlete_name.is_empty() {
            return Err(Error::validation_field(
                "athlete_name",
                "Please enter athlete name",
            ));
        }

        let weight_class = match self.weight_class.as_deref() {
            Some(w) => resolve_weight_class(self.division, self.gender, w).ok_or_else(|| {
                Error::validation_field(
                    "weight_class",
                    format!(
                        "'{w}' is not a {} {} weight class",
                        self.division.key(),
                        self.gender.key()
                    ),
                )
            })?,
            None => weight_classes(self.division, self.gender)[0],
        };

        let mut rubric = BTreeMap::new();
        for (name, rating) in std::mem::take(&mut self.rubric) {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::validation_field("rubric", "rubric item names must not be empty"));
            }
            if rubric.insert(trimmed.to_string(), rating).is_some() {
                return Err(Error::validation_field(
                    "rubric",
                    format!("rubric item '{trimmed}' is given more than once"),
                ));
            }
        }
        self.rubric = rubric;

        let attendance_rate = ratio_percent(
            self.training.sessions_attended,
            self.training.sessions_required,
        );
        let key_session_rate = ratio_percent(
            self.training.key_sessions_attended,
            self.training.key_sessions_held,
        );

        Ok(Assessment {
            athlete_name,
            eval_date: self.eval_date.unwrap_or(today),
            weight_class,
            attendance_rate,
            key_session_rate,
            input: self,
        })
    }
}

/// A validated assessment with derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    input: AssessmentInput,
    athlete_name: String,
    eval_date: NaiveDate,
    weight_class: &'static str,
    attendance_rate: f64,
    key_session_rate: f64,
}

impl Assessment {
    /// The input this assessment was validated from.
    pub fn input(&self) -> &AssessmentInput {
        &self.input
    }

    /// Trimmed athlete name.
    pub fn athlete_name(&self) -> &str {
        &self.athlete_name
    }

    /// Resolved evaluation date.
    pub fn eval_date(&self) -> NaiveDate {
        self.eval_date
    }

    /// Resolved weight class.
    pub fn weight_class(&self) -> &'static str {
        self.weight_class
    }

    /// Attended / required sessions × 100; 0 when none were required.
    pub fn attendance_rate(&self) -> f64 {
        self.attendance_rate
    }

    /// Key sessions attended / held × 100; 0 when none were held.
    pub fn key_session_rate(&self) -> f64 {
        self.key_session_rate
    }

    /// Advisory warnings; they never block a submission.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.attendance_rate < ATTENDANCE_WARNING_THRESHOLD {
            warnings.push(CONTINUITY_WARNING.to_string());
        }
        warnings
    }

    /// The row written to the history table.
    pub fn to_record(&self) -> Record {
        let i = &self.input;
        let mut record = Record::new();
        record.push(columns::DATE, self.eval_date.format("%Y-%m-%d").to_string());
        record.push(columns::NAME, self.athlete_name.as_str());
        record.push(columns::DIVISION, i.division.label());
        record.push(columns::GENDER, i.gender.label());
        record.push(columns::WEIGHT, self.weight_class);
        record.push(columns::CONTEXT, i.context.label());
        record.push(columns::EVAL_TYPE, i.eval_type.label());
        record.push(columns::ATHLETE_STATUS, i.summary.athlete_status.label());
        record.push(columns::RISK_FLAGS, i.risk_flags.to_cell());
        record.push(columns::ATTENDANCE_RATE, format_rate(self.attendance_rate));
        record.push(columns::KEY_SESSION_RATE, format_rate(self.key_session_rate));
        record.push(
            columns::SCORING_EFFECTIVENESS,
            i.technical.scoring_effectiveness.to_string(),
        );
        record.push(columns::MATCH_CONTROL, i.technical.match_control.to_string());
        record.push(
            columns::COUNTERS_CONCEDED,
            i.technical.counters_conceded.to_string(),
        );
        record.push(columns::PENALTIES, i.technical.penalties_received.to_string());
        record.push(columns::INTL_MATCHES, i.competition.intl_matches.to_string());
        record.push(columns::CONSISTENCY, i.competition.consistency.label());
        record.push(
            columns::PRESSURE_RESPONSE,
            i.competition.pressure_response.label(),
        );
        record.push(
            columns::MATCH_LOAD_TOLERANCE,
            i.competition.load_tolerance.label(),
        );
        record.push(columns::PRE_MATCH_TACTIC, i.technical.pre_match_tactic.as_str());
        record.push(columns::IN_MATCH_TACTIC, i.technical.in_match_tactic.as_str());
        record.push(columns::TECH_OBSERVATION, i.technical.observation.as_str());
        record.push(columns::COMP_OBSERVATION, i.competition.observation.as_str());
        record.push(columns::TRAIN_OBSERVATION, i.training.observation.as_str());
        record.push(columns::EXECUTIVE_SUMMARY, i.summary.executive_summary.as_str());
        record.push(columns::NEXT_ACTIONS, i.summary.next_actions.as_str());
        for (name, rating) in &i.rubric {
            record.push(
                format!("{}{name}", columns::RUBRIC_PREFIX),
                rating.to_string(),
            );
        }
        record
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::risk::RiskFlag;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = AssessmentInput::default().validate(today()).unwrap_err();
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field.as_deref(), Some("athlete_name"));
        assert_eq!(message, "Please enter athlete name");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(AssessmentInput::new("   ").validate(today()).is_err());
    }

    #[test]
    fn test_defaults_resolved() {
        let a = AssessmentInput::new(" Lee Mei ").validate(today()).unwrap();
        assert_eq!(a.athlete_name(), "Lee Mei");
        assert_eq!(a.eval_date(), today());
        assert_eq!(a.weight_class(), "-54 kg");
        assert_eq!(a.attendance_rate(), 90.0);
        assert_eq!(a.key_session_rate(), 0.0);
        assert!(a.warnings().is_empty());
    }

    #[test]
    fn test_weight_class_must_match_division() {
        let input = AssessmentInput {
            division: Division::Cadet,
            gender: Gender::Female,
            weight_class: Some("-87 kg".to_string()),
            ..AssessmentInput::new("Tan")
        };
        let err = input.validate(today()).unwrap_err();
        assert!(err.to_string().contains("weight class"));
    }

    #[test]
    fn test_zero_sessions_required_gives_zero_rate() {
        let mut input = AssessmentInput::new("Tan");
        input.training.sessions_required = 0;
        input.training.sessions_attended = 4;
        let a = input.validate(today()).unwrap();
        assert_eq!(a.attendance_rate(), 0.0);
        assert_eq!(a.warnings(), vec![CONTINUITY_WARNING.to_string()]);
    }

    #[test]
    fn test_record_layout() {
        let mut input = AssessmentInput::new("Lee Mei");
        input.weight_class = Some("-63 kg".to_string());
        input.training.key_sessions_attended = 2;
        input.training.key_sessions_held = 3;
        input.risk_flags = RiskFlags::from_selection([RiskFlag::InjuryConcern]);
        let record = input.validate(today()).unwrap().to_record();

        assert_eq!(record.len(), 26);
        assert_eq!(record.columns().next(), Some(columns::DATE));
        assert_eq!(record.get(columns::DATE), Some("2026-03-14"));
        assert_eq!(record.get(columns::WEIGHT), Some("-63 kg"));
        assert_eq!(record.get(columns::DIVISION), Some("Senior (成人)"));
        assert_eq!(record.get(columns::ATTENDANCE_RATE), Some("90.0"));
        assert_eq!(record.get(columns::KEY_SESSION_RATE), Some("66.7"));
        assert_eq!(record.get(columns::SCORING_EFFECTIVENESS), Some("50"));
        assert_eq!(record.get(columns::MATCH_CONTROL), Some("3"));
        assert_eq!(
            record.get(columns::RISK_FLAGS),
            Some("Injury/Physical Concern (傷病/身體疑慮)")
        );
        assert_eq!(record.get(columns::NEXT_ACTIONS), Some(""));
    }

    #[test]
    fn test_rubric_items_become_columns() {
        let mut input = AssessmentInput::new("Lee Mei");
        input.rubric.insert("kicking".to_string(), Rating::new(4).unwrap());
        input.rubric.insert("footwork".to_string(), Rating::new(2).unwrap());
        let record = input.validate(today()).unwrap().to_record();
        assert_eq!(record.len(), 28);
        let tail: Vec<&str> = record.columns().skip(26).collect();
        assert_eq!(tail, vec!["Rubric: footwork", "Rubric: kicking"]);
    }

    #[test]
    fn test_rubric_names_are_trimmed() {
        let mut input = AssessmentInput::new("Lee Mei");
        input.rubric.insert(" footwork ".to_string(), Rating::new(4).unwrap());
        let a = input.validate(today()).unwrap();
        assert_eq!(a.input().rubric.keys().collect::<Vec<_>>(), vec!["footwork"]);
        assert_eq!(a.to_record().get("Rubric: footwork"), Some("4"));
    }

    #[test]
    fn test_rubric_names_colliding_after_trim_are_rejected() {
        let mut input = AssessmentInput::new("Lee Mei");
        input.rubric.insert("kicking".to_string(), Rating::new(2).unwrap());
        input.rubric.insert("kicking ".to_string(), Rating::new(5).unwrap());
        let err = input.validate(today()).unwrap_err();
        assert!(err.to_string().contains("'kicking' is given more than once"));
    }

    #[test]
    fn test_input_from_toml_sections() {
        let input: AssessmentInput = toml::from_str(
            r#"
            athlete_name = "Lee Mei"
            eval_date = "2026-02-01"
            division = "junior"
            gender = "female"
            weight_class = "-52 kg"
            risk_flags = ["limited_international_exposure"]

            [technical]
            scoring_effectiveness = 70
            match_control = 4

            [competition]
            consistency = "moderate"

            [training]
            sessions_required = 10
            sessions_attended = 7
            "#,
        )
        .unwrap();
        assert_eq!(input.technical.counters_conceded, 0);
        let a = input.validate(today()).unwrap();
        assert_eq!(a.eval_date(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(a.weight_class(), "-52 kg");
        assert_eq!(a.attendance_rate(), 70.0);
        assert_eq!(a.warnings().len(), 1);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<AssessmentInput>(r#"{"athlete": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_rating_rejected_at_parse() {
        let result = serde_json::from_str::<AssessmentInput>(
            r#"{"athlete_name": "x", "technical": {"match_control": 0}}"#,
        );
        assert!(result.is_err());
    }
}
