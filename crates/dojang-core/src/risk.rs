//! Risk flags an evaluator may attach to an assessment.

use serde::{Deserialize, Serialize};

labelled_enum! {
    /// A fixed concern label.
    RiskFlag ("risk_flags") {
        /// Attendance or continuity problems.
        TrainingContinuity => ("training_continuity", "Training Continuity Issue (訓練連續性問題)"),
        /// Injury or physical concern.
        InjuryConcern => ("injury_concern", "Injury/Physical Concern (傷病/身體疑慮)"),
        /// Results vary widely between events.
        InconsistentPerformance => ("inconsistent_performance", "Inconsistent Performance (表現不穩定)"),
        /// Few international matches.
        LimitedInternationalExposure => ("limited_international_exposure", "Limited Int'l Exposure (缺乏國際經驗)"),
        /// Poor decisions under pressure.
        PressureDecisionMaking => ("pressure_decision_making", "Decision-Making Under Pressure (高壓決策能力)"),
        /// Struggles against some opponent styles.
        OpponentStyleAdaptation => ("opponent_style_adaptation", "Opponent-Style Adaptation (對手風格適應)"),
    }
}

/// The cell value written when no flag is selected.
pub const NO_RISK: &str = "None";

/// Selected risk flags, in selection order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RiskFlag>", into = "Vec<RiskFlag>")]
pub struct RiskFlags(Vec<RiskFlag>);

impl RiskFlags {
    /// Builds the set from a selection, keeping the first occurrence of
    /// each flag.
    pub fn from_selection<I>(selection: I) -> Self
    where
        I: IntoIterator<Item = RiskFlag>,
    {
        let mut flags = Vec::new();
        for flag in selection {
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }
        Self(flags)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `flag` is selected.
    pub fn contains(&self, flag: RiskFlag) -> bool {
        self.0.contains(&flag)
    }

    /// The selected flags.
    pub fn as_slice(&self) -> &[RiskFlag] {
        &self.0
    }

    /// Serialises the selection for the sheet: labels joined with `", "`,
    /// or `"None"` when empty.
    pub fn to_cell(&self) -> String {
        if self.0.is_empty() {
            return NO_RISK.to_string();
        }
        self.0
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Vec<RiskFlag>> for RiskFlags {
    fn from(flags: Vec<RiskFlag>) -> Self {
        Self::from_selection(flags)
    }
}

impl From<RiskFlags> for Vec<RiskFlag> {
    fn from(flags: RiskFlags) -> Self {
        flags.0
    }
}
