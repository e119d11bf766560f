//! The fixed field catalogue of the scorecard form.
//!
//! Every selectable field is a closed enum with a stable key and a bilingual
//! label. Weight classes depend on the age division and gender, so they are
//! looked up rather than enumerated.

use serde::Serialize;

use crate::assessment::AssessmentInput;
use crate::risk::RiskFlag;

labelled_enum! {
    /// Age division.
    Division ("division") {
        /// Adult competition.
        Senior => ("senior", "Senior (成人)"),
        /// Ages 15–17.
        Junior => ("junior", "Junior - Ages 15-17 (青少年)"),
        /// Ages 12–14.
        Cadet => ("cadet", "Cadet - Ages 12-14 (少年)"),
    }
}

labelled_enum! {
    /// Competition gender.
    Gender ("gender") {
        /// Male categories.
        Male => ("male", "Male (男)"),
        /// Female categories.
        Female => ("female", "Female (女)"),
    }
}

labelled_enum! {
    /// Setting the evaluation refers to.
    Context ("context") {
        /// Domestic events.
        Domestic => ("domestic", "Domestic (國內)"),
        /// International events.
        International => ("international", "International (國際)"),
        /// Training camp.
        TrainingCamp => ("training_camp", "Training Camp (移訓)"),
    }
}

labelled_enum! {
    /// Why the evaluation was made.
    EvalType ("eval_type") {
        /// Scheduled review.
        Regular => ("regular", "Regular (定期)"),
        /// Triggered by an event.
        EventBased => ("event_based", "Event-based (事件導向)"),
        /// End of a boot camp.
        BootCamp => ("boot_camp", "Boot camp (移訓營)"),
    }
}

labelled_enum! {
    /// Consistency of performance across matches.
    Consistency ("consistency") {
        /// Stable.
        High => ("high", "High (穩定)"),
        /// Moderate.
        Moderate => ("moderate", "Moderate (中等)"),
        /// Unstable.
        Low => ("low", "Low (不穩定)"),
    }
}

labelled_enum! {
    /// Reaction under pressure.
    PressureResponse ("pressure_response") {
        /// Positive.
        Positive => ("positive", "Positive (積極)"),
        /// Neutral.
        Neutral => ("neutral", "Neutral (中立)"),
        /// Negative.
        Negative => ("negative", "Negative (消極)"),
    }
}

labelled_enum! {
    /// Tolerance of match load.
    LoadTolerance ("load_tolerance") {
        /// High.
        High => ("high", "High (高)"),
        /// Moderate.
        Moderate => ("moderate", "Moderate (中等)"),
        /// Low.
        Low => ("low", "Low (低)"),
    }
}

labelled_enum! {
    /// Current role of the athlete in the squad.
    AthleteStatus ("athlete_status") {
        /// Ready for selection now.
        ReadyNow => ("ready_now", "Ready Now (即戰力)"),
        /// Being developed.
        Developing => ("developing", "Developing (培養中)"),
        /// Long-term prospect.
        LongTerm => ("long_term", "Long-term (長期發展)"),
        /// Needs re-assessment.
        Reassess => ("reassess", "Re-assess (需重新評估)"),
    }
}

const SENIOR_MALE: &[&str] = &[
    "-54 kg", "-58 kg", "-63 kg", "-68 kg", "-74 kg", "-80 kg", "-87 kg", "+87 kg",
];
const SENIOR_FEMALE: &[&str] = &[
    "-46 kg", "-49 kg", "-53 kg", "-57 kg", "-62 kg", "-67 kg", "-73 kg", "+73 kg",
];
const JUNIOR_MALE: &[&str] = &[
    "-45 kg", "-48 kg", "-51 kg", "-55 kg", "-59 kg", "-63 kg", "-68 kg", "-73 kg", "-78 kg",
    "+78 kg",
];
const JUNIOR_FEMALE: &[&str] = &[
    "-42 kg", "-44 kg", "-46 kg", "-49 kg", "-52 kg", "-55 kg", "-59 kg", "-63 kg", "-68 kg",
    "+68 kg",
];
const CADET_MALE: &[&str] = &[
    "-33 kg", "-37 kg", "-41 kg", "-45 kg", "-49 kg", "-53 kg", "-57 kg", "-61 kg", "-65 kg",
    "+65 kg",
];
const CADET_FEMALE: &[&str] = &[
    "-29 kg", "-33 kg", "-37 kg", "-41 kg", "-44 kg", "-47 kg", "-51 kg", "-55 kg", "-59 kg",
    "+59 kg",
];

/// Weight classes offered for a division and gender, lightest first.
pub fn weight_classes(division: Division, gender: Gender) -> &'static [&'static str] {
    match (division, gender) {
        (Division::Senior, Gender::Male) => SENIOR_MALE,
        (Division::Senior, Gender::Female) => SENIOR_FEMALE,
        (Division::Junior, Gender::Male) => JUNIOR_MALE,
        (Division::Junior, Gender::Female) => JUNIOR_FEMALE,
        (Division::Cadet, Gender::Male) => CADET_MALE,
        (Division::Cadet, Gender::Female) => CADET_FEMALE,
    }
}

/// Returns the catalogue spelling of `weight` if it is offered for the
/// division and gender. Matching ignores surrounding and inner whitespace,
/// so `"-58kg"` resolves to `"-58 kg"`.
pub fn resolve_weight_class(
    division: Division,
    gender: Gender,
    weight: &str,
) -> Option<&'static str> {
    let wanted: String = weight.chars().filter(|c| !c.is_whitespace()).collect();
    weight_classes(division, gender)
        .iter()
        .copied()
        .find(|w| w.chars().filter(|c| !c.is_whitespace()).eq(wanted.chars()))
}

/// A selectable option as shown to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    /// Stable machine key.
    pub key: &'static str,
    /// Bilingual label.
    pub label: &'static str,
}

/// Weight classes of one division, per gender.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionEntry {
    /// Division key.
    pub key: &'static str,
    /// Division label.
    pub label: &'static str,
    /// Male weight classes.
    pub male: &'static [&'static str],
    /// Female weight classes.
    pub female: &'static [&'static str],
}

/// The complete field catalogue, as served to form clients.
#[derive(Debug, Clone, Serialize)]
pub struct FormCatalogue {
    /// Age divisions with their weight classes.
    pub divisions: Vec<DivisionEntry>,
    /// Genders.
    pub genders: Vec<OptionEntry>,
    /// Evaluation contexts.
    pub contexts: Vec<OptionEntry>,
    /// Evaluation types.
    pub eval_types: Vec<OptionEntry>,
    /// Performance consistency levels.
    pub consistency: Vec<OptionEntry>,
    /// Pressure response levels.
    pub pressure_response: Vec<OptionEntry>,
    /// Match load tolerance levels.
    pub load_tolerance: Vec<OptionEntry>,
    /// Athlete status options.
    pub athlete_status: Vec<OptionEntry>,
    /// Risk flags.
    pub risk_flags: Vec<OptionEntry>,
    /// Default values of a fresh form.
    pub defaults: AssessmentInput,
}

impl FormCatalogue {
    /// Builds the catalogue.
    pub fn new() -> Self {
        Self {
            divisions: Division::ALL
                .iter()
                .map(|d| DivisionEntry {
                    key: d.key(),
                    label: d.label(),
                    male: weight_classes(*d, Gender::Male),
                    female: weight_classes(*d, Gender::Female),
                })
                .collect(),
            genders: Gender::options(),
            contexts: Context::options(),
            eval_types: EvalType::options(),
            consistency: Consistency::options(),
            pressure_response: PressureResponse::options(),
            load_tolerance: LoadTolerance::options(),
            athlete_status: AthleteStatus::options(),
            risk_flags: RiskFlag::options(),
            defaults: AssessmentInput::default(),
        }
    }
}

impl Default for FormCatalogue {
    fn default() -> Self {
        Self::new()
    }
}
