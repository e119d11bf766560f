#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Dojang Core Library
//!
//! Core types for collecting, scoring and charting athlete assessments.

#[macro_use]
mod macros;

pub mod assessment;
pub mod catalogue;
pub mod chart;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod risk;
pub mod scoring;
pub mod table;

// Re-exports for convenience
pub use assessment::{Assessment, AssessmentInput};
pub use catalogue::{
    AthleteStatus, Consistency, Context, Division, EvalType, FormCatalogue, Gender,
    LoadTolerance, PressureResponse,
};
pub use chart::RadarChart;
pub use error::{Error, Result};
pub use ids::SubmissionId;
pub use metrics::{Percentage, Rating};
pub use risk::{RiskFlag, RiskFlags};
pub use scoring::{DerivedScore, Formula, ScoringProfile, Scores};
pub use table::{Record, Revision, SchemaDrift, Table};
