//! Property-based tests for scoring.
