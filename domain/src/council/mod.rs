//! Council pipeline logic
//!
//! Pure types and functions for the three-stage council flow:
//!
//! - [`answer`] - immutable per-model stage results
//! - [`anonymizer`] - label assignment and de-anonymization
//! - [`ranking`] - lenient extraction of ranked labels from critique text
//! - [`aggregate`] - leaderboard computation from parsed rankings
//! - [`pending`] - tracking of models that have not yet reported

pub mod aggregate;
pub mod anonymizer;
pub mod answer;
pub mod pending;
pub mod ranking;
