//! Leaderboard aggregation of parsed peer rankings
//!
//! The leaderboard is a pure function of the set of successfully parsed
//! Stage 2 critiques: recomputing from the same critiques always yields
//! the same result.

use crate::core::model::Model;
use crate::council::anonymizer::LabelMap;
use crate::council::answer::Stage2Critique;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One leaderboard row: a model's average peer-assigned rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    /// The model being ranked
    pub model: Model,
    /// Mean of the 1-based positions at which the model's label appears,
    /// over the critiques that include it (lower is better)
    pub average_rank: f64,
    /// Number of critiques that include the model
    pub rankings_count: usize,
}

/// Compute the leaderboard from all Stage 2 critiques.
///
/// Only parsed critiques contribute; labels not in `label_map` are
/// ignored. Models absent from every parsed ranking are excluded rather
/// than scored as worst. Sorted ascending by average rank; ties break by
/// vote count descending, then model identifier ascending, so the order
/// is fully deterministic.
pub fn aggregate_rankings(
    critiques: &[Stage2Critique],
    label_map: &LabelMap,
) -> Vec<AggregateEntry> {
    // (position sum, vote count) per model
    let mut tallies: BTreeMap<Model, (usize, usize)> = BTreeMap::new();

    for critique in critiques.iter().filter(|c| c.is_parsed()) {
        for (position, label) in critique.parsed_ranking.iter().enumerate() {
            if let Some(model) = label_map.model_for(label) {
                let tally = tallies.entry(model.clone()).or_insert((0, 0));
                tally.0 += position + 1;
                tally.1 += 1;
            }
        }
    }

    let mut entries: Vec<AggregateEntry> = tallies
        .into_iter()
        .map(|(model, (sum, count))| AggregateEntry {
            model,
            average_rank: sum as f64 / count as f64,
            rankings_count: count,
        })
        .collect();

    entries.sort_by(|a, b| {
        a.average_rank
            .total_cmp(&b.average_rank)
            .then(b.rankings_count.cmp(&a.rankings_count))
            .then(a.model.cmp(&b.model))
    });

    entries
}
