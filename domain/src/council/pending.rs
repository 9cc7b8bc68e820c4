//! Pending set: models dispatched in a stage that have not yet reported

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// The set of dispatched models minus those that have reported
/// (success or failure).
///
/// Shrinks monotonically within a stage and is empty exactly when the
/// stage's completion event fires. Preserves council order for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSet {
    models: Vec<Model>,
}

impl PendingSet {
    /// Start tracking a stage's dispatched models
    pub fn start(models: impl IntoIterator<Item = Model>) -> Self {
        Self {
            models: models.into_iter().collect(),
        }
    }

    /// Mark a model as settled.
    ///
    /// Returns `false` if the model was not pending (already settled or
    /// never dispatched), which callers use for duplicate detection.
    pub fn settle(&mut self, model: &Model) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m != model);
        self.models.len() < before
    }

    /// Force-clear on stage completion
    pub fn clear(&mut self) {
        self.models.clear();
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.models.contains(model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Models still awaited, in dispatch order
    pub fn remaining(&self) -> &[Model] {
        &self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrinks_monotonically() {
        let mut pending = PendingSet::start([Model::new("m1"), Model::new("m2")]);
        assert_eq!(pending.len(), 2);
        assert!(pending.settle(&Model::new("m1")));
        assert_eq!(pending.len(), 1);
        assert!(pending.settle(&Model::new("m2")));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_duplicate_settle_is_detected() {
        let mut pending = PendingSet::start([Model::new("m1")]);
        assert!(pending.settle(&Model::new("m1")));
        assert!(!pending.settle(&Model::new("m1")));
    }

    #[test]
    fn test_unknown_model_not_pending() {
        let mut pending = PendingSet::start([Model::new("m1")]);
        assert!(!pending.settle(&Model::new("m2")));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_preserves_dispatch_order() {
        let mut pending =
            PendingSet::start([Model::new("m1"), Model::new("m2"), Model::new("m3")]);
        pending.settle(&Model::new("m2"));
        assert_eq!(
            pending.remaining(),
            &[Model::new("m1"), Model::new("m3")]
        );
    }
}
