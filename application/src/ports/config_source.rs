//! Configuration source port
//!
//! The live council configuration is process-wide mutable state. A turn
//! reads one snapshot at start and holds it for its whole lifetime;
//! concurrent updates replace the live value atomically and are never
//! observed mid-turn.

use crate::config::{ConfigError, ConfigUpdate, CouncilConfig};
use std::sync::Arc;

/// Source of council configuration snapshots
pub trait ConfigSource: Send + Sync {
    /// The current configuration; called exactly once per turn start.
    fn snapshot(&self) -> Arc<CouncilConfig>;

    /// Validate and atomically apply an update, returning the new value.
    fn update(&self, update: ConfigUpdate) -> Result<Arc<CouncilConfig>, ConfigError>;
}
