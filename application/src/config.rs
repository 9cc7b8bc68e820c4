//! Council configuration
//!
//! [`CouncilConfig`] is the value a running turn snapshots at start. The
//! live configuration is process-wide mutable state behind the
//! [`crate::ports::config_source::ConfigSource`] port; updates replace
//! the whole value atomically, and an in-progress turn keeps its own
//! `Arc` snapshot, immune to later replacement.

use council_domain::Model;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

/// Errors in configuration content or persistence
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("council_models cannot be empty")]
    EmptyCouncil,

    #[error("council_models lists {0} more than once")]
    DuplicateCouncilModel(Model),

    #[error("chairman_model {0} must be one of the council models")]
    ChairmanNotInCouncil(Model),

    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to persist configuration: {0}")]
    Persist(String),
}

/// Per-model reasoning parameter override
///
/// Some models use a different reasoning parameter name or value; the
/// override is injected verbatim into the completion payload. A `null`
/// value disables reasoning for that model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningOverride {
    pub param_name: String,
    pub value: serde_json::Value,
}

/// Immutable snapshot of the council configuration for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Models participating in Stages 1 and 2
    pub council: Vec<Model>,
    /// Council member that produces the Stage 3 synthesis
    pub chairman: Model,
    /// Default reasoning effort for models without an override
    pub default_reasoning_effort: Option<String>,
    /// Model-specific reasoning overrides
    #[serde(default)]
    pub reasoning_overrides: HashMap<Model, ReasoningOverride>,
    /// Per-call timeout supplied to the model invocation capability
    pub request_timeout_secs: u64,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        let mut reasoning_overrides = HashMap::new();
        reasoning_overrides.insert(
            Model::new("openai/gpt-5.2"),
            ReasoningOverride {
                param_name: "reasoning_effort".to_string(),
                value: serde_json::Value::String("xhigh".to_string()),
            },
        );

        Self {
            council: vec![
                Model::new("openai/gpt-5.2"),
                Model::new("google/gemini-3-pro-preview"),
                Model::new("anthropic/claude-opus-4.5"),
                Model::new("moonshotai/kimi-k2-thinking"),
            ],
            chairman: Model::new("openai/gpt-5.2"),
            default_reasoning_effort: Some("high".to_string()),
            reasoning_overrides,
            request_timeout_secs: 120,
        }
    }
}

impl CouncilConfig {
    /// Validate the configuration at turn start.
    ///
    /// Council membership must be a set: a duplicated entry would be
    /// dispatched twice and end up behind two labels, so it is rejected
    /// here rather than silently deduplicated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.council.is_empty() {
            return Err(ConfigError::EmptyCouncil);
        }
        let mut seen = HashSet::new();
        for model in &self.council {
            if !seen.insert(model) {
                return Err(ConfigError::DuplicateCouncilModel(model.clone()));
            }
        }
        if !self.council.contains(&self.chairman) {
            return Err(ConfigError::ChairmanNotInCouncil(self.chairman.clone()));
        }
        Ok(())
    }

    /// Reasoning parameters to send for a model, if any.
    ///
    /// A model-specific override wins; a `null` override value disables
    /// reasoning entirely. Otherwise the default effort applies.
    pub fn reasoning_for(&self, model: &Model) -> Option<ReasoningOverride> {
        if let Some(over) = self.reasoning_overrides.get(model) {
            if over.value.is_null() {
                return None;
            }
            return Some(over.clone());
        }
        self.default_reasoning_effort
            .as_ref()
            .map(|effort| ReasoningOverride {
                param_name: "reasoning_effort".to_string(),
                value: serde_json::Value::String(effort.clone()),
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Apply an update, producing the new configuration.
    ///
    /// The result still needs [`validate`](Self::validate) before it
    /// replaces the live value.
    pub fn apply(&self, update: ConfigUpdate) -> Self {
        Self {
            council: update.council.unwrap_or_else(|| self.council.clone()),
            chairman: update.chairman.unwrap_or_else(|| self.chairman.clone()),
            default_reasoning_effort: update
                .default_reasoning_effort
                .unwrap_or_else(|| self.default_reasoning_effort.clone()),
            reasoning_overrides: update
                .reasoning_overrides
                .unwrap_or_else(|| self.reasoning_overrides.clone()),
            request_timeout_secs: update
                .request_timeout_secs
                .unwrap_or(self.request_timeout_secs),
        }
    }
}

/// Partial configuration update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigUpdate {
    pub council: Option<Vec<Model>>,
    pub chairman: Option<Model>,
    /// `Some(None)` clears the default effort; `None` leaves it unchanged
    pub default_reasoning_effort: Option<Option<String>>,
    pub reasoning_overrides: Option<HashMap<Model, ReasoningOverride>>,
    pub request_timeout_secs: Option<u64>,
}
