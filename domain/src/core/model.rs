//! Model value object representing a council LLM backend

use serde::{Deserialize, Serialize};

/// An LLM model identifier (Value Object)
///
/// Council membership is expressed as a list of these identifiers in
/// OpenRouter form, e.g. `openai/gpt-5.2` or `anthropic/claude-opus-4.5`.
/// The identifier is opaque to the pipeline; only presentation-time
/// de-anonymization uses the short name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    /// Create a model from its identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The full identifier, including the provider prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without the provider prefix
    ///
    /// `openai/gpt-5.2` becomes `gpt-5.2`. Identifiers without a provider
    /// prefix are returned unchanged.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Model::new(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::new(s)
    }
}
