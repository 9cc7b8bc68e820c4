//! Configuration file loader with multi-source merging

use council_application::config::{ConfigError, CouncilConfig};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `COUNCIL_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. XDG config: `$XDG_CONFIG_HOME/llm-council/config.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&Path>) -> Result<CouncilConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(CouncilConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("COUNCIL_"));

        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> CouncilConfig {
        CouncilConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("llm-council").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Model;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.council.len(), 4);
        assert!(config.council.contains(&config.chairman));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
council = ["openai/gpt-5.2", "anthropic/claude-opus-4.5"]
chairman = "anthropic/claude-opus-4.5"
request_timeout_secs = 60
"#
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.council.len(), 2);
        assert_eq!(config.chairman, Model::new("anthropic/claude-opus-4.5"));
        assert_eq!(config.request_timeout_secs, 60);
        // Unspecified fields keep their defaults
        assert_eq!(config.default_reasoning_effort.as_deref(), Some("high"));
    }

    #[test]
    fn test_missing_explicit_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.council, CouncilConfig::default().council);
    }
}
