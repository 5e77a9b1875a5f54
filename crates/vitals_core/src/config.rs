use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::check::DEFAULT_TOLERANCE;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_USER_AGENT: &str = "vitals/0.1 (listing assessment checks)";

/// Listing page checked when the CLI is given no pages at all.
pub const DEFAULT_LISTING_PAGE: &str = "Wikipedia:Vital articles/Level/2";

/// Built-in set iterated by the `all` keyword.
pub const VITAL_LEVEL_PAGES: [&str; 5] = [
    "Wikipedia:Vital articles/Level/1",
    "Wikipedia:Vital articles/Level/2",
    "Wikipedia:Vital articles/Level/3",
    "Wikipedia:Vital articles/Level/4",
    "Wikipedia:Vital articles/Level/5",
];

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct VitalsConfig {
    #[serde(default)]
    pub wiki: WikiSection,
    #[serde(default)]
    pub check: CheckSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct WikiSection {
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CheckSection {
    pub tolerance: Option<f64>,
}

impl VitalsConfig {
    /// Resolve the API URL: env WIKI_API_URL > config > default.
    pub fn api_url(&self) -> String {
        if let Ok(value) = env::var("WIKI_API_URL") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.wiki
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolve the user agent: env WIKI_USER_AGENT > config > default.
    pub fn user_agent(&self) -> String {
        if let Ok(value) = env::var("WIKI_USER_AGENT") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.wiki
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn tolerance(&self) -> f64 {
        self.check.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }
}

/// Load a VitalsConfig from a TOML file. Returns default if the file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<VitalsConfig> {
    if !config_path.exists() {
        return Ok(VitalsConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: VitalsConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_uses_builtin_endpoint_and_tolerance() {
        let config = VitalsConfig::default();
        assert!(config.wiki.api_url.is_none());
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(config.tolerance(), DEFAULT_TOLERANCE);
    }

    #[test]
    fn load_config_returns_default_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/vitals.toml")).expect("load config");
        assert_eq!(config, VitalsConfig::default());
    }

    #[test]
    fn load_config_parses_wiki_and_check_sections() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("vitals.toml");
        fs::write(
            &config_path,
            r#"
[wiki]
api_url = "https://wiki.example.org/w/api.php"
user_agent = "test-agent/1.0"

[check]
tolerance = 0.5
"#,
        )
        .expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert_eq!(
            config.wiki.api_url.as_deref(),
            Some("https://wiki.example.org/w/api.php")
        );
        assert_eq!(config.wiki.user_agent.as_deref(), Some("test-agent/1.0"));
        assert_eq!(config.tolerance(), 0.5);
    }

    #[test]
    fn load_config_tolerates_partial_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("vitals.toml");
        fs::write(&config_path, "[check]\ntolerance = 0.4\n").expect("write config");

        let config = load_config(&config_path).expect("load config");
        assert!(config.wiki.api_url.is_none());
        assert_eq!(config.tolerance(), 0.4);
    }

    #[test]
    fn load_config_returns_error_for_invalid_toml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("vitals.toml");
        fs::write(&config_path, "[wiki\napi_url = \"oops\"").expect("write config");
        let error = load_config(&config_path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }
}
