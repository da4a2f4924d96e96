pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LintError, Result};

pub use types::{AggregationLimits, LintConfig, NamingLimits, SecurityRules};

const CONFIG_FILE_NAME: &str = ".manifestlint.toml";

/// Get the global config file path (~/.manifestlint.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.manifestlint.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults.
/// Checks local config first, then global config.
///
/// A config file that exists but does not parse is an error rather than a
/// silent fallback to defaults.
pub fn load_config(project_path: Option<&Path>) -> Result<LintConfig> {
    if let Some(path) = project_path {
        let local = local_config_path(path);
        if local.exists() {
            log::debug!("Loading config from {}", local.display());
            return load_config_file(&local);
        }
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            log::debug!("Loading config from {}", global.display());
            return load_config_file(&global);
        }
    }

    Ok(LintConfig::default())
}

/// Parse a specific TOML config file.
pub fn load_config_file(path: &Path) -> Result<LintConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML config text.
pub fn parse_config(content: &str) -> Result<LintConfig> {
    let config: LintConfig =
        toml::from_str(content).map_err(|e| LintError::Config(e.to_string()))?;

    for code in config
        .ignored_rules
        .iter()
        .chain(config.severity_overrides.keys())
        .filter(|code| crate::rules::get_rule(code).is_none())
    {
        log::warn!("Config references unknown rule code {}", code);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use tempfile::TempDir;

    #[test]
    fn test_local_config_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(
            local_config_path(dir.path()),
            "failure-threshold = \"warning\"\n\n[severity-overrides]\nDF2002 = \"error\"\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.failure_threshold, Severity::Warning);
        assert_eq!(
            config.effective_severity("DF2002", Severity::Warning),
            Severity::Error
        );
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(local_config_path(dir.path()), "strict = \"maybe\"\n").unwrap();

        let err = load_config(Some(dir.path())).unwrap_err();
        assert!(matches!(err, LintError::Config(_)));
    }

    #[test]
    fn test_unknown_severity_rejected() {
        assert!(parse_config("failure-threshold = \"fatal\"\n").is_err());
    }
}
