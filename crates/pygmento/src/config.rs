use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "pygmento.yaml";

pub const STYLE_ENV: &str = "PYGMENTO_STYLE";
pub const CSS_CLASS_ENV: &str = "PYGMENTO_CSS_CLASS";

/// Highlighting configuration from pygmento.yaml
///
/// Read once at startup and used to build the single shared formatter.
/// Every highlighted fragment and the emitted style sheet use these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PygmentoConfig {
    /// Visual style (a syntect theme name, or "default")
    #[serde(default = "default_style")]
    pub style: String,
    /// Class of the container wrapping every highlighted fragment
    #[serde(default = "default_css_class")]
    pub css_class: String,
}

impl Default for PygmentoConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            css_class: default_css_class(),
        }
    }
}

fn default_style() -> String {
    "default".to_string()
}

fn default_css_class() -> String {
    "highlight".to_string()
}

impl PygmentoConfig {
    /// Override values from PYGMENTO_STYLE / PYGMENTO_CSS_CLASS when set
    pub fn apply_env(&mut self) {
        if let Some(style) = non_empty_var(STYLE_ENV) {
            self.style = style;
        }
        if let Some(css_class) = non_empty_var(CSS_CLASS_ENV) {
            self.css_class = css_class;
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Load the configuration.
///
/// An explicit path must exist. Without one, `pygmento.yaml` in the working
/// directory is used when present, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PygmentoConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                read_config(path)
            } else {
                Ok(PygmentoConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<PygmentoConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    // An empty file is a valid config with every value defaulted
    if content.trim().is_empty() {
        return Ok(PygmentoConfig::default());
    }

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PygmentoConfig::default();
        assert_eq!(config.style, "default");
        assert_eq!(config.css_class, "highlight");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: PygmentoConfig = serde_yaml::from_str("style: base16-ocean.dark").unwrap();
        assert_eq!(config.style, "base16-ocean.dark");
        assert_eq!(config.css_class, "highlight");
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "style: InspiredGitHub\ncss_class: code-block\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.style, "InspiredGitHub");
        assert_eq!(config.css_class, "code-block");
    }

    #[test]
    fn test_load_config_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), PygmentoConfig::default());
    }

    #[test]
    fn test_load_config_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "style: [unclosed").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
