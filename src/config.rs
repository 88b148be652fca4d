use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use anyhow::Result;
use std::fs;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub fragments: FragmentConfig,
    #[serde(default)]
    pub hotkeys: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_dockutil_path")]
    pub dockutil_path: String,
    #[serde(default = "default_dock_process")]
    pub dock_process: String,
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_dockutil_path() -> String { "/usr/local/bin/dockutil".to_string() }
fn default_dock_process() -> String { "Dock".to_string() }
fn default_shell() -> String { "/bin/sh".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dockutil_path: default_dockutil_path(),
            dock_process: default_dock_process(),
            shell: default_shell(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    #[default]
    Skip,
    Fail,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ParserConfig {
    #[serde(default)]
    pub malformed_lines: MalformedLinePolicy,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FragmentConfig {
    #[serde(default = "default_true")]
    pub escape_single_quotes: bool,
}

fn default_true() -> bool { true }

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            escape_single_quotes: true,
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dockpreset", "dockpreset")
}

pub fn load_config() -> Result<Config> {
    let config_path = if let Some(dirs) = project_dirs() {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    };
    load_config_from(&config_path)
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        log::debug!("No config at {:?}, using defaults", config_path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.general.dock_process, "Dock");
        assert_eq!(config.parser.malformed_lines, MalformedLinePolicy::Skip);
        assert!(config.fragments.escape_single_quotes);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[general]
dockutil_path = "/opt/homebrew/bin/dockutil"

[parser]
malformed_lines = "fail"

[hotkeys]
"cmd+alt+1" = "preset-1"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.general.dockutil_path, "/opt/homebrew/bin/dockutil");
        assert_eq!(config.general.shell, "/bin/sh");
        assert_eq!(config.parser.malformed_lines, MalformedLinePolicy::Fail);
        assert_eq!(config.hotkeys.get("cmd+alt+1").map(String::as_str), Some("preset-1"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser\nmalformed_lines = 3").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
