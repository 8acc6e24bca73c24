//!
//! Configuration file support for mdpress.
//!
//! A config file is TOML with kebab-case keys. It is either named on the
//! command line or discovered by walking up from the current directory.
//! Values from the file form the base options; CLI flags are applied on
//! top by the binary.

use crate::error::MarkdownError;
use crate::link_patterns::load_link_patterns_file;
use crate::options::{ConvertOptions, Extra, LinkPatternRule, TagStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File names looked for in each directory, in order of precedence
pub const CONFIG_FILES: &[&str] = &[".mdpress.toml", "mdpress.toml"];

/// Prevents unbounded traversal on unusual filesystems
const MAX_DEPTH: usize = 100;

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Unknown extra '{0}' (expected one of code-friendly, footnotes, code-color, link-patterns)")]
    UnknownExtra(String),
}

/// The contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub tag_style: Option<TagStyle>,
    pub tab_width: Option<usize>,
    pub safe_mode: Option<bool>,
    /// Extra names, validated when the config is applied
    pub extras: Vec<String>,
    /// Rule file; relative paths are resolved against the config file's
    /// directory when loaded from disk
    pub link_patterns_file: Option<PathBuf>,
    pub max_nesting_depth: Option<usize>,
    pub link_patterns: Vec<LinkPatternRule>,
}

/// A config together with the file it came from, if any
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.display().to_string(),
        })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(file) = &config.link_patterns_file
            && file.is_relative()
            && let Some(dir) = path.parent()
        {
            config.link_patterns_file = Some(dir.join(file));
        }
        Ok(config)
    }

    /// Load the named file, or discover one unless `no_config` is set.
    ///
    /// No file found is not an error and yields an empty config.
    pub fn load(config_path: Option<&Path>, no_config: bool) -> Result<LoadedConfig, ConfigError> {
        let path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None if no_config => None,
            None => discover_config_upward(),
        };

        match path {
            Some(path) => {
                log::debug!("[mdpress-config] Loading config from {}", path.display());
                Ok(LoadedConfig {
                    config: Self::load_from_path(&path)?,
                    path: Some(path),
                })
            }
            None => Ok(LoadedConfig::default()),
        }
    }

    /// Overlay this config on `options`.
    ///
    /// Extras are added to those already set. Link-pattern rules, inline or
    /// from the rule file, are appended and switch on the `link-patterns`
    /// extra.
    pub fn apply_to(&self, mut options: ConvertOptions) -> Result<ConvertOptions, MarkdownError> {
        if let Some(tag_style) = self.tag_style {
            options.tag_style = tag_style;
        }
        if let Some(tab_width) = self.tab_width {
            options.tab_width = tab_width;
        }
        if let Some(safe_mode) = self.safe_mode {
            options.safe_mode = safe_mode;
        }
        if let Some(depth) = self.max_nesting_depth {
            options.max_nesting_depth = depth;
        }
        for name in &self.extras {
            let extra = Extra::from_str(name).map_err(|_| ConfigError::UnknownExtra(name.clone()))?;
            options.extras.insert(extra);
        }

        let mut rules = self.link_patterns.clone();
        if let Some(file) = &self.link_patterns_file {
            rules.extend(load_link_patterns_file(file)?);
        }
        if !rules.is_empty() {
            options.extras.insert(Extra::LinkPatterns);
            options.link_patterns.extend(rules);
        }
        Ok(options)
    }
}

/// First config file found walking up from the current directory
pub fn discover_config_upward() -> Option<PathBuf> {
    match std::env::current_dir() {
        Ok(dir) => discover_config_from(&dir),
        Err(e) => {
            log::debug!("[mdpress-config] Failed to get current directory: {e}");
            None
        }
    }
}

/// First config file found in `start_dir` or its ancestors.
///
/// The search stops at a directory containing `.git`, after checking it.
pub fn discover_config_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();

    for _ in 0..MAX_DEPTH {
        log::debug!("[mdpress-config] Searching for config in: {}", current_dir.display());
        for name in CONFIG_FILES {
            let candidate = current_dir.join(name);
            if candidate.is_file() {
                log::debug!("[mdpress-config] Found config file: {}", candidate.display());
                return Some(candidate);
            }
        }

        if current_dir.join(".git").exists() {
            log::debug!("[mdpress-config] Stopping at .git directory");
            return None;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                log::debug!("[mdpress-config] Reached filesystem root");
                return None;
            }
        }
    }

    log::debug!("[mdpress-config] Maximum traversal depth reached");
    None
}
