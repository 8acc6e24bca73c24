use crate::config::ConfigError;
use std::io;

/// Errors reported before any document is processed.
///
/// Malformed Markdown never produces one of these; it degrades to literal
/// text instead.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    #[error("Tab width must be greater than zero")]
    InvalidTabWidth,

    /// A link-pattern rule file line without a pattern/href separator
    #[error("{file}:{line}: invalid link pattern line: {content:?}")]
    InvalidLinkPattern { file: String, line: usize, content: String },

    #[error("Unsupported regex flag '{flag}' in link pattern {pattern}")]
    UnsupportedRegexFlag { flag: char, pattern: String },

    #[error("Invalid link pattern regex {pattern}: {source}")]
    Regex { pattern: String, source: fancy_regex::Error },

    #[error("Failed to read {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
