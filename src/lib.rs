pub mod config;
pub mod context;
pub mod error;
pub mod escape;
pub mod exit_codes;
pub mod highlight;
pub mod link_patterns;
pub mod options;
pub mod utils;

mod block;
mod converter;
mod footnotes;
mod html_blocks;
mod links;
mod lists;
mod references;
mod spans;

pub use crate::context::ConversionContext;
pub use crate::converter::Markdown;
pub use crate::error::MarkdownError;
pub use crate::highlight::Highlighter;
#[cfg(feature = "syntect")]
pub use crate::highlight::SyntectHighlighter;
pub use crate::options::{ConvertOptions, Extra, LinkPatternRule, TagStyle, parse_extras};
pub use crate::references::normalize_footnote_id;
pub use crate::spans::encode_amps_and_angles;

use std::fs;
use std::path::Path;

/// Convert `text` in one call.
///
/// Builds a [`Markdown`] engine for `options`; reuse an engine directly
/// when converting many documents.
pub fn markdown(text: &str, options: &ConvertOptions) -> Result<String, MarkdownError> {
    let md = Markdown::new(options.clone())?;
    Ok(md.convert(text))
}

/// Read a UTF-8 file and convert it
pub fn markdown_path(path: &Path, options: &ConvertOptions) -> Result<String, MarkdownError> {
    let text = fs::read_to_string(path).map_err(|source| MarkdownError::Io {
        path: path.display().to_string(),
        source,
    })?;
    markdown(&text, options)
}
