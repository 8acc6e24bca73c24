//! The conversion engine
//!
//! [`Markdown`] holds everything that is fixed for a set of options: the
//! options themselves, the tab-width-dependent patterns, compiled link
//! patterns and the highlighter. Per-document state lives in a
//! [`ConversionContext`], so one engine can convert many documents, from
//! several threads at once.

use crate::block::{WS_ONLY_LINE, code_block_pattern};
use crate::context::ConversionContext;
use crate::error::MarkdownError;
use crate::escape::{self, SENTINEL, html_removed_marker};
use crate::highlight::Highlighter;
use crate::html_blocks::{hr_tag_pattern, html_comment_pattern};
use crate::link_patterns::{CompiledLinkPattern, compile_link_patterns};
use crate::links::{INLINE_LINK_TAIL, REFERENCE_LINK_TAIL};
use crate::options::{ConvertOptions, Extra};
use crate::references::{footnote_def_pattern, link_def_pattern};
use crate::utils::detab;
use fancy_regex::Regex as FancyRegex;
use std::fmt;

/// Patterns compiled per engine: those whose shape depends on the tab
/// width, and the link tails, which need fancy-regex backreferences
#[derive(Debug)]
pub(crate) struct Patterns {
    pub(crate) hr_tag: FancyRegex,
    pub(crate) html_comment: FancyRegex,
    pub(crate) link_def: FancyRegex,
    pub(crate) footnote_def: FancyRegex,
    pub(crate) code_block: FancyRegex,
    pub(crate) inline_link_tail: FancyRegex,
    pub(crate) reference_link_tail: FancyRegex,
}

impl Patterns {
    fn new(tab_width: usize) -> Result<Self, MarkdownError> {
        let compile = |pattern: String| {
            FancyRegex::new(&pattern).map_err(|source| MarkdownError::Regex { pattern, source })
        };
        Ok(Self {
            hr_tag: compile(hr_tag_pattern(tab_width))?,
            html_comment: compile(html_comment_pattern(tab_width))?,
            link_def: compile(link_def_pattern(tab_width))?,
            footnote_def: compile(footnote_def_pattern(tab_width))?,
            code_block: compile(code_block_pattern(tab_width))?,
            inline_link_tail: compile(INLINE_LINK_TAIL.to_string())?,
            reference_link_tail: compile(REFERENCE_LINK_TAIL.to_string())?,
        })
    }
}

/// A configured Markdown to HTML converter.
///
/// ```
/// use mdpress_lib::{ConvertOptions, Markdown};
///
/// let md = Markdown::new(ConvertOptions::default()).unwrap();
/// assert_eq!(md.convert("*boo!*"), "<p><em>boo!</em></p>\n");
/// ```
pub struct Markdown {
    pub(crate) options: ConvertOptions,
    pub(crate) patterns: Patterns,
    pub(crate) link_patterns: Vec<CompiledLinkPattern>,
    pub(crate) highlighter: Option<Box<dyn Highlighter>>,
}

impl fmt::Debug for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("options", &self.options)
            .field("link_patterns", &self.link_patterns.len())
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl Markdown {
    /// Validate `options` and compile every pattern up front.
    ///
    /// With the `code-color` extra and the `syntect` feature, a
    /// [`SyntectHighlighter`](crate::highlight::SyntectHighlighter) is
    /// installed.
    pub fn new(options: ConvertOptions) -> Result<Self, MarkdownError> {
        if options.tab_width == 0 {
            return Err(MarkdownError::InvalidTabWidth);
        }
        let patterns = Patterns::new(options.tab_width)?;
        let link_patterns = compile_link_patterns(&options.link_patterns)?;
        if !link_patterns.is_empty() && !options.has_extra(Extra::LinkPatterns) {
            log::debug!("{} link pattern(s) configured but the link-patterns extra is off", link_patterns.len());
        }

        #[cfg(feature = "syntect")]
        let highlighter: Option<Box<dyn Highlighter>> = options
            .has_extra(Extra::CodeColor)
            .then(|| Box::new(crate::highlight::SyntectHighlighter::new()) as Box<dyn Highlighter>);
        #[cfg(not(feature = "syntect"))]
        let highlighter: Option<Box<dyn Highlighter>> = None;

        Ok(Self {
            options,
            patterns,
            link_patterns,
            highlighter,
        })
    }

    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Drop the highlighter; `:::lang` blocks then render as plain code
    pub fn without_highlighter(mut self) -> Self {
        self.highlighter = None;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one document into a newline-terminated HTML fragment
    pub fn convert(&self, text: &str) -> String {
        let mut ctx = ConversionContext::new();
        self.convert_with(&mut ctx, text)
    }

    /// Convert using caller-provided state, e.g. a seeded context for
    /// reproducible email obfuscation
    pub fn convert_with(&self, ctx: &mut ConversionContext, text: &str) -> String {
        let mut text = self.normalize(text);

        text = self.hash_html_blocks(ctx, &text);
        if self.options.has_extra(Extra::Footnotes) {
            text = self.strip_footnote_definitions(ctx, &text);
        }
        text = self.strip_link_definitions(ctx, &text);

        text = self.run_block_gamut(ctx, &text);

        if self.options.has_extra(Extra::Footnotes) {
            text = self.add_footnotes(ctx, &text);
        }

        text = self.restore_html_keys(ctx, &text);
        text = escape::restore(&text);
        text.push('\n');
        text
    }

    fn normalize(&self, text: &str) -> String {
        let text: String = text.chars().filter(|&c| c != SENTINEL).collect();
        let mut text = text.replace("\r\n", "\n").replace('\r', "\n");
        text.push_str("\n\n");
        let text = detab(&text, self.options.tab_width);
        WS_ONLY_LINE.replace_all(&text, "").into_owned()
    }

    /// Put stored HTML back wherever a key survived into the output.
    ///
    /// Stored blocks may embed further keys, so this repeats until a pass
    /// changes nothing.
    pub(crate) fn restore_html_keys(&self, ctx: &ConversionContext, text: &str) -> String {
        let mut text = text.to_string();
        for _ in 0..=ctx.html_blocks.len() {
            if !text.contains(SENTINEL) {
                break;
            }
            let mut changed = false;
            for (key, block) in &ctx.html_blocks {
                if !text.contains(key.as_str()) {
                    continue;
                }
                let replacement = if block.raw && self.options.safe_mode {
                    html_removed_marker()
                } else {
                    block.text.as_str()
                };
                text = text.replace(key.as_str(), replacement);
                changed = true;
            }
            if !changed {
                break;
            }
        }
        text
    }
}
