//! Conversion options shared by the library, the config file and the CLI

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How empty elements (`<hr>`, `<br>`, `<img>`) are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagStyle {
    /// `<hr>`
    #[serde(alias = "html")]
    Html4,
    /// `<hr />`
    #[default]
    Xhtml,
}

impl TagStyle {
    /// Text that closes an empty element, starting right after its name or
    /// attributes
    pub fn empty_element_suffix(self) -> &'static str {
        match self {
            TagStyle::Html4 => ">",
            TagStyle::Xhtml => " />",
        }
    }
}

impl fmt::Display for TagStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagStyle::Html4 => write!(f, "html4"),
            TagStyle::Xhtml => write!(f, "xhtml"),
        }
    }
}

impl FromStr for TagStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html4" | "html" => Ok(TagStyle::Html4),
            "xhtml" => Ok(TagStyle::Xhtml),
            _ => Err(format!("Unknown tag style: {s}")),
        }
    }
}

/// Optional syntax extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extra {
    /// Underscores never delimit emphasis
    CodeFriendly,
    /// `[^id]` references and the trailing footnote list
    Footnotes,
    /// `:::lang` code blocks go through the highlighter
    CodeColor,
    /// Caller-supplied auto-link rules
    LinkPatterns,
}

impl Extra {
    pub const ALL: [Extra; 4] = [
        Extra::CodeFriendly,
        Extra::Footnotes,
        Extra::CodeColor,
        Extra::LinkPatterns,
    ];
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extra::CodeFriendly => write!(f, "code-friendly"),
            Extra::Footnotes => write!(f, "footnotes"),
            Extra::CodeColor => write!(f, "code-color"),
            Extra::LinkPatterns => write!(f, "link-patterns"),
        }
    }
}

impl FromStr for Extra {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "code-friendly" => Ok(Extra::CodeFriendly),
            "footnotes" => Ok(Extra::Footnotes),
            "code-color" => Ok(Extra::CodeColor),
            "link-patterns" => Ok(Extra::LinkPatterns),
            _ => Err(format!("Unknown extra: {s}")),
        }
    }
}

/// One auto-link rule: a pattern and the href template for its matches.
///
/// `pattern` is either `/regex/flags` or a literal string. `href` may refer
/// to capture groups as `\1` or `\g<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPatternRule {
    pub pattern: String,
    pub href: String,
}

impl LinkPatternRule {
    pub fn new(pattern: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            href: href.into(),
        }
    }
}

/// Everything that shapes one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConvertOptions {
    pub tag_style: TagStyle,
    pub tab_width: usize,
    pub safe_mode: bool,
    pub extras: BTreeSet<Extra>,
    pub link_patterns: Vec<LinkPatternRule>,
    /// Deepest blockquote/list-item recursion before bodies are treated as
    /// inline text
    pub max_nesting_depth: usize,
}

/// Extras switched on by [`ConvertOptions::with_standard_extras`]
pub const STANDARD_EXTRAS: [Extra; 2] = [Extra::Footnotes, Extra::CodeColor];

pub const DEFAULT_TAB_WIDTH: usize = 4;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tag_style: TagStyle::default(),
            tab_width: DEFAULT_TAB_WIDTH,
            safe_mode: false,
            extras: BTreeSet::new(),
            link_patterns: Vec::new(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ConvertOptions {
    pub fn with_tag_style(mut self, tag_style: TagStyle) -> Self {
        self.tag_style = tag_style;
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extras.insert(extra);
        self
    }

    /// Footnotes and code colouring, the usual set for documentation pages
    pub fn with_standard_extras(mut self) -> Self {
        self.extras.extend(STANDARD_EXTRAS);
        self
    }

    pub fn with_link_pattern(mut self, rule: LinkPatternRule) -> Self {
        self.link_patterns.push(rule);
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn has_extra(&self, extra: Extra) -> bool {
        self.extras.contains(&extra)
    }

    pub fn empty_element_suffix(&self) -> &'static str {
        self.tag_style.empty_element_suffix()
    }
}

/// Parse a list of extras such as `"footnotes,code-friendly"`.
///
/// Names may be separated by commas, semicolons, colons or spaces.
pub fn parse_extras(list: &str) -> Result<BTreeSet<Extra>, ConfigError> {
    list.split([',', ';', ':', ' '])
        .filter(|name| !name.is_empty())
        .map(|name| Extra::from_str(name).map_err(|_| ConfigError::UnknownExtra(name.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_names_round_trip() {
        for extra in Extra::ALL {
            assert_eq!(extra.to_string().parse::<Extra>(), Ok(extra));
        }
        assert_eq!("code_friendly".parse::<Extra>(), Ok(Extra::CodeFriendly));
        assert!("wiki-tables".parse::<Extra>().is_err());
    }

    #[test]
    fn test_parse_extras_separators() {
        let extras = parse_extras("footnotes, code-color;link-patterns:code-friendly").unwrap();
        assert_eq!(extras.len(), 4);
        assert!(parse_extras("").unwrap().is_empty());
        assert!(matches!(
            parse_extras("footnotes,bogus"),
            Err(ConfigError::UnknownExtra(name)) if name == "bogus"
        ));
    }

    #[test]
    fn test_standard_extras() {
        let options = ConvertOptions::default()
            .with_extra(Extra::CodeFriendly)
            .with_standard_extras();
        assert!(options.has_extra(Extra::Footnotes));
        assert!(options.has_extra(Extra::CodeColor));
        assert!(options.has_extra(Extra::CodeFriendly));
        assert!(!options.has_extra(Extra::LinkPatterns));
    }

    #[test]
    fn test_tag_style_suffix() {
        assert_eq!(TagStyle::Xhtml.empty_element_suffix(), " />");
        assert_eq!(TagStyle::Html4.empty_element_suffix(), ">");
        assert_eq!("HTML4".parse::<TagStyle>(), Ok(TagStyle::Html4));
    }

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.tab_width, 4);
        assert_eq!(options.tag_style, TagStyle::Xhtml);
        assert!(!options.safe_mode);
        assert!(options.extras.is_empty());
    }

    #[test]
    fn test_builder_helpers() {
        let options = ConvertOptions::default()
            .with_safe_mode(true)
            .with_extra(Extra::Footnotes)
            .with_tab_width(8);
        assert!(options.safe_mode);
        assert!(options.has_extra(Extra::Footnotes));
        assert!(!options.has_extra(Extra::CodeColor));
        assert_eq!(options.tab_width, 8);
    }
}
