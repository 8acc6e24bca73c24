//! Syntax colouring for `:::lang` code blocks

/// Turns a code block into ready-to-embed HTML.
///
/// Returning `None` (unknown language, rendering failure) makes the
/// converter fall back to a plain escaped `<pre><code>` block.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> Option<String>;
}

#[cfg(feature = "syntect")]
pub use self::syntect_backend::SyntectHighlighter;

#[cfg(feature = "syntect")]
mod syntect_backend {
    use super::Highlighter;
    use syntect::easy::HighlightLines;
    use syntect::highlighting::{Theme, ThemeSet};
    use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
    use syntect::parsing::SyntaxSet;
    use syntect::util::LinesWithEndings;

    const DEFAULT_THEMES: [&str; 3] = ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"];

    /// [`Highlighter`] backed by syntect's bundled grammars and themes,
    /// emitting inline styles inside `<div class="codehilite">`
    pub struct SyntectHighlighter {
        syntax_set: SyntaxSet,
        theme: Option<Theme>,
    }

    impl Default for SyntectHighlighter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SyntectHighlighter {
        pub fn new() -> Self {
            let mut theme_set = ThemeSet::load_defaults();
            let theme = DEFAULT_THEMES
                .iter()
                .find_map(|name| theme_set.themes.remove(*name))
                .or_else(|| theme_set.themes.into_values().next());
            Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
            }
        }

        /// Use one of syntect's bundled themes by name
        pub fn with_theme(name: &str) -> Option<Self> {
            let mut theme_set = ThemeSet::load_defaults();
            let theme = theme_set.themes.remove(name)?;
            Some(Self {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme: Some(theme),
            })
        }
    }

    impl Highlighter for SyntectHighlighter {
        fn highlight(&self, code: &str, language: &str) -> Option<String> {
            let theme = self.theme.as_ref()?;
            let Some(syntax) = self.syntax_set.find_syntax_by_token(language) else {
                log::debug!("No syntax for code block language {language:?}");
                return None;
            };

            let mut highlighter = HighlightLines::new(syntax, theme);
            let mut body = String::with_capacity(code.len() * 2);
            for line in LinesWithEndings::from(code) {
                let ranges = highlighter.highlight_line(line, &self.syntax_set).ok()?;
                body.push_str(&styled_line_to_highlighted_html(&ranges, IncludeBackground::No).ok()?);
            }

            Some(format!(
                "<div class=\"codehilite\"><pre><code>{}\n</code></pre></div>",
                body.trim_end_matches('\n')
            ))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_known_language_is_wrapped() {
            let highlighter = SyntectHighlighter::new();
            let html = highlighter.highlight("fn main() {}\n", "rust").unwrap();
            assert!(html.starts_with("<div class=\"codehilite\"><pre><code>"));
            assert!(html.ends_with("</code></pre></div>"));
            assert!(html.contains("<span"));
            assert!(html.contains("main"));
        }

        #[test]
        fn test_unknown_language_declines() {
            let highlighter = SyntectHighlighter::new();
            assert!(highlighter.highlight("x", "no-such-language-here").is_none());
        }

        #[test]
        fn test_named_theme() {
            assert!(SyntectHighlighter::with_theme("base16-ocean.dark").is_some());
            assert!(SyntectHighlighter::with_theme("no-such-theme").is_none());
        }

        #[test]
        fn test_markup_in_code_is_escaped() {
            let highlighter = SyntectHighlighter::new();
            let html = highlighter.highlight("if a < b {}\n", "rust").unwrap();
            assert!(html.contains("&lt;"));
        }
    }
}
