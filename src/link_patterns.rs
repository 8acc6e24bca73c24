//! Caller-supplied auto-link rules
//!
//! A rule pairs a pattern with an href template. Matches are swapped for
//! placeholder keys while a rule runs, so a later rule never rewrites an
//! anchor an earlier rule produced, then all keys are restored at once.

use crate::converter::Markdown;
use crate::error::MarkdownError;
use crate::escape::{SENTINEL, placeholder_for, protect_emphasis};
use crate::options::LinkPatternRule;
use fancy_regex::{Expander, Regex as FancyRegex};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub(crate) struct CompiledLinkPattern {
    regex: FancyRegex,
    href: String,
}

/// Compile `/regex/flags` or a literal string.
///
/// Flags `i`, `m` and `s` map to the inline regex flags; `u` and `l` are
/// accepted and have no effect.
pub fn regex_from_encoded_pattern(encoded: &str) -> Result<FancyRegex, MarkdownError> {
    let source = match encoded.rfind('/') {
        Some(idx) if encoded.starts_with('/') && idx != 0 => {
            let pattern = &encoded[1..idx];
            let mut flags = String::new();
            for flag in encoded[idx + 1..].chars() {
                match flag {
                    'i' | 'm' | 's' => flags.push(flag),
                    'u' | 'l' => {}
                    _ => {
                        return Err(MarkdownError::UnsupportedRegexFlag {
                            flag,
                            pattern: encoded.to_string(),
                        });
                    }
                }
            }
            if flags.is_empty() {
                pattern.to_string()
            } else {
                format!("(?{flags}){pattern}")
            }
        }
        _ => regex::escape(encoded),
    };

    FancyRegex::new(&source).map_err(|source| MarkdownError::Regex {
        pattern: encoded.to_string(),
        source,
    })
}

pub(crate) fn compile_link_patterns(rules: &[LinkPatternRule]) -> Result<Vec<CompiledLinkPattern>, MarkdownError> {
    rules
        .iter()
        .map(|rule| {
            Ok(CompiledLinkPattern {
                regex: regex_from_encoded_pattern(&rule.pattern)?,
                href: rule.href.clone(),
            })
        })
        .collect()
}

/// Parse a rule file: one `PATTERN HREF` per line, split at the last
/// space. Blank lines and `#` comments are skipped.
pub fn parse_link_patterns(content: &str, file: &str) -> Result<Vec<LinkPatternRule>, MarkdownError> {
    let mut rules = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((pattern, href)) = line.trim_end().rsplit_once(' ') else {
            return Err(MarkdownError::InvalidLinkPattern {
                file: file.to_string(),
                line: idx + 1,
                content: line.to_string(),
            });
        };
        rules.push(LinkPatternRule::new(pattern, href));
    }
    Ok(rules)
}

pub fn load_link_patterns_file(path: &Path) -> Result<Vec<LinkPatternRule>, MarkdownError> {
    let content = fs::read_to_string(path).map_err(|source| MarkdownError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rules = parse_link_patterns(&content, &path.display().to_string())?;
    log::debug!("Loaded {} link pattern(s) from {}", rules.len(), path.display());
    Ok(rules)
}

/// Byte ranges of the placeholder tokens in `text`, end inclusive
fn token_ranges(text: &str) -> Vec<(usize, usize)> {
    let sentinels: Vec<usize> = text.match_indices(SENTINEL).map(|(pos, _)| pos).collect();
    sentinels.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

impl Markdown {
    pub(crate) fn do_link_patterns(&self, text: &str) -> String {
        let expander = Expander::python();
        let mut text = text.to_string();
        let mut links = Vec::new();

        for rule in &self.link_patterns {
            let tokens = token_ranges(&text);
            let mut replacements = Vec::new();
            for caps in rule.regex.captures_iter(&text) {
                let caps = match caps {
                    Ok(caps) => caps,
                    Err(e) => {
                        log::warn!("Link pattern {} gave up: {e}", rule.regex.as_str());
                        break;
                    }
                };
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let inside_token = tokens
                    .iter()
                    .any(|&(start, end)| whole.start() <= end && whole.end() > start);
                if whole.start() == whole.end() || inside_token {
                    continue;
                }
                replacements.push((whole.start(), whole.end(), expander.expansion(&rule.href, &caps)));
            }

            for (start, end, href) in replacements.into_iter().rev() {
                let href = protect_emphasis(&href.replace('"', "&quot;"));
                let link = format!("<a href=\"{href}\">{}</a>", &text[start..end]);
                let key = placeholder_for(&link);
                text.replace_range(start..end, &key);
                links.push((key, link));
            }
        }

        for (key, link) in links {
            text = text.replace(&key, &link);
        }
        text
    }
}
