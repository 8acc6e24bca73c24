//! Small helpers shared by the conversion passes

use fancy_regex::{Captures, Regex as FancyRegex};

/// Replace every match of a look-around pattern using `rep`.
///
/// `fancy_regex::Regex::replace_all` panics when the backtracking limit is
/// hit. Here a matching error ends the pass instead: text after the failure
/// point is kept verbatim and the condition is logged.
pub fn fancy_replace_all<F>(re: &FancyRegex, text: &str, mut rep: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let caps = match caps {
            Ok(caps) => caps,
            Err(e) => {
                log::warn!("Pattern {} gave up at offset {last}: {e}", re.as_str());
                break;
            }
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&rep(&caps));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Whether byte offset `pos` begins a line
pub fn is_line_start(text: &str, pos: usize) -> bool {
    pos == 0 || text.as_bytes().get(pos - 1) == Some(&b'\n')
}

/// Number of consecutive `\n` bytes starting at `pos`
pub fn newline_run(text: &str, pos: usize) -> usize {
    text.as_bytes()[pos.min(text.len())..]
        .iter()
        .take_while(|&&b| b == b'\n')
        .count()
}

/// Remove one level of indentation (a tab or up to `tab_width` spaces) from
/// every line.
pub fn outdent(text: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let rest = if let Some(stripped) = line.strip_prefix('\t') {
            stripped
        } else {
            let spaces = line.bytes().take(tab_width).take_while(|&b| b == b' ').count();
            &line[spaces..]
        };
        out.push_str(rest);
    }
    out
}

/// Expand tabs to spaces, aligning to multiples of `tab_width` per line
pub fn detab(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = tab_width - (column % tab_width);
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Remove the common leading whitespace of all non-blank lines.
///
/// With `skip_first_line` the first line neither contributes to the margin
/// nor gets dedented.
pub fn dedent(text: &str, tab_width: usize, skip_first_line: bool) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let margin = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !(skip_first_line && *i == 0))
        .filter_map(|(_, line)| indent_width(line, tab_width))
        .min();

    let Some(margin) = margin.filter(|&m| m > 0) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if skip_first_line && i == 0 {
            out.push_str(line);
            continue;
        }
        out.push_str(&strip_margin(line, margin, tab_width));
    }
    out
}

/// Visual indent of a line, or `None` for whitespace-only lines
fn indent_width(line: &str, tab_width: usize) -> Option<usize> {
    let mut indent = 0;
    for ch in line.chars() {
        match ch {
            ' ' => indent += 1,
            '\t' => indent += tab_width - (indent % tab_width),
            '\r' | '\n' => return None,
            _ => return Some(indent),
        }
    }
    None
}

fn strip_margin(line: &str, margin: usize, tab_width: usize) -> String {
    let mut removed = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => removed += 1,
            '\t' => removed += tab_width - (removed % tab_width),
            // line ending of a blank line, or text left of the margin
            _ => return line[idx..].to_string(),
        }
        if removed >= margin {
            let rest = &line[idx + ch.len_utf8()..];
            return format!("{}{rest}", " ".repeat(removed - margin));
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detab() {
        assert_eq!(detab("\tfoo", 4), "    foo");
        assert_eq!(detab("  \tfoo", 4), "    foo");
        assert_eq!(detab("\t  foo", 4), "      foo");
        assert_eq!(detab("  foo", 4), "  foo");
        assert_eq!(detab("  foo\n\tbar\tblam", 4), "  foo\n    bar blam");
    }

    #[test]
    fn test_outdent() {
        assert_eq!(outdent("    a\n  b\n\tc\n      d\n", 4), "a\nb\nc\n  d\n");
    }

    #[test]
    fn test_dedent_skip_first_line() {
        let text = "First line.\n    second\n      third\n";
        assert_eq!(dedent(text, 8, true), "First line.\nsecond\n  third\n");
    }

    #[test]
    fn test_dedent_all_lines() {
        assert_eq!(dedent("  a\n\n    b\n", 8, false), "a\n\n  b\n");
    }

    #[test]
    fn test_newline_run() {
        assert_eq!(newline_run("a\n\n\nb", 1), 3);
        assert_eq!(newline_run("a", 1), 0);
        assert_eq!(newline_run("a", 5), 0);
    }

    #[test]
    fn test_fancy_replace_all() {
        let re = FancyRegex::new(r"(?<=a)b").unwrap();
        assert_eq!(fancy_replace_all(&re, "ab cb ab", |_| "X".to_string()), "aX cb aX");
    }
}
