use mdpress_lib::link_patterns::{load_link_patterns_file, parse_link_patterns};
use mdpress_lib::{ConvertOptions, Extra, LinkPatternRule, MarkdownError, markdown};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn with_rules(rules: &[(&str, &str)]) -> ConvertOptions {
    rules.iter().fold(
        ConvertOptions::default().with_extra(Extra::LinkPatterns),
        |options, (pattern, href)| options.with_link_pattern(LinkPatternRule::new(*pattern, *href)),
    )
}

#[test]
fn test_issue_links() {
    let options = with_rules(&[(r"/issue #(\d+)/i", r"http://bugs/\1")]);
    assert_eq!(
        markdown("Issue #42 is fixed.\n", &options).unwrap(),
        "<p><a href=\"http://bugs/42\">Issue #42</a> is fixed.</p>\n"
    );
}

#[test]
fn test_literal_pattern() {
    let options = with_rules(&[("mdpress", "https://example.org/mdpress")]);
    assert_eq!(
        markdown("Try mdpress.\n", &options).unwrap(),
        "<p>Try <a href=\"https://example.org/mdpress\">mdpress</a>.</p>\n"
    );
}

#[test]
fn test_href_underscores_survive_emphasis() {
    let options = with_rules(&[(r"/PEP (\d+)/", r"http://x/_pep_\1_")]);
    assert_eq!(
        markdown("PEP 8 and _em_\n", &options).unwrap(),
        "<p><a href=\"http://x/_pep_8_\">PEP 8</a> and <em>em</em></p>\n"
    );
}

#[test]
fn test_code_spans_are_not_linked() {
    let options = with_rules(&[("foo", "http://foo/")]);
    assert_eq!(
        markdown("`foo` foo\n", &options).unwrap(),
        "<p><code>foo</code> <a href=\"http://foo/\">foo</a></p>\n"
    );
}

#[test]
fn test_rules_ignored_without_extra() {
    let options = ConvertOptions::default().with_link_pattern(LinkPatternRule::new("foo", "http://foo/"));
    assert_eq!(markdown("foo\n", &options).unwrap(), "<p>foo</p>\n");
}

#[test]
fn test_bad_pattern_rejected_up_front() {
    let options = with_rules(&[("/x/z", "http://x/")]);
    assert!(matches!(
        markdown("x", &options),
        Err(MarkdownError::UnsupportedRegexFlag { flag: 'z', .. })
    ));
}

#[test]
fn test_rule_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("patterns.txt");
    fs::write(&path, "# bug tracker\n/bug (\\d+)/i http://bugs/\\1\n\nmdpress https://mdpress\n").unwrap();

    let rules = load_link_patterns_file(&path).unwrap();
    assert_eq!(
        rules,
        vec![
            LinkPatternRule::new("/bug (\\d+)/i", "http://bugs/\\1"),
            LinkPatternRule::new("mdpress", "https://mdpress"),
        ]
    );
}

#[test]
fn test_rule_file_error_names_line() {
    let err = parse_link_patterns("ok http://ok\n# fine\nbroken\n", "p.txt").unwrap_err();
    assert!(matches!(err, MarkdownError::InvalidLinkPattern { line: 3, .. }));
}
