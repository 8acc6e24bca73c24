use mdpress_lib::{ConvertOptions, markdown};
use pretty_assertions::assert_eq;

fn convert_safe(text: &str) -> String {
    markdown(text, &ConvertOptions::default().with_safe_mode(true)).unwrap()
}

#[test]
fn test_block_and_inline_html_removed() {
    assert_eq!(
        convert_safe("<div>\nhi\n</div>\n\nText <b>bold</b>\n"),
        "[HTML_REMOVED]\n\n<p>Text [HTML_REMOVED]bold[HTML_REMOVED]</p>\n"
    );
}

#[test]
fn test_comment_removed() {
    assert_eq!(convert_safe("<!-- c -->\n\ntext\n"), "[HTML_REMOVED]\n\n<p>text</p>\n");
}

#[test]
fn test_generated_markup_survives() {
    assert_eq!(convert_safe("**b**\n"), "<p><strong>b</strong></p>\n");
    assert_eq!(convert_safe("> hi\n"), "<blockquote>\n  <p>hi</p>\n</blockquote>\n");
    assert_eq!(convert_safe("- a\n- b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn test_code_is_escaped_not_removed() {
    assert_eq!(convert_safe("    <b>\n"), "<pre><code>&lt;b&gt;\n</code></pre>\n");
    assert_eq!(convert_safe("`<b>`\n"), "<p><code>&lt;b&gt;</code></p>\n");
}

#[test]
fn test_marker_is_not_reinterpreted() {
    // the marker's brackets and underscore must not start a link or emphasis
    let html = convert_safe("<i>x</i>(/u) _a_\n");
    assert_eq!(html, "<p>[HTML_REMOVED]x[HTML_REMOVED](/u) <em>a</em></p>\n");
}

#[test]
fn test_autolink_removed() {
    assert_eq!(convert_safe("<http://example.com/>\n"), "<p>[HTML_REMOVED]</p>\n");
}

#[test]
fn test_html_under_header_removed() {
    assert_eq!(
        convert_safe("# T\n<hr onmouseover=\"alert(1)\">\n\nafter\n"),
        "<h1>T</h1>\n\n[HTML_REMOVED]\n\n<p>after</p>\n"
    );
    assert_eq!(
        convert_safe("# T\n<!-- secret -->\n\nafter\n"),
        "<h1>T</h1>\n\n[HTML_REMOVED]\n\n<p>after</p>\n"
    );
}

#[test]
fn test_html_in_loose_list_item_removed() {
    let html = convert_safe("- a\n\n    <div onclick=\"x()\">\n    evil\n    </div>\n\n- b\n");
    assert!(!html.contains("onclick"), "{html}");
    assert!(!html.contains("evil"), "{html}");
    assert!(html.contains("<li><p>a</p>"), "{html}");
    assert!(html.contains("[HTML_REMOVED]"), "{html}");
}

#[test]
fn test_generated_rule_survives_next_to_author_rule() {
    assert_eq!(convert_safe("<hr />\n\n---\n"), "[HTML_REMOVED]\n\n<hr />\n");
}
