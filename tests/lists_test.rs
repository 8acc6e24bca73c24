use mdpress_lib::{ConvertOptions, markdown};
use pretty_assertions::assert_eq;

fn convert(text: &str) -> String {
    markdown(text, &ConvertOptions::default()).unwrap()
}

#[test]
fn test_tight_unordered_list() {
    assert_eq!(convert("- a\n- b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    assert_eq!(convert("* a\n+ b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn test_loose_list() {
    assert_eq!(convert("- a\n\n- b\n"), "<ul>\n<li><p>a</p></li>\n<li><p>b</p></li>\n</ul>\n");
}

#[test]
fn test_ordered_list() {
    assert_eq!(convert("1. a\n2. b\n"), "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
    // the numbers themselves are ignored
    assert_eq!(convert("3. a\n1. b\n"), "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
}

#[test]
fn test_nested_list() {
    assert_eq!(
        convert("- a\n    - b\n- c\n"),
        "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul></li>\n<li>c</li>\n</ul>\n"
    );
}

#[test]
fn test_list_item_with_emphasis() {
    assert_eq!(convert("- *a*\n"), "<ul>\n<li><em>a</em></li>\n</ul>\n");
}

#[test]
fn test_number_inside_paragraph_is_not_a_list() {
    assert_eq!(
        convert("I recommend upgrading to version\n8. Oops, this is not a list.\n"),
        "<p>I recommend upgrading to version\n8. Oops, this is not a list.</p>\n"
    );
}

#[test]
fn test_list_then_paragraph() {
    assert_eq!(convert("- a\n- b\n\nPara\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n\n<p>Para</p>\n");
}

#[test]
fn test_deep_nesting_is_bounded() {
    let options = ConvertOptions::default().with_max_nesting_depth(4);
    let mut doc = String::new();
    for level in 0..32 {
        doc.push_str(&"    ".repeat(level));
        doc.push_str("- item\n");
    }
    let html = markdown(&doc, &options).unwrap();
    assert!(html.starts_with("<ul>\n<li>item\n<ul>"));
    assert!(html.matches("<ul>").count() <= 4);
    assert_eq!(html.matches("<ul>").count(), html.matches("</ul>").count());
}
