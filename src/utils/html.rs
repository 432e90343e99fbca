use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tags kept when sanitizing release notes, any other tag is removed while its text is kept
pub const ALLOWED_TAGS: &[&str] = &["h2", "h3", "ul", "li", "a", "strong", "em", "code"];

/// Removes every HTML tag not present on [ALLOWED_TAGS], as well as HTML comments.
///
/// Allowed tags are kept untouched, including their attributes.
///
/// # Examples
///
/// ```rust
/// # use release_herald::utils::sanitize_release_notes;
/// let html = r#"<h2>Fixed</h2><p>A <g-emoji alias="bug">🐛</g-emoji> in <code>main</code></p>"#;
/// assert_eq!(sanitize_release_notes(html), "<h2>Fixed</h2>A 🐛 in <code>main</code>");
/// ```
pub fn sanitize_release_notes(html: impl AsRef<str>) -> String {
    /// Regex to match HTML comments
    static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
    /// Regex to match opening, closing and self-closing tags, capturing the tag name
    static TAGS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"</?([a-zA-Z][a-zA-Z0-9-]*)(?:\s[^>]*)?/?>"#).unwrap());

    let without_comments = COMMENTS.replace_all(html.as_ref(), "");
    TAGS.replace_all(&without_comments, |caps: &Captures| {
        let name = caps[1].to_ascii_lowercase();
        if ALLOWED_TAGS.contains(&name.as_str()) {
            caps[0].to_owned()
        } else {
            String::new()
        }
    })
    .trim()
    .to_owned()
}
