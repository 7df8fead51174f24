//! Pure string utility functions for presentation-safe titles

/// Strip characters that the presentation layer cannot carry verbatim.
///
/// Double quotes and backslashes would terminate or escape the string
/// literal a presenter embeds the title in; control characters (including
/// newlines) are dropped. Runs of whitespace collapse to one space and the
/// result is trimmed.
///
/// # Examples
///
/// ```
/// use meetbell_domain::sanitize_title;
///
/// assert_eq!(sanitize_title("  Team \"sync\"\n\tweekly "), "Team sync weekly");
/// ```
#[must_use]
pub fn sanitize_title(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
