//! Classification of the two foldable line kinds: headings and checklist
//! items.
//!
//! Every function here is total. Lines with malformed or ambiguous markers
//! are simply "not a heading" / "not a checklist item".

use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,7}\s+\S").expect("valid heading regex"));

static CHECKLIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)-\s+\[[x /]\]").expect("valid checklist regex"));

static CHECKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+\[x\]").expect("valid checked-box regex"));

/// Returns the heading level of `line`: the number of leading `#` markers,
/// or 0 if the line is not a heading.
///
/// ```
/// use obligator::domain::line::heading_level;
///
/// assert_eq!(heading_level("## Tasks"), 2);
/// assert_eq!(heading_level("#hashtag"), 0);
/// ```
#[must_use]
pub fn heading_level(line: &str) -> usize {
    if HEADING.is_match(line) {
        line.bytes().take_while(|&b| b == b'#').count()
    } else {
        0
    }
}

/// Returns the checklist level of `line`: the length of its leading
/// whitespace plus one, or 0 if the line is not a checklist item.
///
/// Unchecked (`[ ]`), checked (`[x]`) and in-progress (`[/]`) boxes all count.
#[must_use]
pub fn checklist_level(line: &str) -> usize {
    CHECKLIST
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map_or(0, |indent| indent.as_str().len() + 1)
}

/// Whether `line` is a checklist item whose box is checked (`[x]`).
#[must_use]
pub fn is_checked(line: &str) -> bool {
    CHECKED.is_match(line)
}

/// Whether `line` is a heading.
#[must_use]
pub fn is_heading(line: &str) -> bool {
    heading_level(line) > 0
}

/// Whether `line` is a checklist item.
#[must_use]
pub fn is_checklist(line: &str) -> bool {
    checklist_level(line) > 0
}

/// Whether `line` contains only whitespace.
#[must_use]
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
