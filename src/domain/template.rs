//! Macro substitution for templates and finished notes.
//!
//! Supported macros:
//!
//! | macro                      | replaced with                                    |
//! |----------------------------|--------------------------------------------------|
//! | `{{date}}`, `{{date:FMT}}` | the current date (default format `%Y-%m-%d`)     |
//! | `{{time}}`, `{{time:FMT}}` | the current time (default format `%H:%M`)        |
//! | `{{title}}`                | the new note's title                             |
//! | `{{previous_note}}`        | the previous note's name, or nothing             |
//! | `{{previous_note_path}}`   | the previous note's path, or nothing             |
//! | `{{next_note}}`            | the new note's name (previous note only)         |
//! | `{{next_note_path}}`       | the new note's path (previous note only)         |
//!
//! Formats use chrono's strftime syntax.

use std::{fmt::Write as _, sync::LazyLock};

use chrono::{DateTime, FixedOffset};
use regex::{NoExpand, Regex};
use thiserror::Error;

/// Date format used by `{{date}}` when none is given.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used by `{{time}}` when none is given.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*date:?(.*?)\s*\}\}").expect("valid date macro regex"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*time:?(.*?)\s*\}\}").expect("valid time macro regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*title\s*\}\}").expect("valid title macro regex"));
static PREVIOUS_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*previous_note\s*\}\}").expect("valid previous note macro regex")
});
static PREVIOUS_NOTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*previous_note_path\s*\}\}").expect("valid previous path macro regex")
});
static NEXT_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*next_note\s*\}\}").expect("valid next note macro regex"));
static NEXT_NOTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*next_note_path\s*\}\}").expect("valid next path macro regex")
});

/// Errors that can occur when rendering a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{date:…}}` or `{{time:…}}` macro has an unusable format string.
    #[error("invalid date/time format {0:?} in template")]
    InvalidFormat(String),
}

/// A reference to a note, as exposed to macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteReference {
    /// The note's name, without extension.
    pub name: String,
    /// The note's path.
    pub path: String,
}

/// Values available to template macros.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    /// The moment the note is created.
    pub now: DateTime<FixedOffset>,
    /// The new note's title.
    pub title: String,
    /// The note being carried forward, if there is one.
    pub previous_note: Option<NoteReference>,
}

/// Expands the creation-time macros in `template`.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidFormat`] if a date or time format cannot
/// be rendered.
pub fn render(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let text = replace_formatted(template, &DATE, &context.now, DEFAULT_DATE_FORMAT)?;
    let text = replace_formatted(&text, &TIME, &context.now, DEFAULT_TIME_FORMAT)?;
    let text = TITLE.replace_all(&text, NoExpand(&context.title));

    let (name, path) = context
        .previous_note
        .as_ref()
        .map_or(("", ""), |note| (note.name.as_str(), note.path.as_str()));
    let text = PREVIOUS_NOTE.replace_all(&text, NoExpand(name));
    let text = PREVIOUS_NOTE_PATH.replace_all(&text, NoExpand(path));

    Ok(text.into_owned())
}

/// Fills the `{{next_note}}` macros of a finished note once its successor
/// exists.
#[must_use]
pub fn render_next_note(text: &str, next: &NoteReference) -> String {
    let text = NEXT_NOTE.replace_all(text, NoExpand(&next.name));
    NEXT_NOTE_PATH
        .replace_all(&text, NoExpand(&next.path))
        .into_owned()
}

fn replace_formatted(
    text: &str,
    pattern: &Regex,
    now: &DateTime<FixedOffset>,
    default_format: &str,
) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for captures in pattern.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let format = captures
            .get(1)
            .map(|format| format.as_str())
            .filter(|format| !format.is_empty())
            .unwrap_or(default_format);

        output.push_str(&text[last..whole.start()]);
        write!(output, "{}", now.format(format))
            .map_err(|_| TemplateError::InvalidFormat(format.to_string()))?;
        last = whole.end();
    }

    output.push_str(&text[last..]);
    Ok(output)
}

/// Returns `lines` without a leading `---` delimited frontmatter block.
///
/// An opening delimiter without a closing one is not frontmatter, so the
/// lines are returned unchanged.
#[must_use]
pub fn strip_frontmatter(lines: &[String]) -> &[String] {
    match lines.first() {
        Some(first) if first.trim() == "---" => lines
            .iter()
            .skip(1)
            .position(|line| line.trim() == "---")
            .map_or(lines, |end| &lines[end + 2..]),
        _ => lines,
    }
}
