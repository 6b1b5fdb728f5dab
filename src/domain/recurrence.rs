//! Calendar rules that decide whether a recurring template line is due.
//!
//! A directive line has the form `{{ obligate <day-of-month> <month>
//! <day-of-week> }}`. Each field is `*` or a comma-separated list of numbers
//! and inclusive `a-b` ranges. Days of the week count from Sunday (0) to
//! Saturday (6). The directive governs the single line that follows it.

use std::{collections::BTreeSet, fmt, ops::RangeInclusive, str::FromStr, sync::LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\{\{ *obligate ([*\-,0-9]+) ([*\-,0-9]+) ([*\-,0-9]+) *\}\}\s*$")
        .expect("valid directive regex")
});

/// Whether `line` is an obligation directive.
#[must_use]
pub fn is_directive(line: &str) -> bool {
    DIRECTIVE.is_match(line)
}

/// The three calendar fields of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Day of the month, 1 to 31.
    DayOfMonth,
    /// Month of the year, 1 to 12.
    Month,
    /// Day of the week, 0 (Sunday) to 6 (Saturday).
    DayOfWeek,
}

impl FieldKind {
    const fn bounds(self) -> RangeInclusive<u32> {
        match self {
            Self::DayOfMonth => 1..=31,
            Self::Month => 1..=12,
            Self::DayOfWeek => 0..=6,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayOfMonth => write!(f, "day-of-month"),
            Self::Month => write!(f, "month"),
            Self::DayOfWeek => write!(f, "day-of-week"),
        }
    }
}

/// One calendar field of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `*`: matches every value.
    Any,
    /// Matches exactly the listed values.
    Values(BTreeSet<u32>),
}

impl Field {
    /// Parses a field, rejecting values outside the range `kind` allows.
    ///
    /// # Errors
    ///
    /// Returns the offending item if it is not a number or `a-b` range, if a
    /// range runs backwards, or if a value is out of bounds.
    pub fn parse(text: &str, kind: FieldKind) -> Result<Self, String> {
        if text == "*" {
            return Ok(Self::Any);
        }

        let bounds = kind.bounds();
        let mut values = BTreeSet::new();
        for item in text.split(',') {
            let (start, end) = match item.split_once('-') {
                Some((start, end)) => (parse_value(start, item)?, parse_value(end, item)?),
                None => {
                    let value = parse_value(item, item)?;
                    (value, value)
                }
            };
            if start > end || !bounds.contains(&start) || !bounds.contains(&end) {
                return Err(item.to_string());
            }
            values.extend(start..=end);
        }
        Ok(Self::Values(values))
    }

    /// Whether this field accepts `value`.
    #[must_use]
    pub fn matches(&self, value: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Values(values) => values.contains(&value),
        }
    }
}

fn parse_value(text: &str, item: &str) -> Result<u32, String> {
    text.parse().map_err(|_| item.to_string())
}

/// Errors raised while reading obligation directives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectiveError {
    /// The line does not have the shape of a directive at all.
    #[error("not an obligation directive: {0:?}")]
    NotADirective(String),

    /// One of the calendar fields could not be parsed.
    #[error("invalid {field} value {value:?} in directive {line:?}")]
    InvalidField {
        /// The directive line.
        line: String,
        /// The field that failed to parse.
        field: FieldKind,
        /// The offending item within the field.
        value: String,
    },

    /// A directive was the last line of the template, so it governs nothing.
    #[error("template malformed: {line:?} must be followed by another line")]
    MalformedDirective {
        /// The directive line.
        line: String,
    },
}

/// A parsed obligation directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

impl Directive {
    /// Creates a directive from already-parsed fields.
    #[must_use]
    pub const fn new(day_of_month: Field, month: Field, day_of_week: Field) -> Self {
        Self {
            day_of_month,
            month,
            day_of_week,
        }
    }

    /// Parses a directive line.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::NotADirective`] if the line is not a
    /// directive and [`DirectiveError::InvalidField`] if any field is
    /// malformed.
    pub fn parse(line: &str) -> Result<Self, DirectiveError> {
        let captures = DIRECTIVE
            .captures(line)
            .ok_or_else(|| DirectiveError::NotADirective(line.to_string()))?;

        let field = |index: usize, kind: FieldKind| {
            Field::parse(&captures[index], kind).map_err(|value| DirectiveError::InvalidField {
                line: line.to_string(),
                field: kind,
                value,
            })
        };

        Ok(Self {
            day_of_month: field(1, FieldKind::DayOfMonth)?,
            month: field(2, FieldKind::Month)?,
            day_of_week: field(3, FieldKind::DayOfWeek)?,
        })
    }

    /// The day-of-month field.
    #[must_use]
    pub const fn day_of_month(&self) -> &Field {
        &self.day_of_month
    }

    /// The month field.
    #[must_use]
    pub const fn month(&self) -> &Field {
        &self.month
    }

    /// The day-of-week field.
    #[must_use]
    pub const fn day_of_week(&self) -> &Field {
        &self.day_of_week
    }

    /// Whether the directive falls on `date`.
    #[must_use]
    pub fn should_trigger(&self, date: NaiveDate) -> bool {
        self.day_of_month.matches(date.day())
            && self.month.matches(date.month())
            && self.day_of_week.matches(date.weekday().num_days_from_sunday())
    }

    /// Whether the directive's line should be emitted `today`.
    ///
    /// Besides `today` itself, every day strictly between `last_processed`
    /// and `today` is checked, so an occurrence that fell on a day with no
    /// note is caught up on the next one. The cost is linear in the size of
    /// that gap.
    #[must_use]
    pub fn should_emit_with_catchup(
        &self,
        last_processed: Option<NaiveDate>,
        today: NaiveDate,
    ) -> bool {
        if self.should_trigger(today) {
            return true;
        }
        let Some(last_processed) = last_processed else {
            return false;
        };

        let mut day = last_processed.succ_opt();
        while let Some(date) = day.filter(|date| *date < today) {
            if self.should_trigger(date) {
                debug!(%date, "catching up on missed obligation");
                return true;
            }
            day = date.succ_opt();
        }
        false
    }
}

impl FromStr for Directive {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolves every directive in `lines`.
///
/// Each directive and the line after it are replaced by that line when the
/// directive is due (see [`Directive::should_emit_with_catchup`]) and removed
/// otherwise. All other lines pass through unchanged.
///
/// # Errors
///
/// Fails on the first directive that cannot be parsed or that has no line
/// after it.
pub fn expand_obligations(
    lines: &[String],
    today: NaiveDate,
    last_processed: Option<NaiveDate>,
) -> Result<Vec<String>, DirectiveError> {
    let mut output = Vec::with_capacity(lines.len());
    let mut lines = lines.iter();

    while let Some(line) = lines.next() {
        if !is_directive(line) {
            output.push(line.clone());
            continue;
        }

        let directive = Directive::parse(line)?;
        let payload = lines
            .next()
            .ok_or_else(|| DirectiveError::MalformedDirective { line: line.clone() })?;

        if directive.should_emit_with_catchup(last_processed, today) {
            debug!(%payload, "obligation due");
            output.push(payload.clone());
        }
    }
    Ok(output)
}

/// A directive together with the line it governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    /// The directive line as written in the template.
    pub source: String,
    /// The parsed directive.
    pub directive: Directive,
    /// The line emitted when the directive is due.
    pub payload: String,
}

/// Lists the obligations declared in `lines`, in order.
///
/// # Errors
///
/// Fails on the first directive that cannot be parsed or that has no line
/// after it.
pub fn obligations(lines: &[String]) -> Result<Vec<Obligation>, DirectiveError> {
    let mut found = Vec::new();
    let mut lines = lines.iter();

    while let Some(line) = lines.next() {
        if !is_directive(line) {
            continue;
        }
        let directive = Directive::parse(line)?;
        let payload = lines
            .next()
            .ok_or_else(|| DirectiveError::MalformedDirective { line: line.clone() })?;
        found.push(Obligation {
            source: line.clone(),
            directive,
            payload: payload.clone(),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn directive(line: &str) -> Directive {
        Directive::parse(line).unwrap()
    }

    #[test]
    fn wildcard_matches_every_day() {
        let every_day = directive("{{ obligate * * * }}");
        let mut day = date(2024, 1, 1);
        while day < date(2025, 1, 1) {
            assert!(every_day.should_trigger(day), "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn ranges_expand_inclusively() {
        let field = Field::parse("1-3,5", FieldKind::DayOfMonth).unwrap();
        let matched: Vec<u32> = (0..=40).filter(|value| field.matches(*value)).collect();
        assert_eq!(matched, [1, 2, 3, 5]);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        assert_eq!(
            Field::parse("5-2", FieldKind::DayOfMonth),
            Err("5-2".to_string())
        );
        assert_eq!(Field::parse("13", FieldKind::Month), Err("13".to_string()));
        assert_eq!(Field::parse("7", FieldKind::DayOfWeek), Err("7".to_string()));
        assert_eq!(Field::parse("1,,2", FieldKind::Month), Err(String::new()));
        assert_eq!(Field::parse("1,*", FieldKind::Month), Err("*".to_string()));
        assert_eq!(Field::parse("1-", FieldKind::Month), Err("1-".to_string()));
    }

    #[test]
    fn parse_reports_the_failing_field() {
        assert_eq!(
            Directive::parse("{{ obligate * 0 * }}"),
            Err(DirectiveError::InvalidField {
                line: "{{ obligate * 0 * }}".to_string(),
                field: FieldKind::Month,
                value: "0".to_string(),
            })
        );
        assert!(matches!(
            Directive::parse("- [ ] not a directive"),
            Err(DirectiveError::NotADirective(_))
        ));
    }

    #[test]
    fn directive_syntax_tolerates_spacing() {
        assert!(is_directive("  {{obligate 1 * *}}  "));
        assert!(is_directive("{{   obligate 1-5 1,6 0,6   }}"));
        assert!(!is_directive("{{ obligate 1 * }}"));
        assert!(!is_directive("text {{ obligate * * * }}"));
    }

    #[test]
    fn all_three_fields_must_match() {
        // 2024-03-15 is a Friday.
        let friday = date(2024, 3, 15);
        assert!(directive("{{ obligate 15 3 5 }}").should_trigger(friday));
        assert!(directive("{{ obligate * * 1-5 }}").should_trigger(friday));
        assert!(!directive("{{ obligate 15 3 0,6 }}").should_trigger(friday));
        assert!(!directive("{{ obligate 15 4 * }}").should_trigger(friday));
        assert!(!directive("{{ obligate 1-14 * * }}").should_trigger(friday));
    }

    #[test]
    fn sunday_is_day_zero() {
        let sunday = date(2024, 3, 10);
        assert!(directive("{{ obligate * * 0 }}").should_trigger(sunday));
        assert!(directive("{{ obligate * * 6 }}").should_trigger(date(2024, 3, 9)));
    }

    #[test]
    fn catches_up_on_skipped_days() {
        let day0 = date(2024, 3, 10);
        let today = date(2024, 3, 15);

        let missed = directive("{{ obligate 13 * * }}");
        assert!(!missed.should_trigger(today));
        assert!(missed.should_emit_with_catchup(Some(day0), today));

        let not_yet_due = directive("{{ obligate 16 * * }}");
        assert!(!not_yet_due.should_emit_with_catchup(Some(day0), today));
    }

    #[test]
    fn catch_up_excludes_the_last_processed_day() {
        let day0 = date(2024, 3, 10);
        let on_day0 = directive("{{ obligate 10 * * }}");
        assert!(!on_day0.should_emit_with_catchup(Some(day0), date(2024, 3, 15)));
    }

    #[test]
    fn no_previous_note_means_no_catch_up() {
        let missed = directive("{{ obligate 13 * * }}");
        assert!(!missed.should_emit_with_catchup(None, date(2024, 3, 15)));
        assert!(missed.should_emit_with_catchup(None, date(2024, 3, 13)));
    }

    #[test]
    fn catch_up_spans_month_and_year_boundaries() {
        let new_year = directive("{{ obligate 1 1 * }}");
        assert!(new_year.should_emit_with_catchup(Some(date(2023, 12, 30)), date(2024, 1, 3)));
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn expansion_keeps_due_payloads_only() {
        let template = lines(&[
            "# Tasks",
            "{{ obligate * * * }}",
            "- [ ] every day",
            "{{ obligate 1 1 * }}",
            "- [ ] new year",
            "- [ ] plain",
        ]);

        let expanded = expand_obligations(&template, date(2024, 3, 15), None).unwrap();

        assert_eq!(expanded, ["# Tasks", "- [ ] every day", "- [ ] plain"]);
    }

    #[test]
    fn expansion_uses_catch_up() {
        let template = lines(&["{{ obligate 13 * * }}", "- [ ] missed"]);
        let expanded =
            expand_obligations(&template, date(2024, 3, 15), Some(date(2024, 3, 10))).unwrap();
        assert_eq!(expanded, ["- [ ] missed"]);
    }

    #[test]
    fn trailing_directive_is_malformed() {
        let template = lines(&["# Tasks", "{{ obligate * * * }}"]);
        assert_eq!(
            expand_obligations(&template, date(2024, 3, 15), None),
            Err(DirectiveError::MalformedDirective {
                line: "{{ obligate * * * }}".to_string(),
            })
        );
    }

    #[test]
    fn obligations_pair_directives_with_payloads() {
        let found = obligations(&lines(&[
            "# Tasks",
            "{{ obligate 1 * * }}",
            "- [ ] pay rent",
            "- [ ] plain",
            "{{ obligate * * 1-5 }}",
            "- [ ] stand-up",
        ]))
        .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].source, "{{ obligate 1 * * }}");
        assert_eq!(found[0].payload, "- [ ] pay rent");
        assert_eq!(found[1].directive, directive("{{ obligate * * 1-5 }}"));
        assert_eq!(found[1].payload, "- [ ] stand-up");
    }
}
