//! One complete carry-forward cycle: from yesterday's note and today's
//! template to the body of today's note.
//!
//! The cycle is a pure function of its inputs. Nothing is written and no
//! partially merged output is ever returned.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{
    merge::{MergeError, merge},
    outline::{destructure, structurize},
    prune::{PrunePolicy, prune},
    recurrence::{DirectiveError, expand_obligations},
    scope::{Boundaries, ScopeError, slice},
    template::strip_frontmatter,
};

/// The options a cycle runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The region of each document that takes part in the merge.
    pub boundaries: Boundaries,

    /// Delete headings left without content.
    pub delete_empty_headings: bool,

    /// Prune the previous note before merging, so that headings coming from
    /// the template are never deleted. When `false`, the merged result is
    /// pruned instead.
    pub keep_template_headings: bool,

    /// Keep checked to-dos until their whole checklist is finished.
    pub keep_until_parent_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            boundaries: Boundaries::default(),
            delete_empty_headings: true,
            keep_template_headings: true,
            keep_until_parent_complete: false,
        }
    }
}

impl Settings {
    /// The pruning policy these settings imply.
    #[must_use]
    pub const fn prune_policy(&self) -> PrunePolicy {
        PrunePolicy {
            delete_empty_headings: self.delete_empty_headings,
            keep_until_parent_complete: self.keep_until_parent_complete,
        }
    }
}

/// The note being carried forward.
#[derive(Debug, Clone, Copy)]
pub struct PreviousNote<'a> {
    /// The note's name, used in diagnostics.
    pub name: &'a str,
    /// The day the note was written for.
    pub date: NaiveDate,
    /// The note's full contents, frontmatter included.
    pub lines: &'a [String],
}

/// Everything a cycle reads.
#[derive(Debug, Clone, Copy)]
pub struct CycleInput<'a> {
    /// Today's template, with creation-time macros already expanded.
    pub template: &'a [String],
    /// The most recent earlier note, if there is one.
    pub previous: Option<PreviousNote<'a>>,
    /// The day the new note is for.
    pub today: NaiveDate,
}

/// Errors that abort a cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CycleError {
    /// The template contains a malformed obligation directive.
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    /// A document is missing a configured boundary line.
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// The outlines could not be merged.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Produces the lines of today's note.
///
/// Due obligations are resolved in the template, unfinished content from the
/// previous note is merged into the template's region, finished content is
/// pruned, and the lines outside the region are passed through.
///
/// # Errors
///
/// Fails if the template holds a malformed directive or if a configured
/// boundary line is missing from either document.
#[instrument(level = "debug", skip_all, fields(today = %input.today))]
pub fn run_cycle(input: &CycleInput<'_>, settings: &Settings) -> Result<Vec<String>, CycleError> {
    let last_processed = input.previous.map(|previous| previous.date);
    let template = expand_obligations(input.template, input.today, last_processed)?;
    let scope = slice(&template, &settings.boundaries, "template")?;
    let mut outline = structurize(&scope.body, None);
    let policy = settings.prune_policy();

    if let Some(previous) = input.previous {
        let lines = strip_frontmatter(previous.lines);
        let body = slice(lines, &settings.boundaries, previous.name)?.body;
        let mut carried = structurize(&body, None);
        debug!(note = previous.name, lines = carried.size(), "carrying forward");

        if settings.keep_template_headings {
            prune(&mut carried, policy);
        }
        merge(&mut outline, carried)?;
    }

    if !settings.keep_template_headings {
        prune(&mut outline, policy);
    }

    Ok(scope.reassemble(destructure(&outline)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(ToString::to_string).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn yesterday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn cycle(template: &[&str], previous: &[&str], settings: &Settings) -> Vec<String> {
        let template = lines(template);
        let previous = lines(previous);
        run_cycle(
            &CycleInput {
                template: &template,
                previous: Some(PreviousNote {
                    name: "2024-03-14",
                    date: yesterday(),
                    lines: &previous,
                }),
                today: today(),
            },
            settings,
        )
        .unwrap()
    }

    #[test]
    fn carries_unfinished_items() {
        for keep_template_headings in [true, false] {
            let settings = Settings {
                delete_empty_headings: false,
                keep_template_headings,
                ..Settings::default()
            };
            assert_eq!(
                cycle(
                    &["# Tasks"],
                    &["# Tasks", "- [ ] buy milk", "- [x] call bank"],
                    &settings,
                ),
                ["# Tasks", "- [ ] buy milk"]
            );
        }
    }

    #[test]
    fn empty_headings_are_pruned_after_merge() {
        let settings = Settings {
            delete_empty_headings: true,
            keep_template_headings: false,
            ..Settings::default()
        };
        assert_eq!(
            cycle(&["# Notes"], &["# Notes"], &settings),
            Vec::<String>::new()
        );
    }

    #[test]
    fn template_headings_survive_when_kept() {
        let settings = Settings {
            delete_empty_headings: true,
            keep_template_headings: true,
            ..Settings::default()
        };
        assert_eq!(
            cycle(&["# Notes"], &["# Notes", "# Old", ""], &settings),
            ["# Notes"]
        );
    }

    #[test]
    fn unfinished_subtasks_keep_their_parent() {
        let settings = Settings {
            keep_until_parent_complete: true,
            ..Settings::default()
        };
        assert_eq!(
            cycle(&[], &["- [x] project", "  - [ ] subtask"], &settings),
            ["- [x] project", "  - [ ] subtask"]
        );
    }

    #[test]
    fn boundaries_limit_what_is_carried() {
        let settings = Settings {
            boundaries: Boundaries {
                initial: Some("# Todo".to_string()),
                terminal: Some("# Journal".to_string()),
            },
            ..Settings::default()
        };
        let result = cycle(
            &["# {{title}}", "# Todo", "- [ ] stretch", "# Journal", ""],
            &[
                "---",
                "tags: daily",
                "---",
                "# 2024-03-14",
                "# Todo",
                "- [ ] stretch",
                "- [ ] write report",
                "# Journal",
                "- [ ] not a real task",
            ],
            &settings,
        );
        assert_eq!(
            result,
            [
                "# {{title}}",
                "# Todo",
                "- [ ] stretch",
                "- [ ] write report",
                "# Journal",
                ""
            ]
        );
    }

    #[test]
    fn missing_boundary_in_previous_note_aborts() {
        let settings = Settings {
            boundaries: Boundaries {
                initial: Some("# Todo".to_string()),
                terminal: None,
            },
            ..Settings::default()
        };
        let template = lines(&["# Todo"]);
        let previous = lines(&["# Something else"]);

        let error = run_cycle(
            &CycleInput {
                template: &template,
                previous: Some(PreviousNote {
                    name: "2024-03-14",
                    date: yesterday(),
                    lines: &previous,
                }),
                today: today(),
            },
            &settings,
        )
        .unwrap_err();

        assert_eq!(
            error,
            CycleError::Scope(ScopeError::BoundaryNotFound {
                document: "2024-03-14".to_string(),
                boundary: "# Todo".to_string(),
            })
        );
    }

    #[test]
    fn obligations_catch_up_from_previous_note() {
        let template = lines(&[
            "# Tasks",
            "{{ obligate 12 * * }}",
            "- [ ] pay rent",
            "{{ obligate 20 * * }}",
            "- [ ] not yet",
        ]);
        let previous = lines(&["# Tasks", "- [ ] carried"]);

        let result = run_cycle(
            &CycleInput {
                template: &template,
                previous: Some(PreviousNote {
                    name: "2024-03-10",
                    date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                    lines: &previous,
                }),
                today: today(),
            },
            &Settings::default(),
        )
        .unwrap();

        assert_eq!(result, ["# Tasks", "- [ ] pay rent", "- [ ] carried"]);
    }

    #[test]
    fn first_note_is_the_expanded_template() {
        let template = lines(&["# Tasks", "{{ obligate * * * }}", "- [ ] daily", "- [x] done"]);
        let result = run_cycle(
            &CycleInput {
                template: &template,
                previous: None,
                today: today(),
            },
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(result, ["# Tasks", "- [ ] daily", "- [x] done"]);
    }

    #[test]
    fn malformed_template_aborts() {
        let template = lines(&["# Tasks", "{{ obligate * * * }}"]);
        let error = run_cycle(
            &CycleInput {
                template: &template,
                previous: None,
                today: today(),
            },
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            CycleError::Directive(DirectiveError::MalformedDirective { .. })
        ));
    }

    #[test]
    fn repeated_cycles_are_stable() {
        let settings = Settings::default();
        let template = ["# Tasks", "- [ ] daily", "## Later"];
        let first = cycle(&template, &["# Tasks", "- [ ] carried", "note"], &settings);

        let first: Vec<&str> = first.iter().map(String::as_str).collect();
        let second = cycle(&template, &first, &settings);

        assert_eq!(second, first);
        assert_eq!(first, ["# Tasks", "- [ ] daily", "- [ ] carried", "note", "## Later"]);
    }
}
