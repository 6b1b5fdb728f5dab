//! Domain logic for carrying forward daily notes.
//!
//! This module contains the line classifier, the outline tree and the
//! algorithms that merge and prune it, recurring obligations, template
//! macros and configuration. Nothing here touches the filesystem.

/// Classification of single markdown lines.
pub mod line;

/// The outline tree built from a note's headings and checklists.
pub mod outline;
pub use outline::{Child, OutlineNode, destructure, structurize};

/// Merging one outline into another.
pub mod merge;
pub use merge::{MergeError, merge, merge_or_wrap};

/// Removal of finished content.
pub mod prune;
pub use prune::{PrunePolicy, prune};

/// Recurring obligations declared in templates.
pub mod recurrence;
pub use recurrence::{Directive, DirectiveError, Obligation, expand_obligations};

/// The region of a document that takes part in the merge.
pub mod scope;
pub use scope::{Boundaries, Scope, ScopeError};

/// Template macro substitution.
pub mod template;
pub use template::{NoteReference, TemplateContext, TemplateError};

/// One carry-forward cycle from the previous note to today's.
pub mod cycle;
pub use cycle::{CycleError, CycleInput, PreviousNote, Settings, run_cycle};

mod config;
pub use config::Config;
