//! Carry unfinished to-dos forward between daily notes.
//!
//! Daily notes are markdown documents stored in a folder, one per day. A new
//! note is built from a template: unfinished checklist items and the headings
//! that hold them are merged in from the most recent earlier note, finished
//! items are dropped, and recurring obligations declared in the template are
//! added on the days they fall due.

pub mod domain;
pub use domain::{Config, CycleError, OutlineNode, Settings, run_cycle};

/// Filesystem storage for daily notes.
pub mod storage;
pub use storage::{Note, NoteDirectory, Notebook};
