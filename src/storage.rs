/// Locating daily notes by date.
pub mod directory;
/// Reading and writing notes as lines of markdown.
pub mod markdown;
mod notebook;

pub use directory::{DirectoryError, Note, NoteDirectory};
pub use markdown::{read_lines, write_lines};
pub use notebook::{CONFIG_DIR, Created, NewNote, Notebook, NotebookError, Outcome};
