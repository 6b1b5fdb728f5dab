//! A folder of daily notes
//!
//! The [`NoteDirectory`] maps dates to note files and back. A note's path,
//! relative to the folder and without its `.md` extension, is its date
//! formatted with the configured strftime format. The format may contain `/`
//! to spread notes across subfolders.

use std::{
    ffi::OsStr,
    fmt::Write as _,
    path::{Component, Path, PathBuf},
};

use chrono::NaiveDate;
use walkdir::WalkDir;

/// A daily note found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// The day the note is for.
    pub date: NaiveDate,
    /// The note's name: its date in the configured format.
    pub name: String,
    /// The path of the note file.
    pub path: PathBuf,
}

/// Errors that can occur when opening a note folder.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The date format contains an unknown or incomplete specifier, or one
    /// that a date alone cannot fill, such as an hour or a time zone.
    #[error("invalid note date format {0:?}")]
    InvalidDateFormat(String),
}

/// A folder of daily notes.
#[derive(Debug, Clone)]
pub struct NoteDirectory {
    /// The folder notes are stored in.
    root: PathBuf,
    date_format: String,
}

impl NoteDirectory {
    /// Opens the note folder at `root`.
    ///
    /// The folder does not need to exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidDateFormat`] if `date_format` cannot
    /// format a date.
    pub fn new(root: PathBuf, date_format: impl Into<String>) -> Result<Self, DirectoryError> {
        let date_format = date_format.into();
        let mut sample = String::new();
        if write!(sample, "{}", NaiveDate::default().format(&date_format)).is_err() {
            return Err(DirectoryError::InvalidDateFormat(date_format));
        }
        Ok(Self { root, date_format })
    }

    /// The folder notes are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The name of the note for `date`.
    #[must_use]
    pub fn note_name(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    /// The path of the note for `date`, whether or not it exists.
    #[must_use]
    pub fn note_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.md", self.note_name(date)))
    }

    /// The note for `date`, as a [`Note`].
    #[must_use]
    pub fn note(&self, date: NaiveDate) -> Note {
        Note {
            date,
            name: self.note_name(date),
            path: self.note_path(date),
        }
    }

    /// Every note in the folder, oldest first.
    ///
    /// Markdown files whose names do not match the date format exactly are
    /// skipped, as are files that cannot be read.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension() == Some(OsStr::new("md")))
            .filter_map(|entry| self.try_note(entry.into_path()))
            .collect();
        notes.sort_by_key(|note| note.date);
        notes
    }

    /// The most recent note dated strictly before `today`.
    #[must_use]
    pub fn previous_note(&self, today: NaiveDate) -> Option<Note> {
        self.notes()
            .into_iter()
            .take_while(|note| note.date < today)
            .last()
    }

    fn try_note(&self, path: PathBuf) -> Option<Note> {
        let name = note_name_from_path(&self.root, &path)?;
        let Ok(date) = NaiveDate::parse_from_str(&name, &self.date_format) else {
            tracing::debug!("Skipping file with no date at {}", path.display());
            return None;
        };

        // Parsing is lenient about padding, so require an exact round trip.
        if self.note_name(date) != name {
            tracing::debug!("Skipping file with non-canonical date at {}", path.display());
            return None;
        }

        Some(Note { date, name, path })
    }
}

/// The path of `path` relative to `root`, without extension, with `/` as the
/// separator.
fn note_name_from_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn setup(format: &str, files: &[&str]) -> (TempDir, NoteDirectory) {
        let tmp = TempDir::new().unwrap();
        for file in files {
            let path = tmp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let directory = NoteDirectory::new(tmp.path().to_path_buf(), format).unwrap();
        (tmp, directory)
    }

    #[test]
    fn invalid_formats_are_rejected() {
        for format in ["%Y-%", "%Y-%m-%d-%H", "%Y-%m-%d %z", "%Q"] {
            assert_eq!(
                NoteDirectory::new(PathBuf::from("daily"), format).unwrap_err(),
                DirectoryError::InvalidDateFormat(format.to_string())
            );
        }
    }

    #[test]
    fn note_path_uses_the_date_format() {
        let directory = NoteDirectory::new(PathBuf::from("daily"), "%Y/%m/%Y-%m-%d").unwrap();
        assert_eq!(
            directory.note_path(date(2024, 3, 5)),
            PathBuf::from("daily/2024/03/2024-03-05.md")
        );
    }

    #[test]
    fn notes_are_sorted_and_unrelated_files_skipped() {
        let (_tmp, directory) = setup(
            "%Y-%m-%d",
            &[
                "2024-03-14.md",
                "2024-03-01.md",
                "2024-3-2.md",
                "ideas.md",
                "2024-03-10.txt",
                "nested/2024-03-09.md",
            ],
        );

        let dates: Vec<_> = directory.notes().into_iter().map(|note| note.date).collect();
        assert_eq!(dates, [date(2024, 3, 1), date(2024, 3, 14)]);
    }

    #[test]
    fn notes_in_subfolders_follow_the_format() {
        let (_tmp, directory) = setup(
            "%Y/%m/%Y-%m-%d",
            &["2024/03/2024-03-14.md", "2024/02/2024-02-29.md", "2024-03-01.md"],
        );

        let notes = directory.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].name, "2024/02/2024-02-29");
        assert_eq!(notes[1].date, date(2024, 3, 14));
    }

    #[test]
    fn previous_note_is_the_latest_before_today() {
        let (_tmp, directory) = setup(
            "%Y-%m-%d",
            &["2024-03-10.md", "2024-03-12.md", "2024-03-15.md", "2024-03-16.md"],
        );

        let previous = directory.previous_note(date(2024, 3, 15)).unwrap();
        assert_eq!(previous.date, date(2024, 3, 12));
        assert_eq!(previous.name, "2024-03-12");
        assert!(directory.previous_note(date(2024, 3, 10)).is_none());
    }

    #[test]
    fn missing_folder_has_no_notes() {
        let directory =
            NoteDirectory::new(PathBuf::from("/nonexistent/obligator/notes"), "%Y-%m-%d").unwrap();
        assert!(directory.notes().is_empty());
    }
}
