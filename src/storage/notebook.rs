//! A notes folder together with its configuration
//!
//! The [`Notebook`] ties the pure merge cycle to the filesystem: it reads the
//! template and the previous note, runs the cycle, and writes the result.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::instrument;

use crate::{
    domain::{
        Config, CycleError, CycleInput, NoteReference, Obligation, PreviousNote, TemplateContext,
        TemplateError, recurrence, run_cycle, template,
    },
    storage::{DirectoryError, Note, NoteDirectory, read_lines, write_lines},
};

/// The folder holding the configuration, relative to the notebook root.
pub const CONFIG_DIR: &str = ".obligator";

/// Errors that can occur while building or writing a note.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// The configuration file exists but could not be loaded.
    #[error("{0}")]
    Config(String),

    /// The configured note folder is unusable.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A file could not be read or written.
    #[error("failed to access {}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The template's macros could not be expanded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The merge cycle failed.
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// The result of preparing today's note.
#[derive(Debug)]
pub enum Outcome {
    /// A note for the day already exists and is left alone.
    Exists(Note),
    /// A new note is ready to be written.
    Ready(NewNote),
}

/// A note that has been built but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    /// Where the note goes.
    pub note: Note,
    /// The note's contents.
    pub lines: Vec<String>,
    /// The note its contents were carried forward from.
    pub previous: Option<Note>,
}

/// The result of writing a new note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// The note that was written.
    pub note: Note,
    /// The previous note, if its `{{next_note}}` macros were filled in.
    pub linked: Option<Note>,
}

/// A notes folder and its configuration.
#[derive(Debug, Clone)]
pub struct Notebook {
    root: PathBuf,
    config: Config,
    directory: NoteDirectory,
}

impl Notebook {
    /// Opens the notebook at `root`.
    ///
    /// A missing configuration file means the default configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration file cannot be parsed or names an invalid
    /// date format.
    pub fn open(root: PathBuf) -> Result<Self, NotebookError> {
        let path = Self::config_path(&root);
        let config = if path.exists() {
            Config::load(&path).map_err(NotebookError::Config)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Config::default()
        };
        Self::with_config(root, config)
    }

    /// Opens the notebook at `root` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration names an invalid date format.
    pub fn with_config(root: PathBuf, config: Config) -> Result<Self, NotebookError> {
        let directory = NoteDirectory::new(root.join(&config.note_dir), config.date_format())?;
        Ok(Self {
            root,
            config,
            directory,
        })
    }

    /// The location of the configuration file for the notebook at `root`.
    #[must_use]
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join("config.toml")
    }

    /// The notebook's root folder.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The notebook's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The folder daily notes are stored in.
    #[must_use]
    pub const fn directory(&self) -> &NoteDirectory {
        &self.directory
    }

    /// The path of the template file.
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.config.template)
    }

    /// Builds the note for `today` without writing anything.
    ///
    /// `now` is the creation time exposed to `{{date}}` and `{{time}}`.
    ///
    /// # Errors
    ///
    /// Fails if the template or previous note cannot be read, or if the merge
    /// cycle fails.
    #[instrument(skip(self, now))]
    pub fn prepare(
        &self,
        today: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<Outcome, NotebookError> {
        let note = self.directory.note(today);
        if note.path.exists() {
            return Ok(Outcome::Exists(note));
        }

        let previous = self.directory.previous_note(today);
        let template_path = self.template_path();
        let raw = fs::read_to_string(&template_path).map_err(|source| NotebookError::Io {
            path: template_path,
            source,
        })?;

        let context = TemplateContext {
            now,
            title: note.name.clone(),
            previous_note: previous.as_ref().map(|previous| self.reference(previous)),
        };
        let rendered: Vec<String> = template::render(&raw, &context)?
            .lines()
            .map(ToString::to_string)
            .collect();

        let previous_lines = match &previous {
            Some(previous) => Some(read_lines(&previous.path).map_err(|source| {
                NotebookError::Io {
                    path: previous.path.clone(),
                    source,
                }
            })?),
            None => None,
        };

        let input = CycleInput {
            template: &rendered,
            previous: previous
                .as_ref()
                .zip(previous_lines.as_deref())
                .map(|(previous, lines)| PreviousNote {
                    name: &previous.name,
                    date: previous.date,
                    lines,
                }),
            today,
        };
        let lines = run_cycle(&input, &self.config.settings())?;

        Ok(Outcome::Ready(NewNote {
            note,
            lines,
            previous,
        }))
    }

    /// Writes a prepared note, then fills the `{{next_note}}` macros of the
    /// note it was carried forward from.
    ///
    /// # Errors
    ///
    /// Fails if either file cannot be written.
    #[instrument(skip_all, fields(note = %new.note.name))]
    pub fn write(&self, new: &NewNote) -> Result<Created, NotebookError> {
        write_lines(&new.note.path, &new.lines).map_err(|source| NotebookError::Io {
            path: new.note.path.clone(),
            source,
        })?;

        let linked = match &new.previous {
            Some(previous) => self.link(previous, &new.note)?.then(|| previous.clone()),
            None => None,
        };

        Ok(Created {
            note: new.note.clone(),
            linked,
        })
    }

    /// The obligations declared in the template, before macro expansion.
    ///
    /// # Errors
    ///
    /// Fails if the template cannot be read or holds a malformed directive.
    pub fn obligations(&self) -> Result<Vec<Obligation>, NotebookError> {
        let path = self.template_path();
        let lines = read_lines(&path).map_err(|source| NotebookError::Io { path, source })?;
        recurrence::obligations(&lines).map_err(|error| CycleError::from(error).into())
    }

    /// Fills the `{{next_note}}` macros in `previous`. Returns whether the
    /// note changed.
    fn link(&self, previous: &Note, next: &Note) -> Result<bool, NotebookError> {
        let io_error = |source: io::Error| NotebookError::Io {
            path: previous.path.clone(),
            source,
        };

        let text = fs::read_to_string(&previous.path).map_err(io_error)?;
        let linked = template::render_next_note(&text, &self.reference(next));
        if linked == text {
            return Ok(false);
        }

        fs::write(&previous.path, linked).map_err(io_error)?;
        tracing::debug!(previous = %previous.name, "linked to next note");
        Ok(true)
    }

    /// The macro view of `note`, with its path relative to the notebook root.
    fn reference(&self, note: &Note) -> NoteReference {
        let path = note.path.strip_prefix(&self.root).unwrap_or(&note.path);
        let path = path
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        NoteReference {
            name: note.name.clone(),
            path,
        }
    }
}
