use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{cycle::Settings, scope::Boundaries};

/// Configuration for a notes folder.
///
/// This struct holds where notes and the template live, how notes are named,
/// and the options that control what is carried forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The folder daily notes are stored in, relative to the root.
    pub note_dir: PathBuf,

    /// The template file new notes are built from, relative to the root.
    pub template: PathBuf,

    /// The strftime format of note file names.
    ///
    /// The format may contain `/` to place notes in subfolders, for example
    /// `%Y/%m/%Y-%m-%d`.
    date_format: String,

    /// The line that starts the carried region. Everything before it in the
    /// template is copied as is, and everything before it in the previous
    /// note is ignored.
    pub initial: Option<String>,

    /// The line that ends the carried region.
    pub terminal: Option<String>,

    /// Delete headings that have no content left.
    pub delete_empty_headings: bool,

    /// Never delete headings that come from the template.
    pub keep_template_headings: bool,

    /// Only delete to-dos once their parent and all its children are checked.
    pub keep_until_parent_complete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            note_dir: default_note_dir(),
            template: default_template(),
            date_format: default_date_format(),
            initial: None,
            terminal: None,
            delete_empty_headings: true,
            keep_template_headings: true,
            keep_until_parent_complete: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the strftime format of note file names.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Sets the note file name format.
    ///
    /// A blank format restores the default.
    pub fn set_date_format(&mut self, format: String) {
        self.date_format = if format.trim().is_empty() {
            default_date_format()
        } else {
            format
        };
    }

    /// The region boundaries.
    #[must_use]
    pub fn boundaries(&self) -> Boundaries {
        Boundaries {
            initial: self.initial.clone(),
            terminal: self.terminal.clone(),
        }
    }

    /// The explicit settings bundle handed to a merge cycle.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            boundaries: self.boundaries(),
            delete_empty_headings: self.delete_empty_headings,
            keep_template_headings: self.keep_template_headings,
            keep_until_parent_complete: self.keep_until_parent_complete,
        }
    }
}

fn default_note_dir() -> PathBuf {
    PathBuf::from("daily")
}

fn default_template() -> PathBuf {
    PathBuf::from("template.md")
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_note_dir")]
        note_dir: PathBuf,

        #[serde(default = "default_template")]
        template: PathBuf,

        #[serde(default = "default_date_format")]
        date_format: String,

        /// Empty strings are treated as unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        terminal: Option<String>,

        #[serde(default = "default_true")]
        delete_empty_headings: bool,

        #[serde(default = "default_true")]
        keep_template_headings: bool,

        #[serde(default)]
        keep_until_parent_complete: bool,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                note_dir,
                template,
                date_format,
                initial,
                terminal,
                delete_empty_headings,
                keep_template_headings,
                keep_until_parent_complete,
            } => {
                let mut config = Self {
                    note_dir,
                    template,
                    date_format: String::new(),
                    initial: initial.filter(|line| !line.is_empty()),
                    terminal: terminal.filter(|line| !line.is_empty()),
                    delete_empty_headings,
                    keep_template_headings,
                    keep_until_parent_complete,
                };
                config.set_date_format(date_format);
                config
            }
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            note_dir: config.note_dir,
            template: config.template,
            date_format: config.date_format,
            initial: config.initial,
            terminal: config.terminal,
            delete_empty_headings: config.delete_empty_headings,
            keep_template_headings: config.keep_template_headings,
            keep_until_parent_complete: config.keep_until_parent_complete,
        }
    }
}
