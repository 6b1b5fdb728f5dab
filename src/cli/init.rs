use std::{fs, path::Path};

use obligator::{Config, Notebook, storage::CONFIG_DIR};
use tracing::instrument;

use super::terminal::Colorize;

/// The template written for a new notes folder.
///
/// Only the section between the `## Tasks` and `## Notes` headings is carried
/// forward, so the links and free-form notes start afresh each day.
const STARTER_TEMPLATE: &str = "\
# {{title}}

[[{{previous_note}}]] | [[{{next_note}}]]

## Tasks
{{ obligate * * 1-5 }}
- [ ] Review the inbox
{{ obligate 1 * * }}
- [ ] Pay the rent

## Notes
";

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Overwrite an existing template file
    #[arg(long)]
    force: bool,
}

impl Init {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = Notebook::config_path(root);
        if config_path.exists() {
            anyhow::bail!("Notes folder already initialized (found existing {CONFIG_DIR} directory)");
        }

        fs::create_dir_all(root.join(CONFIG_DIR))
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_DIR} directory: {e}"))?;

        let mut config = Config::default();
        config.initial = Some("## Tasks".to_string());
        config.terminal = Some("## Notes".to_string());
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        let notebook = Notebook::with_config(root.to_path_buf(), config)?;
        fs::create_dir_all(notebook.directory().root())
            .map_err(|e| anyhow::anyhow!("Failed to create notes directory: {e}"))?;

        let template_path = notebook.template_path();
        let wrote_template = self.force || !template_path.exists();
        if wrote_template {
            fs::write(&template_path, STARTER_TEMPLATE)
                .map_err(|e| anyhow::anyhow!("Failed to create template: {e}"))?;
        }

        println!("Initialized notes folder in {}", root.display());
        println!("  Created: {CONFIG_DIR}/config.toml");
        println!(
            "  Created: {}/",
            notebook.config().note_dir.display()
        );
        if wrote_template {
            println!("  Created: {}", notebook.config().template.display());
        } else {
            println!(
                "{}",
                format!(
                    "  Kept existing {} (use --force to replace it)",
                    notebook.config().template.display()
                )
                .dim()
            );
        }
        println!();
        println!("{}", "Next steps:".info());
        println!("  obligator run  # Create today's note");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use obligator::storage::read_lines;

    use super::*;

    #[test]
    fn init_creates_config_and_template() {
        let tmp = tempfile::tempdir().unwrap();
        Init { force: false }.run(tmp.path()).unwrap();

        let notebook = Notebook::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(notebook.config().initial.as_deref(), Some("## Tasks"));
        assert!(notebook.directory().root().is_dir());

        let template = read_lines(&notebook.template_path()).unwrap();
        assert!(template.iter().any(|line| line == "## Tasks"));
        assert_eq!(notebook.obligations().unwrap().len(), 2);
    }

    #[test]
    fn init_twice_fails() {
        let tmp = tempfile::tempdir().unwrap();
        Init { force: false }.run(tmp.path()).unwrap();
        assert!(Init { force: false }.run(tmp.path()).is_err());
    }

    #[test]
    fn existing_template_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("template.md"), "## Tasks\n## Notes\n").unwrap();

        Init { force: false }.run(tmp.path()).unwrap();

        assert_eq!(
            fs::read_to_string(tmp.path().join("template.md")).unwrap(),
            "## Tasks\n## Notes\n"
        );
    }
}
