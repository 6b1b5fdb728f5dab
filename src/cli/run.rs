use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use obligator::{
    Notebook,
    storage::{NewNote, Outcome},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, clap::Parser)]
pub struct Run {
    /// The day to create the note for (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Print the note instead of writing it
    #[arg(long)]
    dry_run: bool,
}

impl Run {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let notebook = Notebook::open(root.to_path_buf())?;
        let now = self.now()?;
        let today = now.date_naive();

        let new = match notebook.prepare(today, now)? {
            Outcome::Exists(note) => {
                println!(
                    "{}",
                    format!("Note {} already exists at {}", note.name, note.path.display()).info()
                );
                return Ok(());
            }
            Outcome::Ready(new) => new,
        };

        if self.dry_run {
            Self::preview(&new);
            return Ok(());
        }

        let created = notebook.write(&new)?;
        println!(
            "{}",
            format!("✅ Created {}", created.note.path.display()).success()
        );
        match (&new.previous, &created.linked) {
            (_, Some(previous)) => {
                println!("{}", format!("Linked from {}", previous.name).dim());
            }
            (Some(previous), None) => {
                println!("{}", format!("Carried forward from {}", previous.name).dim());
            }
            (None, None) => {
                println!(
                    "{}",
                    "No earlier note found; started from the template".warning()
                );
            }
        }

        Ok(())
    }

    /// The creation time. An explicit date keeps the current time of day.
    fn now(&self) -> anyhow::Result<DateTime<FixedOffset>> {
        let local = Local::now();
        let Some(date) = self.date else {
            return Ok(local.fixed_offset());
        };
        date.and_time(local.time())
            .and_local_timezone(*local.offset())
            .single()
            .with_context(|| format!("{date} is not a valid local date"))
    }

    fn preview(new: &NewNote) {
        println!(
            "{}",
            format!("Would create {}:", new.note.path.display()).dim()
        );
        for line in &new.lines {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn run(root: &Path, date: &str, dry_run: bool) {
        Run {
            date: Some(date.parse().unwrap()),
            dry_run,
        }
        .run(root)
        .unwrap();
    }

    #[test]
    fn explicit_date_is_used() {
        let command = Run {
            date: Some(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            dry_run: false,
        };
        assert_eq!(
            command.now().unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("template.md"), "# Tasks\n").unwrap();

        run(tmp.path(), "2024-03-15", true);

        assert!(!tmp.path().join("daily").exists());
    }

    #[test]
    fn consecutive_days_carry_forward() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("template.md"), "# Tasks\n- [ ] daily\n").unwrap();

        run(tmp.path(), "2024-03-14", false);
        let first = tmp.path().join("daily/2024-03-14.md");
        fs::write(&first, "# Tasks\n- [x] daily\n- [ ] leftover\n").unwrap();

        run(tmp.path(), "2024-03-15", false);

        assert_eq!(
            fs::read_to_string(tmp.path().join("daily/2024-03-15.md")).unwrap(),
            "# Tasks\n- [ ] daily\n- [ ] leftover\n"
        );
    }
}
