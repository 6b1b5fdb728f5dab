use std::path::Path;

use chrono::{Local, NaiveDate};
use obligator::{Notebook, domain::Obligation};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Due {
    /// The day to evaluate (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// An obligation evaluated for a given day.
struct Row<'a> {
    obligation: &'a Obligation,
    /// The directive falls on the day itself.
    today: bool,
    /// The line would be emitted, counting missed days.
    due: bool,
}

impl Due {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let notebook = Notebook::open(root.to_path_buf())?;
        let today = self.date.unwrap_or_else(|| Local::now().date_naive());
        let last_processed = notebook
            .directory()
            .previous_note(today)
            .map(|note| note.date);

        let obligations = notebook.obligations()?;
        let rows: Vec<Row<'_>> = obligations
            .iter()
            .map(|obligation| Row {
                obligation,
                today: obligation.directive.should_trigger(today),
                due: obligation
                    .directive
                    .should_emit_with_catchup(last_processed, today),
            })
            .collect();

        match self.output {
            OutputFormat::Json => Self::output_json(today, last_processed, &rows)?,
            OutputFormat::Table => Self::output_table(today, last_processed, &rows),
        }
        Ok(())
    }

    fn output_json(
        today: NaiveDate,
        last_processed: Option<NaiveDate>,
        rows: &[Row<'_>],
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let obligations: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "directive": row.obligation.source.trim(),
                    "line": row.obligation.payload,
                    "today": row.today,
                    "due": row.due,
                })
            })
            .collect();

        let output = json!({
            "date": today,
            "last_note": last_processed,
            "obligations": obligations,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(today: NaiveDate, last_processed: Option<NaiveDate>, rows: &[Row<'_>]) {
        if rows.is_empty() {
            println!("No obligations found in the template.");
            return;
        }

        match last_processed {
            Some(last) => println!("Obligations for {today} (last note {last})"),
            None => println!("Obligations for {today} (no earlier note)"),
        }
        println!();

        let width = rows
            .iter()
            .map(|row| row.obligation.source.trim().len())
            .max()
            .unwrap_or(0);

        for row in rows {
            let status = match (row.due, row.today) {
                (true, true) => format!("{:<6}", "due").success(),
                (true, false) => format!("{:<6}", "missed").warning(),
                (false, _) => format!("{:<6}", "-").dim(),
            };
            println!(
                "  {}  {:<width$}  {}",
                status,
                row.obligation.source.trim(),
                row.obligation.payload.trim(),
            );
        }
    }
}
