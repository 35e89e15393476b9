//! Bulk calendar seeding from a JSON file.
//!
//! The file holds an array of calendar entries in the stored wire format,
//! each optionally flagged with `"computeNextRun": true`.

use crate::error::CliError;
use mission_coord::Coordinator;
use mission_core::{Clock, MissionResult, NewCalendarEntry};
use mission_storage::EntityStore;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    #[serde(flatten)]
    pub entry: NewCalendarEntry,
    /// Fill `nextRunAt` from `cronExpr` before upserting.
    #[serde(default)]
    pub compute_next_run: bool,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub failed: Vec<String>,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.failed.len()
    }
}

pub fn parse_seed(contents: &str) -> Result<Vec<SeedEntry>, serde_json::Error> {
    serde_json::from_str(contents)
}

pub fn load_seed_file(path: &Path) -> Result<Vec<SeedEntry>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_seed(&contents).map_err(|e| CliError::SeedFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Upsert every entry by title, reporting each on its own line.
///
/// A failing entry does not stop the run; failures are collected in the report.
pub async fn seed_calendar<S, C, W>(
    coord: &Coordinator<S, C>,
    entries: Vec<SeedEntry>,
    out: &mut W,
) -> Result<SeedReport, CliError>
where
    S: EntityStore,
    C: Clock,
    W: Write,
{
    let mut report = SeedReport::default();
    for seed in entries {
        let title = seed.entry.title.clone();
        match upsert_one(coord, seed).await {
            Ok(upserted) => {
                let verb = if upserted.created { "created" } else { "updated" };
                writeln!(out, "{} calendar entry: {} ({})", verb, title, upserted.id)?;
                if upserted.created {
                    report.created += 1;
                } else {
                    report.updated += 1;
                }
            }
            Err(err) => {
                tracing::warn!(title = %title, error = %err, "Calendar seed entry failed");
                writeln!(out, "failed calendar entry: {} ({})", title, err)?;
                report.failed.push(title);
            }
        }
    }
    writeln!(
        out,
        "Seeding complete: {} created, {} updated, {} failed.",
        report.created,
        report.updated,
        report.failed.len()
    )?;
    Ok(report)
}

async fn upsert_one<S: EntityStore, C: Clock>(
    coord: &Coordinator<S, C>,
    seed: SeedEntry,
) -> MissionResult<mission_coord::Upserted> {
    let mut entry = seed.entry;
    if seed.compute_next_run {
        entry.next_run_at = Some(coord.next_run(&entry.cron_expr)?);
    }
    coord.upsert_calendar_entry(entry).await
}
