//! CSV export of ranked results: `name,score,reason`, UTF-8, one row per resume.

use anyhow::{Context, Result};

use crate::ranking::scorer::ScoreResult;

pub const CSV_FILENAME: &str = "resume_rankings.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Serializes results in the given order. Fields containing commas, quotes
/// or newlines are quoted by the writer.
pub fn results_to_csv(results: &[ScoreResult]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(["name", "score", "reason"])
        .context("Failed to write CSV headers")?;
    for result in results {
        writer
            .serialize(result)
            .with_context(|| format!("Failed to write CSV row for {}", result.name))?;
    }

    writer.into_inner().context("Failed to retrieve CSV data")
}
