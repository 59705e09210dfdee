//! Output module for writing harvest tables and summaries
//!
//! This module handles:
//! - Writing the deduplicated result table as CSV
//! - Writing the per-query page-count diagnostic table
//! - Collecting and printing run statistics

mod csv_output;
pub mod stats;

pub use csv_output::{cell_text, write_page_rows, write_record_rows};
pub use stats::{print_statistics, HarvestStatistics};

use crate::state::{Harvest, PageReport};
use crate::HarvestError;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Result of writing one output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The table was written with this many data rows
    Written { path: PathBuf, row_count: usize },
    /// There was nothing to write; no file was created
    Empty,
}

impl WriteOutcome {
    /// Path of the written table, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Written { path, .. } => Some(path),
            Self::Empty => None,
        }
    }
}

/// Path of the result table for a session
pub fn results_path(directory: &Path, session_id: &str) -> PathBuf {
    directory.join(format!("{}.csv", session_id))
}

/// Path of the page-count table for a session
pub fn page_report_path(directory: &Path, session_id: &str) -> PathBuf {
    directory.join(format!("{}_pages.csv", session_id))
}

/// Writes the result table, unless no record was accepted
///
/// # Arguments
///
/// * `directory` - Output directory, created if missing
/// * `session_id` - Names the output file
/// * `harvest` - The drained session state
///
/// # Returns
///
/// * `Ok(WriteOutcome::Written)` - The table was written
/// * `Ok(WriteOutcome::Empty)` - No records; nothing was written
/// * `Err(HarvestError)` - The file could not be written
pub fn write_results(
    directory: &Path,
    session_id: &str,
    harvest: &Harvest,
) -> Result<WriteOutcome, HarvestError> {
    if harvest.records.is_empty() {
        return Ok(WriteOutcome::Empty);
    }

    fs::create_dir_all(directory)?;
    let path = results_path(directory, session_id);
    let file = BufWriter::new(File::create(&path)?);
    let row_count = write_record_rows(file, harvest)?;

    Ok(WriteOutcome::Written { path, row_count })
}

/// Writes the page-count table
///
/// Always written, so a run with zero records still shows what each query got.
pub fn write_page_report(
    directory: &Path,
    session_id: &str,
    report: &PageReport,
) -> Result<WriteOutcome, HarvestError> {
    fs::create_dir_all(directory)?;
    let path = page_report_path(directory, session_id);
    let file = BufWriter::new(File::create(&path)?);
    let row_count = write_page_rows(file, report)?;

    Ok(WriteOutcome::Written { path, row_count })
}
