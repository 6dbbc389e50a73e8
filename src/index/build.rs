use crate::error::Result;
use crate::glossary::discovery::{GlossaryFile, discover};
use crate::glossary::record::TermRecord;
use crate::glossary::source::read_rows;
use crate::index::writer::IndexWriter;
use crate::utils::Spinner;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// Counts reported by a rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub glossaries: usize,
    pub records: usize,
    /// Files with a malformed name or unparseable content
    pub skipped_files: usize,
    /// Rows with an empty source or target term
    pub skipped_rows: usize,
}

/// Result of loading one glossary file (computed in parallel)
struct LoadedGlossary {
    file: GlossaryFile,
    records: Vec<TermRecord>,
    skipped_rows: usize,
}

/// Read a glossary file and turn its rows into records
fn load_glossary(file: GlossaryFile) -> Result<LoadedGlossary> {
    let rows = read_rows(&file.path, file.format)?;
    tracing::debug!(path = %file.path.display(), rows = rows.len(), "loaded glossary");

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped_rows = 0;
    for (line, row) in rows.into_iter().enumerate() {
        match TermRecord::new(&file.key, row.source_term, row.target_term, Some(row.note)) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(path = %file.path.display(), row = line + 1, "skipping row: {err}");
                skipped_rows += 1;
            }
        }
    }

    Ok(LoadedGlossary {
        file,
        records,
        skipped_rows,
    })
}

/// Rebuild the index for `root_path` into `index_path`
pub fn rebuild(root_path: &Path, index_path: &Path) -> Result<RebuildSummary> {
    rebuild_with_progress(root_path, index_path, true)
}

/// Drop the index at `index_path` and repopulate it from every glossary
/// file under `root_path`.
///
/// Malformed file names, unparseable files and invalid rows are logged and
/// skipped. Only storage failures abort the rebuild.
pub fn rebuild_with_progress(
    root_path: &Path,
    index_path: &Path,
    silent: bool,
) -> Result<RebuildSummary> {
    let mut writer = IndexWriter::create(root_path, index_path)?;
    let mut summary = RebuildSummary::default();

    let spinner = Spinner::start("Discovering glossaries...", silent);
    let discovery = discover(root_path)?;

    for path in &discovery.malformed {
        tracing::warn!(path = %path.display(), "skipping file with malformed glossary name");
    }
    summary.skipped_files += discovery.malformed.len();

    spinner.set_message(&format!("Loading {} glossaries...", discovery.files.len()));

    // Parse in parallel; collect keeps discovery order so record ids are stable
    let loaded: Vec<(std::path::PathBuf, Result<LoadedGlossary>)> = discovery
        .files
        .into_par_iter()
        .map(|file| (file.path.clone(), load_glossary(file)))
        .collect();

    for (path, result) in loaded {
        match result {
            Ok(glossary) => {
                summary.skipped_rows += glossary.skipped_rows;
                writer.add_glossary(&glossary.file, glossary.records);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "skipping glossary: {err}");
                summary.skipped_files += 1;
            }
        }
    }

    summary.glossaries = writer.glossary_count();
    summary.records = writer.record_count();

    spinner.set_message("Writing index...");
    writer.write()?;
    spinner.finish(&format!(
        "Indexed {} records from {} glossaries",
        summary.records, summary.glossaries
    ));

    tracing::info!(
        root = %root_path.display(),
        glossaries = summary.glossaries,
        records = summary.records,
        skipped_files = summary.skipped_files,
        skipped_rows = summary.skipped_rows,
        "index rebuilt"
    );

    Ok(summary)
}
