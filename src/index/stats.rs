use crate::glossary::discovery::{discover, list_projects};
use crate::glossary::mutate::GlossarySource;
use crate::index::reader::IndexReader;
use anyhow::Result;
use std::path::Path;

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    let reader = IndexReader::open(index_path)?;
    let meta = &reader.meta;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Root path:        {}", meta.root_path.display());
    println!("Index location:   {}", index_path.display());
    println!("Index version:    {}", meta.version);
    println!("Glossary count:   {}", meta.glossaries.len());
    println!("Record count:     {}", meta.record_count);
    println!("Token count:      {}", meta.token_count);
    println!("Trigram count:    {}", meta.trigram_count);

    if !meta.glossaries.is_empty() {
        println!();
        println!("Records by glossary:");
        for glossary in &meta.glossaries {
            println!(
                "  {:30} {:>8}  {}",
                format!("{}/{}", glossary.project, glossary.key),
                glossary.record_count,
                glossary.format.extension()
            );
        }
    }

    if let Ok(size) = dir_size(index_path) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    println!();
    println!("Created:          {}", format_timestamp(meta.created_at));

    Ok(())
}

/// List projects and their glossaries, reading record counts from the sources
pub fn list_glossaries(root_path: &Path) -> Result<()> {
    let projects = list_projects(root_path)?;
    if projects.is_empty() {
        println!("No projects found under {}.", root_path.display());
        return Ok(());
    }

    let discovery = discover(root_path)?;

    for project in &projects {
        println!("{project}");

        let files: Vec<_> = discovery
            .files
            .iter()
            .filter(|f| &f.project == project)
            .collect();
        if files.is_empty() {
            println!("  (no glossaries)");
        }

        for file in files {
            match GlossarySource::open(file.clone()) {
                Ok(source) => println!(
                    "  {:40} {:>6} records",
                    file.file_name(),
                    source.records().len()
                ),
                Err(err) => println!("  {:40} [unreadable: {err}]", file.file_name()),
            }
        }
    }

    for path in &discovery.malformed {
        println!();
        println!("Ignored (malformed name): {}", path.display());
    }

    Ok(())
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    format!("{:?}", UNIX_EPOCH + Duration::from_secs(ts))
}
