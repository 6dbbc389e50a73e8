//! Readers and writers for glossary source files.
//!
//! A glossary file is one of three flat formats, chosen by extension:
//!
//! - `yml` - a sequence of mappings with `source_term`, `target_term`, `note`
//! - `csv` - `source_term,target_term[,note]`, no header
//! - `tsv` - same fields separated by tabs, no quoting

use crate::error::{GlossaryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlEmitter, YamlLoader};

/// Supported glossary file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Yaml,
    Csv,
    Tsv,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Yaml, SourceFormat::Csv, SourceFormat::Tsv];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "yml" => Some(SourceFormat::Yaml),
            "csv" => Some(SourceFormat::Csv),
            "tsv" => Some(SourceFormat::Tsv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Yaml => "yml",
            SourceFormat::Csv => "csv",
            SourceFormat::Tsv => "tsv",
        }
    }

    /// Parse glossary rows from file content
    pub fn parse(&self, content: &str) -> std::result::Result<Vec<RawRow>, String> {
        match self {
            SourceFormat::Yaml => parse_yaml(content),
            SourceFormat::Csv => parse_delimited(content, b',', true),
            SourceFormat::Tsv => parse_delimited(content, b'\t', false),
        }
    }

    /// Reject a field value this format cannot store verbatim.
    /// TSV has no quoting, so tabs and line breaks would split the row.
    pub fn check_field(&self, field: &'static str, value: &str) -> Result<()> {
        if *self == SourceFormat::Tsv && value.contains(['\t', '\n', '\r']) {
            return Err(GlossaryError::InvalidTerm {
                field,
                reason: "must not contain tabs or line breaks in a TSV glossary",
            });
        }
        Ok(())
    }

    /// Render glossary rows as file content
    pub fn render(&self, rows: &[RawRow]) -> Result<String> {
        match self {
            SourceFormat::Yaml => render_yaml(rows),
            SourceFormat::Csv => render_delimited(rows, b',', csv::QuoteStyle::Necessary),
            SourceFormat::Tsv => {
                for row in rows {
                    self.check_field("source_term", &row.source_term)?;
                    self.check_field("target_term", &row.target_term)?;
                    self.check_field("note", &row.note)?;
                }
                render_delimited(rows, b'\t', csv::QuoteStyle::Never)
            }
        }
    }
}

/// A row as stored in a source file, before validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub source_term: String,
    pub target_term: String,
    pub note: String,
}

impl RawRow {
    pub fn new(
        source_term: impl Into<String>,
        target_term: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            source_term: source_term.into(),
            target_term: target_term.into(),
            note: note.into(),
        }
    }

    pub fn matches(&self, source_term: &str, target_term: &str) -> bool {
        self.source_term == source_term && self.target_term == target_term
    }
}

/// Read all rows of a glossary file
pub fn read_rows(path: &Path, format: SourceFormat) -> Result<Vec<RawRow>> {
    let content = fs::read_to_string(path)?;
    format
        .parse(&content)
        .map_err(|reason| GlossaryError::source_parse(path, reason))
}

/// Overwrite a glossary file with the given rows
pub fn write_rows(path: &Path, format: SourceFormat, rows: &[RawRow]) -> Result<()> {
    let content = format.render(rows)?;
    fs::write(path, content)?;
    Ok(())
}

fn parse_yaml(content: &str) -> std::result::Result<Vec<RawRow>, String> {
    let docs = YamlLoader::load_from_str(content).map_err(|e| e.to_string())?;

    let mut rows = Vec::new();
    for doc in docs {
        let items = match doc {
            Yaml::Array(items) => items,
            Yaml::Null => continue,
            other => return Err(format!("expected a sequence of terms, found a {}", kind(&other))),
        };

        for (i, item) in items.iter().enumerate() {
            if !matches!(item, Yaml::Hash(_)) {
                return Err(format!("entry {} is not a mapping", i + 1));
            }
            rows.push(RawRow {
                source_term: scalar(&item["source_term"]).unwrap_or_default(),
                target_term: scalar(&item["target_term"]).unwrap_or_default(),
                note: scalar(&item["note"]).unwrap_or_default(),
            });
        }
    }

    Ok(rows)
}

/// Render a YAML scalar as text; numbers and booleans keep their literal form
fn scalar(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Yaml) -> &'static str {
    match value {
        Yaml::Hash(_) => "mapping",
        Yaml::Array(_) => "sequence",
        Yaml::Null | Yaml::BadValue => "nothing",
        _ => "scalar",
    }
}

fn render_yaml(rows: &[RawRow]) -> Result<String> {
    let items = rows
        .iter()
        .map(|row| {
            let mut hash = yaml_rust::yaml::Hash::new();
            hash.insert(
                Yaml::String("source_term".into()),
                Yaml::String(row.source_term.clone()),
            );
            hash.insert(
                Yaml::String("target_term".into()),
                Yaml::String(row.target_term.clone()),
            );
            hash.insert(Yaml::String("note".into()), Yaml::String(row.note.clone()));
            Yaml::Hash(hash)
        })
        .collect();

    let mut out = String::new();
    YamlEmitter::new(&mut out).dump(&Yaml::Array(items))?;
    out.push('\n');
    Ok(out)
}

fn parse_delimited(
    content: &str,
    delimiter: u8,
    quoting: bool,
) -> std::result::Result<Vec<RawRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quoting(quoting)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(RawRow {
            source_term: record.get(0).unwrap_or_default().to_string(),
            target_term: record.get(1).unwrap_or_default().to_string(),
            note: record.get(2).unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

fn render_delimited(rows: &[RawRow], delimiter: u8, quote_style: csv::QuoteStyle) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quote_style(quote_style)
        .from_writer(Vec::new());

    for row in rows {
        if row.note.is_empty() {
            writer.write_record([&row.source_term, &row.target_term])?;
        } else {
            writer.write_record([&row.source_term, &row.target_term, &row.note])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GlossaryError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
