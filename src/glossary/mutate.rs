//! Editing glossary source files.
//!
//! Mutations rewrite the source file only. The index is not touched; callers
//! rebuild it afterwards.

use crate::error::{GlossaryError, Result};
use crate::glossary::discovery::GlossaryFile;
use crate::glossary::record::{TermRecord, validate_pair};
use crate::glossary::source::{RawRow, read_rows, write_rows};

/// An open glossary file with its rows loaded in file order
#[derive(Debug)]
pub struct GlossarySource {
    file: GlossaryFile,
    rows: Vec<RawRow>,
}

impl GlossarySource {
    pub fn open(file: GlossaryFile) -> Result<Self> {
        let rows = read_rows(&file.path, file.format)?;
        Ok(Self { file, rows })
    }

    pub fn file(&self) -> &GlossaryFile {
        &self.file
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Valid rows as term records; invalid rows are left out
    pub fn records(&self) -> Vec<TermRecord> {
        self.rows
            .iter()
            .filter_map(|row| {
                TermRecord::new(
                    &self.file.key,
                    &row.source_term,
                    &row.target_term,
                    Some(row.note.clone()),
                )
                .ok()
            })
            .collect()
    }

    /// Rows whose source term equals `source_term`
    pub fn candidates(&self, source_term: &str) -> Vec<&RawRow> {
        self.rows
            .iter()
            .filter(|r| r.source_term == source_term)
            .collect()
    }

    fn check_fields(&self, fields: &[(&'static str, &str)]) -> Result<()> {
        fields
            .iter()
            .try_for_each(|&(field, value)| self.file.format.check_field(field, value))
    }

    fn position(&self, source_term: &str, target_term: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.matches(source_term, target_term))
    }

    /// Append a new pair; the (source, target) pair must be new
    pub fn add(&mut self, source_term: &str, target_term: &str, note: &str) -> Result<()> {
        validate_pair(source_term, target_term)?;
        self.check_fields(&[
            ("source_term", source_term),
            ("target_term", target_term),
            ("note", note),
        ])?;
        if self.position(source_term, target_term).is_some() {
            return Err(GlossaryError::DuplicateTerm {
                source_term: source_term.to_string(),
                target_term: target_term.to_string(),
            });
        }

        self.rows.push(RawRow::new(source_term, target_term, note));
        Ok(())
    }

    /// Change the target term and/or note of an existing pair
    pub fn update(
        &mut self,
        source_term: &str,
        target_term: &str,
        new_target: Option<&str>,
        new_note: Option<&str>,
    ) -> Result<()> {
        let idx = self
            .position(source_term, target_term)
            .ok_or_else(|| GlossaryError::TermNotFound {
                source_term: source_term.to_string(),
                target_term: target_term.to_string(),
            })?;

        if let Some(new_note) = new_note {
            self.check_fields(&[("note", new_note)])?;
        }
        if let Some(new_target) = new_target {
            validate_pair(source_term, new_target)?;
            self.check_fields(&[("target_term", new_target)])?;
            let collides = self
                .position(source_term, new_target)
                .is_some_and(|other| other != idx);
            if collides {
                return Err(GlossaryError::DuplicateTerm {
                    source_term: source_term.to_string(),
                    target_term: new_target.to_string(),
                });
            }
            self.rows[idx].target_term = new_target.to_string();
        }
        if let Some(new_note) = new_note {
            self.rows[idx].note = new_note.to_string();
        }

        Ok(())
    }

    /// Remove one (source, target) pair
    pub fn delete(&mut self, source_term: &str, target_term: &str) -> Result<RawRow> {
        let idx = self
            .position(source_term, target_term)
            .ok_or_else(|| GlossaryError::TermNotFound {
                source_term: source_term.to_string(),
                target_term: target_term.to_string(),
            })?;
        Ok(self.rows.remove(idx))
    }

    /// Remove every pair with this source term.
    ///
    /// More than one candidate requires `force`. Returns the removed rows.
    pub fn delete_all(&mut self, source_term: &str, force: bool) -> Result<Vec<RawRow>> {
        let candidates = self.candidates(source_term).len();
        if candidates == 0 {
            return Err(GlossaryError::TermNotFound {
                source_term: source_term.to_string(),
                target_term: "*".to_string(),
            });
        }
        if candidates > 1 && !force {
            return Err(GlossaryError::AmbiguousDelete {
                source_term: source_term.to_string(),
                candidates,
            });
        }

        let (removed, kept): (Vec<RawRow>, Vec<RawRow>) = std::mem::take(&mut self.rows)
            .into_iter()
            .partition(|r| r.source_term == source_term);
        self.rows = kept;
        Ok(removed)
    }

    /// Write the rows back to the source file
    pub fn save(&self) -> Result<()> {
        write_rows(&self.file.path, self.file.format, &self.rows)?;
        tracing::debug!(
            path = %self.file.path.display(),
            rows = self.rows.len(),
            "glossary saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::record::GlossaryKey;
    use crate::glossary::source::SourceFormat;
    use std::fs;

    fn open_with(content: &str, format: SourceFormat) -> (tempfile::TempDir, GlossarySource) {
        let dir = tempfile::tempdir().unwrap();
        let key = GlossaryKey::new("spec", "en", "ja");
        let path = dir
            .path()
            .join(crate::glossary::discovery::glossary_file_name(&key, format));
        fs::write(&path, content).unwrap();

        let file = GlossaryFile {
            project: "demo".into(),
            path,
            key,
            format,
        };
        let source = GlossarySource::open(file).unwrap();
        (dir, source)
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let (_dir, mut source) = open_with("user\tユーザ\n", SourceFormat::Tsv);
        assert!(matches!(
            source.add("user", "ユーザ", ""),
            Err(GlossaryError::DuplicateTerm { .. })
        ));
        source.add("user", "利用者", "").unwrap();
        assert_eq!(source.candidates("user").len(), 2);
    }

    #[test]
    fn test_add_rejects_empty() {
        let (_dir, mut source) = open_with("", SourceFormat::Tsv);
        assert!(matches!(
            source.add("user", "", ""),
            Err(GlossaryError::InvalidTerm { .. })
        ));
    }

    #[test]
    fn test_tsv_rejects_tabs_and_line_breaks() {
        let (_dir, mut source) = open_with("user\tユーザ\n", SourceFormat::Tsv);

        for (term, note) in [("sign\tin", ""), ("sign\nin", ""), ("sign in", "a\r\nb")] {
            assert!(matches!(
                source.add(term, "サインイン", note),
                Err(GlossaryError::InvalidTerm { .. })
            ));
        }
        assert!(matches!(
            source.update("user", "ユーザ", Some("ユー\tザ"), None),
            Err(GlossaryError::InvalidTerm { field: "target_term", .. })
        ));
        assert!(matches!(
            source.update("user", "ユーザ", Some("ユーザー"), Some("x\ny")),
            Err(GlossaryError::InvalidTerm { field: "note", .. })
        ));
        assert_eq!(source.rows(), &[RawRow::new("user", "ユーザ", "")]);

        source.save().unwrap();
        let reopened = GlossarySource::open(source.file().clone()).unwrap();
        assert_eq!(reopened.rows(), &[RawRow::new("user", "ユーザ", "")]);
    }

    #[test]
    fn test_csv_quotes_tabs_and_line_breaks() {
        let (_dir, mut source) = open_with("", SourceFormat::Csv);
        source.add("sign\tin", "サインイン", "a, b\nc").unwrap();
        source.save().unwrap();

        let reopened = GlossarySource::open(source.file().clone()).unwrap();
        assert_eq!(
            reopened.rows(),
            &[RawRow::new("sign\tin", "サインイン", "a, b\nc")]
        );
    }

    #[test]
    fn test_update() {
        let (_dir, mut source) = open_with("user\tユーザ\nuser\t利用者\n", SourceFormat::Tsv);

        assert!(matches!(
            source.update("user", "ユーザー", None, Some("x")),
            Err(GlossaryError::TermNotFound { .. })
        ));
        assert!(matches!(
            source.update("user", "ユーザ", Some("利用者"), None),
            Err(GlossaryError::DuplicateTerm { .. })
        ));

        source
            .update("user", "ユーザ", Some("ユーザー"), Some("長音あり"))
            .unwrap();
        assert_eq!(source.rows()[0], RawRow::new("user", "ユーザー", "長音あり"));
    }

    #[test]
    fn test_delete_all_requires_force() {
        let (_dir, mut source) =
            open_with("user\tユーザ\nuser\t利用者\nfile\tファイル\n", SourceFormat::Tsv);

        assert!(matches!(
            source.delete_all("user", false),
            Err(GlossaryError::AmbiguousDelete { candidates: 2, .. })
        ));
        assert_eq!(source.rows().len(), 3);

        let removed = source.delete_all("user", true).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(source.rows(), &[RawRow::new("file", "ファイル", "")]);
    }

    #[test]
    fn test_delete_all_single_candidate() {
        let (_dir, mut source) = open_with("file\tファイル\n", SourceFormat::Tsv);
        assert_eq!(source.delete_all("file", false).unwrap().len(), 1);
        assert!(matches!(
            source.delete_all("file", false),
            Err(GlossaryError::TermNotFound { .. })
        ));
    }

    #[test]
    fn test_save_and_reopen() {
        let (_dir, mut source) = open_with("", SourceFormat::Yaml);
        source.add("user", "ユーザ", "ユーザーではない").unwrap();
        source.save().unwrap();

        let reopened = GlossarySource::open(source.file().clone()).unwrap();
        let records = reopened.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note, "ユーザーではない");
        assert_eq!(records[0].glossary_name, "spec");
    }
}
