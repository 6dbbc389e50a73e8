use crate::error::{GlossaryError, Result};
use crate::glossary::discovery::GlossaryFile;
use crate::glossary::record::TermRecord;
use crate::index::types::*;
use crate::utils::{
    delta_encode, extract_tokens, extract_trigrams, normalize_term, write_str, write_u32_le,
    write_u64_le,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Accumulates glossaries and records in memory, then writes a fresh index.
///
/// Record ids are assigned in insertion order, so the order glossaries are
/// added in is the order lookups report ties in.
pub struct IndexWriter {
    root_path: PathBuf,
    index_path: PathBuf,
    glossaries: Vec<GlossaryEntry>,
    records: Vec<(GlossaryId, TermRecord)>,
    /// Token -> record ids (ascending by construction)
    token_postings: BTreeMap<String, Vec<RecordId>>,
    /// Trigram -> record ids (ascending by construction)
    trigram_postings: BTreeMap<Trigram, Vec<RecordId>>,
}

impl IndexWriter {
    /// Create a writer targeting an empty index directory.
    ///
    /// Any existing index at `index_path` is removed first.
    pub fn create(root_path: &Path, index_path: &Path) -> Result<Self> {
        if index_path.exists() {
            fs::remove_dir_all(index_path).map_err(|e| GlossaryError::storage(index_path, e))?;
        }
        fs::create_dir_all(index_path).map_err(|e| GlossaryError::storage(index_path, e))?;

        Ok(Self {
            root_path: root_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            glossaries: Vec::new(),
            records: Vec::new(),
            token_postings: BTreeMap::new(),
            trigram_postings: BTreeMap::new(),
        })
    }

    /// Add a glossary and its records
    pub fn add_glossary(&mut self, file: &GlossaryFile, records: Vec<TermRecord>) -> GlossaryId {
        let glossary_id = self.glossaries.len() as GlossaryId;
        let rel_path = file
            .path
            .strip_prefix(&self.root_path)
            .unwrap_or(&file.path)
            .to_path_buf();

        self.glossaries.push(GlossaryEntry {
            id: glossary_id,
            project: file.project.clone(),
            key: file.key.clone(),
            format: file.format,
            path: rel_path,
            record_count: records.len() as u32,
        });

        for record in records {
            self.add_record(glossary_id, record);
        }

        glossary_id
    }

    fn add_record(&mut self, glossary_id: GlossaryId, record: TermRecord) -> RecordId {
        let record_id = self.records.len() as RecordId;
        let normalized = normalize_term(&record.source_term);

        for token in extract_tokens(&normalized) {
            self.token_postings.entry(token).or_default().push(record_id);
        }
        for trigram in extract_trigrams(normalized.as_bytes()) {
            self.trigram_postings
                .entry(trigram)
                .or_default()
                .push(record_id);
        }

        self.records.push((glossary_id, record));
        record_id
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn glossary_count(&self) -> usize {
        self.glossaries.len()
    }

    /// Write all index files; `meta.json` goes last
    pub fn write(self) -> Result<IndexMeta> {
        let storage = |e: std::io::Error| GlossaryError::storage(&self.index_path, e);

        self.write_records().map_err(storage)?;
        write_postings(
            &self.index_path,
            TOKENS_DICT_FILE,
            TOKENS_POSTINGS_FILE,
            &self.token_postings,
            |w, token| write_str(w, token),
        )
        .map_err(storage)?;
        write_postings(
            &self.index_path,
            GRAMS_DICT_FILE,
            GRAMS_POSTINGS_FILE,
            &self.trigram_postings,
            |w, trigram| write_u32_le(w, *trigram),
        )
        .map_err(storage)?;

        let meta = IndexMeta {
            version: INDEX_VERSION,
            root_path: self.root_path.clone(),
            record_count: self.records.len() as u32,
            token_count: self.token_postings.len() as u32,
            trigram_count: self.trigram_postings.len() as u32,
            glossaries: self.glossaries.clone(),
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let meta_path = self.index_path.join(META_FILE);
        let meta_storage = |e: std::io::Error| GlossaryError::storage(&meta_path, e);
        let mut file = BufWriter::new(File::create(&meta_path).map_err(meta_storage)?);
        serde_json::to_writer_pretty(&mut file, &meta)
            .map_err(|e| GlossaryError::storage(&meta_path, e))?;
        file.flush().map_err(meta_storage)?;

        Ok(meta)
    }

    /// Record table: count, then per record the glossary id and
    /// length-prefixed source, target and note
    fn write_records(&self) -> std::io::Result<()> {
        let path = self.index_path.join(RECORDS_FILE);
        let mut file = BufWriter::new(File::create(&path)?);

        write_u32_le(&mut file, self.records.len() as u32)?;
        for (glossary_id, record) in &self.records {
            write_u32_le(&mut file, *glossary_id)?;
            write_str(&mut file, &record.source_term)?;
            write_str(&mut file, &record.target_term)?;
            write_str(&mut file, &record.note)?;
        }

        file.flush()
    }
}

/// Write a sorted dictionary and its delta-encoded postings.
///
/// Dictionary layout: count, then per entry the key, postings offset (u64),
/// encoded length (u32) and document frequency (u32).
fn write_postings<K>(
    index_path: &Path,
    dict_name: &str,
    postings_name: &str,
    postings: &BTreeMap<K, Vec<RecordId>>,
    write_key: impl Fn(&mut BufWriter<File>, &K) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let mut dict_file = BufWriter::new(File::create(index_path.join(dict_name))?);
    let mut postings_file = BufWriter::new(File::create(index_path.join(postings_name))?);

    write_u32_le(&mut dict_file, postings.len() as u32)?;

    let mut offset: u64 = 0;
    for (key, ids) in postings {
        // Ids are pushed in ascending order; a term can repeat within a record
        let mut ids = ids.clone();
        ids.dedup();

        let mut encoded = Vec::new();
        delta_encode(&ids, &mut encoded);

        write_key(&mut dict_file, key)?;
        write_u64_le(&mut dict_file, offset)?;
        write_u32_le(&mut dict_file, encoded.len() as u32)?;
        write_u32_le(&mut dict_file, ids.len() as u32)?;

        postings_file.write_all(&encoded)?;
        offset += encoded.len() as u64;
    }

    dict_file.flush()?;
    postings_file.flush()
}
