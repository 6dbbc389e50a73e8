use crate::error::{GlossaryError, Result};
use crate::glossary::record::TermRecord;
use crate::index::types::*;
use crate::utils::{delta_decode, normalize_term, read_str, read_u32_le, read_u64_le};
use memmap2::Mmap;
use roaring::RoaringBitmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sorted dictionary of keys with their postings location
struct Dictionary<K> {
    entries: Vec<(K, DictEntry)>,
}

impl<K: Ord> Dictionary<K> {
    fn lookup<Q>(&self, key: &Q) -> Option<&DictEntry>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries
            .binary_search_by(|(k, _)| <K as std::borrow::Borrow<Q>>::borrow(k).cmp(key))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Memory-mapped postings file; `None` when the file is empty
struct Postings(Option<Mmap>);

impl Postings {
    fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self(None));
        }
        // SAFETY: index files are only replaced by a full rebuild, which
        // removes the directory rather than writing in place
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self(Some(mmap)))
    }

    fn decode(&self, entry: &DictEntry) -> RoaringBitmap {
        let Some(ref mmap) = self.0 else {
            return RoaringBitmap::new();
        };

        let start = entry.offset as usize;
        let end = start + entry.length as usize;
        if end > mmap.len() {
            return RoaringBitmap::new();
        }

        delta_decode(&mmap[start..end]).into_iter().collect()
    }
}

/// Read-only handle on a built index.
///
/// Opening loads the record table and both dictionaries; postings stay
/// memory-mapped. Dropping the handle releases the mappings.
pub struct IndexReader {
    pub meta: IndexMeta,
    records: Vec<StoredRecord>,
    /// Normalized source term per record, same order as `records`
    normalized: Vec<String>,
    token_dict: Dictionary<String>,
    token_postings: Postings,
    trigram_dict: Dictionary<Trigram>,
    trigram_postings: Postings,
}

impl IndexReader {
    /// Open the index stored at `index_path`
    pub fn open(index_path: &Path) -> Result<Self> {
        let meta_path = index_path.join(META_FILE);
        if !meta_path.exists() {
            return Err(GlossaryError::IndexUnavailable {
                path: index_path.to_path_buf(),
            });
        }

        let corrupt = |e: std::io::Error| GlossaryError::corrupt(index_path, e);

        let meta_file = File::open(&meta_path).map_err(corrupt)?;
        let meta: IndexMeta = serde_json::from_reader(BufReader::new(meta_file))
            .map_err(|e| GlossaryError::corrupt(index_path, e))?;
        if meta.version != INDEX_VERSION {
            return Err(GlossaryError::corrupt(
                index_path,
                format!("unsupported index version {}", meta.version),
            ));
        }

        let records = read_records(index_path, &meta).map_err(corrupt)?;
        let normalized = records
            .iter()
            .map(|r| normalize_term(&r.record.source_term))
            .collect();

        let token_dict = read_dictionary(&index_path.join(TOKENS_DICT_FILE), |r| read_str(r))
            .map_err(corrupt)?;
        let trigram_dict = read_dictionary(&index_path.join(GRAMS_DICT_FILE), |r| read_u32_le(r))
            .map_err(corrupt)?;
        let token_postings = Postings::open(&index_path.join(TOKENS_POSTINGS_FILE)).map_err(corrupt)?;
        let trigram_postings =
            Postings::open(&index_path.join(GRAMS_POSTINGS_FILE)).map_err(corrupt)?;

        tracing::debug!(
            path = %index_path.display(),
            records = records.len(),
            tokens = token_dict.len(),
            trigrams = trigram_dict.len(),
            "index opened"
        );

        Ok(Self {
            meta,
            records,
            normalized,
            token_dict,
            token_postings,
            trigram_dict,
            trigram_postings,
        })
    }

    /// Get all records in id order
    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&StoredRecord> {
        self.records.get(id as usize)
    }

    /// Normalized source term of a record
    pub fn normalized_source(&self, id: RecordId) -> Option<&str> {
        self.normalized.get(id as usize).map(String::as_str)
    }

    pub fn glossary(&self, id: GlossaryId) -> Option<&GlossaryEntry> {
        self.meta.glossaries.get(id as usize)
    }

    /// Get records whose source term contains `token` as a whole word
    pub fn get_token_records(&self, token: &str) -> RoaringBitmap {
        self.token_dict
            .lookup(token)
            .map(|entry| self.token_postings.decode(entry))
            .unwrap_or_default()
    }

    /// Get records whose normalized source term contains the trigram
    pub fn get_trigram_records(&self, trigram: Trigram) -> RoaringBitmap {
        self.trigram_dict
            .lookup(&trigram)
            .map(|entry| self.trigram_postings.decode(entry))
            .unwrap_or_default()
    }

    /// Number of records containing the trigram
    pub fn get_trigram_doc_freq(&self, trigram: Trigram) -> u32 {
        self.trigram_dict
            .lookup(&trigram)
            .map(|e| e.doc_freq)
            .unwrap_or(0)
    }

    /// Every record id
    pub fn all_record_ids(&self) -> RoaringBitmap {
        (0..self.records.len() as RecordId).collect()
    }
}

/// Read the record table, attaching glossary identities from the meta table
fn read_records(index_path: &Path, meta: &IndexMeta) -> std::io::Result<Vec<StoredRecord>> {
    let mut file = BufReader::new(File::open(index_path.join(RECORDS_FILE))?);

    let count = read_u32_le(&mut file)? as usize;
    let mut records = Vec::with_capacity(count);

    for id in 0..count {
        let glossary_id = read_u32_le(&mut file)?;
        let source_term = read_str(&mut file)?;
        let target_term = read_str(&mut file)?;
        let note = read_str(&mut file)?;

        let glossary = meta.glossaries.get(glossary_id as usize).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("record {id} refers to unknown glossary {glossary_id}"),
            )
        })?;

        records.push(StoredRecord {
            id: id as RecordId,
            glossary_id,
            record: TermRecord {
                glossary_name: glossary.key.name.clone(),
                source_language: glossary.key.source_language.clone(),
                target_language: glossary.key.target_language.clone(),
                source_term,
                target_term,
                note,
            },
        });
    }

    Ok(records)
}

/// Read a dictionary written by the index writer.
/// Entries are already sorted from the BTreeMap write.
fn read_dictionary<K>(
    path: &Path,
    read_key: impl Fn(&mut BufReader<File>) -> std::io::Result<K>,
) -> std::io::Result<Dictionary<K>> {
    let mut file = BufReader::new(File::open(path)?);

    let count = read_u32_le(&mut file)? as usize;
    let mut entries = Vec::with_capacity(count);

    for _ in 0..count {
        let key = read_key(&mut file)?;
        let offset = read_u64_le(&mut file)?;
        let length = read_u32_le(&mut file)?;
        let doc_freq = read_u32_le(&mut file)?;
        entries.push((
            key,
            DictEntry {
                offset,
                length,
                doc_freq,
            },
        ));
    }

    // Trailing bytes mean the writer and reader disagree on the layout
    let mut rest = [0u8; 1];
    if file.read(&mut rest)? != 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("trailing data in {}", path.display()),
        ));
    }

    Ok(Dictionary { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::discovery::GlossaryFile;
    use crate::glossary::record::GlossaryKey;
    use crate::glossary::source::SourceFormat;
    use crate::index::writer::IndexWriter;
    use crate::utils::query_trigrams;
    use std::path::PathBuf;

    fn build(dir: &Path) -> PathBuf {
        let index = dir.join("index");
        let mut writer = IndexWriter::create(dir, &index).unwrap();
        let key = GlossaryKey::new("spec", "en", "ja");
        let file = GlossaryFile {
            project: "docs".into(),
            path: dir.join("projects/docs/glossary/spec.en.ja.yml"),
            key: key.clone(),
            format: SourceFormat::Yaml,
        };
        writer.add_glossary(
            &file,
            vec![
                TermRecord::new(&key, "User", "ユーザ", Some("ユーザーではない".into())).unwrap(),
                TermRecord::new(&key, "user name", "ユーザ名", None).unwrap(),
                TermRecord::new(&key, "server", "サーバー", None).unwrap(),
            ],
        );
        writer.write().unwrap();
        index
    }

    #[test]
    fn test_open_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            IndexReader::open(&dir.path().join("nothing")),
            Err(GlossaryError::IndexUnavailable { .. })
        ));
    }

    #[test]
    fn test_open_reads_records() {
        let dir = tempfile::tempdir().unwrap();
        let reader = IndexReader::open(&build(dir.path())).unwrap();

        assert_eq!(reader.records().len(), 3);
        let first = &reader.record(0).unwrap().record;
        assert_eq!(first.source_term, "User");
        assert_eq!(first.note, "ユーザーではない");
        assert_eq!(first.glossary_name, "spec");
        assert_eq!(reader.normalized_source(0), Some("user"));
        assert_eq!(reader.glossary(0).unwrap().project, "docs");
    }

    #[test]
    fn test_token_postings() {
        let dir = tempfile::tempdir().unwrap();
        let reader = IndexReader::open(&build(dir.path())).unwrap();

        let user: Vec<u32> = reader.get_token_records("user").iter().collect();
        assert_eq!(user, vec![0, 1]);
        assert!(reader.get_token_records("nothing").is_empty());
    }

    #[test]
    fn test_trigram_postings() {
        let dir = tempfile::tempdir().unwrap();
        let reader = IndexReader::open(&build(dir.path())).unwrap();

        let mut hits = reader.all_record_ids();
        for trigram in query_trigrams("ser") {
            hits &= reader.get_trigram_records(trigram);
        }
        // "user", "user name", "server"
        assert_eq!(hits.len(), 3);
        assert_eq!(reader.get_trigram_doc_freq(query_trigrams("ver")[0]), 1);
    }

    #[test]
    fn test_version_mismatch_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let index = build(dir.path());
        let meta_path = index.join(META_FILE);
        let mut meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&meta_path).unwrap()).unwrap();
        meta["version"] = serde_json::json!(99);
        std::fs::write(&meta_path, meta.to_string()).unwrap();

        assert!(matches!(
            IndexReader::open(&index),
            Err(GlossaryError::CorruptIndex { .. })
        ));
    }
}
