use crate::glossary::record::{GlossaryKey, TermRecord};
use crate::glossary::source::SourceFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Position of a record in the record table
pub type RecordId = u32;

/// Position of a glossary in the glossary table of `meta.json`
pub type GlossaryId = u32;

/// A trigram is a 3-byte sequence stored as u32 (only lower 24 bits used)
pub type Trigram = u32;

/// On-disk format version; readers refuse other versions
pub const INDEX_VERSION: u32 = 1;

pub const META_FILE: &str = "meta.json";
pub const RECORDS_FILE: &str = "records.bin";
pub const TOKENS_DICT_FILE: &str = "tokens.dict";
pub const TOKENS_POSTINGS_FILE: &str = "tokens.postings";
pub const GRAMS_DICT_FILE: &str = "grams.dict";
pub const GRAMS_POSTINGS_FILE: &str = "grams.postings";

/// One indexed glossary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub id: GlossaryId,
    pub project: String,
    pub key: GlossaryKey,
    pub format: SourceFormat,
    /// Source file path relative to the repository root
    pub path: PathBuf,
    pub record_count: u32,
}

/// A record as held by the index: the term plus its glossary id
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: RecordId,
    pub glossary_id: GlossaryId,
    pub record: TermRecord,
}

/// Index metadata stored in meta.json.
///
/// Written last during a rebuild; its presence marks a complete index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub root_path: PathBuf,
    pub record_count: u32,
    pub token_count: u32,
    pub trigram_count: u32,
    pub glossaries: Vec<GlossaryEntry>,
    pub created_at: u64,
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            root_path: PathBuf::new(),
            record_count: 0,
            token_count: 0,
            trigram_count: 0,
            glossaries: Vec::new(),
            created_at: 0,
        }
    }
}

/// Dictionary entry mapping a term to its postings
#[derive(Debug, Clone, Copy)]
pub struct DictEntry {
    pub offset: u64,
    pub length: u32,
    pub doc_freq: u32,
}

/// Convert 3 bytes to a trigram
#[inline]
pub fn bytes_to_trigram(b0: u8, b1: u8, b2: u8) -> Trigram {
    ((b0 as u32) << 16) | ((b1 as u32) << 8) | (b2 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_trigram() {
        assert_eq!(bytes_to_trigram(b'a', b'b', b'c'), 0x616263);
    }

    #[test]
    fn test_meta_json_shape() {
        let meta = IndexMeta {
            glossaries: vec![GlossaryEntry {
                id: 0,
                project: "docs".into(),
                key: GlossaryKey::new("spec", "en", "ja"),
                format: SourceFormat::Yaml,
                path: PathBuf::from("projects/docs/glossary/spec.en.ja.yml"),
                record_count: 1,
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["version"], INDEX_VERSION);
        assert_eq!(json["glossaries"][0]["format"], "yaml");
        assert_eq!(json["glossaries"][0]["key"]["source_language"], "en");

        let parsed: IndexMeta = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.glossaries, meta.glossaries);
    }
}
