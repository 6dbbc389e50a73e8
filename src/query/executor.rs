use crate::error::Result;
use crate::glossary::record::TermRecord;
use crate::index::reader::IndexReader;
use crate::index::types::{RecordId, Trigram};
use crate::query::matcher::{MappedTerm, MatchKind, Snippet, classify, normalize_query};
use crate::utils::{is_single_token, query_trigrams};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A lookup query with its optional filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub term: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    /// Glossary name whose hits are listed first
    pub preferred_glossary: Option<String>,
    pub limit: Option<usize>,
}

impl LookupRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.source_language = Some(lang.into());
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.target_language = Some(lang.into());
        self
    }

    pub fn preferred_glossary(mut self, name: impl Into<String>) -> Self {
        self.preferred_glossary = Some(name.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn accepts(&self, record: &TermRecord) -> bool {
        self.source_language
            .as_deref()
            .is_none_or(|lang| record.source_language == lang)
            && self
                .target_language
                .as_deref()
                .is_none_or(|lang| record.target_language == lang)
    }
}

/// One lookup result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupHit {
    pub record_id: RecordId,
    /// Project holding the glossary file
    pub project: String,
    #[serde(flatten)]
    pub record: TermRecord,
    pub match_kind: MatchKind,
    pub snippets: Vec<Snippet>,
}

/// Executes lookups against an open index
pub struct LookupEngine<'a> {
    reader: &'a IndexReader,
}

impl<'a> LookupEngine<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self { reader }
    }

    /// Find, filter and order hits for a request.
    ///
    /// Hits are ordered by match kind, then by record id. With a preferred
    /// glossary, its hits move to the front keeping their relative order.
    pub fn execute(&self, request: &LookupRequest) -> Result<Vec<LookupHit>> {
        let query = normalize_query(&request.term);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.candidates(&query);
        let token_hits = if is_single_token(&query) {
            self.reader.get_token_records(&query)
        } else {
            RoaringBitmap::new()
        };

        let mut ranked: Vec<(MatchKind, RecordId)> = Vec::new();
        for id in candidates.iter() {
            let (Some(stored), Some(normalized)) =
                (self.reader.record(id), self.reader.normalized_source(id))
            else {
                continue;
            };
            if !request.accepts(&stored.record) {
                continue;
            }

            let kind = match classify(normalized, &query) {
                Some(MatchKind::Exact) => MatchKind::Exact,
                Some(_) if token_hits.contains(id) => MatchKind::Token,
                Some(kind) => kind,
                None => continue,
            };
            ranked.push((kind, id));
        }

        // Stable sort keeps record id order within a kind
        ranked.sort_by_key(|&(kind, id)| (kind, id));

        let mut hits: Vec<LookupHit> = ranked
            .into_iter()
            .filter_map(|(kind, id)| self.make_hit(id, kind, &query))
            .collect();

        if let Some(ref preferred) = request.preferred_glossary {
            prefer_glossary(&mut hits, preferred);
        }
        if let Some(limit) = request.limit {
            hits.truncate(limit);
        }

        tracing::debug!(query = %query, hits = hits.len(), "lookup complete");
        Ok(hits)
    }

    /// Narrow with the trigram index; short queries scan the record table
    fn candidates(&self, query: &str) -> RoaringBitmap {
        let trigrams = query_trigrams(query);
        if trigrams.is_empty() {
            return self.reader.all_record_ids();
        }

        // Rarest trigram first; an unknown trigram rules everything out
        let mut by_freq: Vec<(u32, Trigram)> = trigrams
            .iter()
            .map(|&t| (self.reader.get_trigram_doc_freq(t), t))
            .collect();
        by_freq.sort_unstable();
        if by_freq.first().is_some_and(|&(freq, _)| freq == 0) {
            return RoaringBitmap::new();
        }

        let mut iter = by_freq.into_iter();
        let mut result = iter
            .next()
            .map(|(_, t)| self.reader.get_trigram_records(t))
            .unwrap_or_default();
        for (_, trigram) in iter {
            if result.is_empty() {
                break;
            }
            result &= self.reader.get_trigram_records(trigram);
        }
        result
    }

    fn make_hit(&self, id: RecordId, kind: MatchKind, query: &str) -> Option<LookupHit> {
        let stored = self.reader.record(id)?;
        let project = self.reader.glossary(stored.glossary_id)?.project.clone();
        let snippets = MappedTerm::new(&stored.record.source_term).snippets(query);
        Some(LookupHit {
            record_id: id,
            project,
            record: stored.record.clone(),
            match_kind: kind,
            snippets,
        })
    }
}

/// Stable two-bucket partition: preferred glossary first, then the rest
pub fn prefer_glossary(hits: &mut Vec<LookupHit>, glossary_name: &str) {
    let (mut preferred, others): (Vec<_>, Vec<_>) = std::mem::take(hits)
        .into_iter()
        .partition(|h| h.record.glossary_name == glossary_name);
    preferred.extend(others);
    *hits = preferred;
}

/// Open the index at `index_path` and run one lookup
pub fn lookup(index_path: &Path, request: &LookupRequest) -> Result<Vec<LookupHit>> {
    let reader = IndexReader::open(index_path)?;
    LookupEngine::new(&reader).execute(request)
}
