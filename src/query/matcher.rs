//! Match classification and highlight snippets.
//!
//! Matching happens on normalized text (see [`normalize_term`]), but
//! snippets must slice the term as the user wrote it. [`MappedTerm`] keeps,
//! for every normalized character, the byte range it came from.

use crate::utils::{normalize_term, on_token_boundaries};
use memchr::memmem::Finder;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How a record's source term matched the query, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The whole term equals the query
    Exact,
    /// The query occurs on word boundaries
    Token,
    /// The term starts with the query
    Prefix,
    /// The query occurs inside a word
    Substring,
}

/// One highlight segment of a source term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Snippet {
    Text(String),
    Keyword(String),
}

impl Snippet {
    pub fn text(&self) -> &str {
        match self {
            Snippet::Text(s) | Snippet::Keyword(s) => s,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Snippet::Keyword(_))
    }
}

/// A normalized term with a back-mapping to the original bytes
pub struct MappedTerm<'a> {
    original: &'a str,
    normalized: String,
    /// Byte offset in `normalized` where each normalized char starts
    char_starts: Vec<usize>,
    /// Original byte range each normalized char came from
    origins: Vec<Range<usize>>,
}

impl<'a> MappedTerm<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut normalized = String::with_capacity(original.len());
        let mut char_starts = Vec::new();
        let mut origins = Vec::new();
        let mut pending_space: Option<Range<usize>> = None;

        for (pos, ch) in original.char_indices() {
            let range = pos..pos + ch.len_utf8();

            if ch.is_whitespace() {
                if !normalized.is_empty() {
                    pending_space = Some(match pending_space {
                        Some(run) => run.start..range.end,
                        None => range,
                    });
                }
                continue;
            }

            if let Some(run) = pending_space.take() {
                char_starts.push(normalized.len());
                origins.push(run);
                normalized.push(' ');
            }
            for lower in ch.to_lowercase() {
                char_starts.push(normalized.len());
                origins.push(range.clone());
                normalized.push(lower);
            }
        }

        Self {
            original,
            normalized,
            char_starts,
            origins,
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Map a byte range of the normalized text back to the original
    fn original_range(&self, start: usize, end: usize) -> Range<usize> {
        let first = self.char_starts.partition_point(|&s| s < start);
        let last = self.char_starts.partition_point(|&s| s < end).saturating_sub(1);
        self.origins[first].start..self.origins[last].end
    }

    /// Occurrences of a normalized query as original byte ranges.
    /// Touching or overlapping occurrences are merged into one range.
    pub fn find_spans(&self, query: &str) -> Vec<Range<usize>> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut spans: Vec<Range<usize>> = Vec::new();
        for start in Finder::new(query).find_iter(self.normalized.as_bytes()) {
            let span = self.original_range(start, start + query.len());
            // A lowercase expansion can map two matches onto one original char
            match spans.last_mut() {
                Some(prev) if span.start <= prev.end => prev.end = prev.end.max(span.end),
                _ => spans.push(span),
            }
        }
        spans
    }

    /// Split the original term into alternating plain and keyword segments
    pub fn snippets(&self, query: &str) -> Vec<Snippet> {
        let mut snippets = Vec::new();
        let mut cursor = 0;

        for span in self.find_spans(query) {
            if span.start > cursor {
                snippets.push(Snippet::Text(self.original[cursor..span.start].to_string()));
            }
            snippets.push(Snippet::Keyword(self.original[span.clone()].to_string()));
            cursor = span.end;
        }
        if cursor < self.original.len() {
            snippets.push(Snippet::Text(self.original[cursor..].to_string()));
        }

        snippets
    }
}

/// Classify how a normalized term matches a normalized query.
/// Returns `None` when the query does not occur in the term.
pub fn classify(normalized_term: &str, query: &str) -> Option<MatchKind> {
    if query.is_empty() {
        return None;
    }
    if normalized_term == query {
        return Some(MatchKind::Exact);
    }

    let finder = Finder::new(query);
    let mut found = false;
    for start in finder.find_iter(normalized_term.as_bytes()) {
        found = true;
        if on_token_boundaries(normalized_term, start, start + query.len()) {
            return Some(MatchKind::Token);
        }
    }

    if !found {
        None
    } else if normalized_term.starts_with(query) {
        Some(MatchKind::Prefix)
    } else {
        Some(MatchKind::Substring)
    }
}

/// Normalize a raw query the same way indexed terms are normalized
pub fn normalize_query(query: &str) -> String {
    normalize_term(query)
}
