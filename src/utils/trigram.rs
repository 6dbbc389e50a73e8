use crate::index::types::{Trigram, bytes_to_trigram};

/// Extract unique trigrams from a normalized term.
///
/// Trigrams are taken over UTF-8 bytes, so a single CJK character
/// contributes one trigram and mixed-script terms need no special casing.
/// The result is sorted and deduplicated.
pub fn extract_trigrams(content: &[u8]) -> Vec<Trigram> {
    if content.len() < 3 {
        return Vec::new();
    }

    let mut trigrams: Vec<Trigram> = content
        .windows(3)
        .map(|w| bytes_to_trigram(w[0], w[1], w[2]))
        .collect();
    trigrams.sort_unstable();
    trigrams.dedup();
    trigrams
}

/// Extract trigrams from a normalized query.
/// Queries shorter than three bytes have none and fall back to a scan.
pub fn query_trigrams(query: &str) -> Vec<Trigram> {
    extract_trigrams(query.as_bytes())
}
