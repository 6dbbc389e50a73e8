#![no_main]

use arbitrary::Arbitrary;
use glossa::query::matcher::{MappedTerm, classify, normalize_query};
use glossa::query::Snippet;
use glossa::utils::{extract_tokens, extract_trigrams, normalize_term};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    term: &'a str,
    query: &'a str,
}

fuzz_target!(|input: Input| {
    let query = normalize_query(input.query);
    let term = MappedTerm::new(input.term);
    assert_eq!(term.normalized(), normalize_term(input.term));

    let normalized = term.normalized();
    let _ = extract_tokens(normalized);
    let _ = extract_trigrams(normalized.as_bytes());
    let _ = classify(normalized, &query);

    // Snippets always cover the original term exactly
    let snippets = term.snippets(&query);
    let joined: String = snippets.iter().map(Snippet::text).collect();
    assert_eq!(joined, input.term);
});
