//! # Glossa - bilingual glossary lookup
//!
//! Glossa indexes bilingual glossaries kept as plain files in a repository
//! and answers term lookups against a persistent index.
//!
//! ## Architecture
//!
//! - [`glossary`] - Records, source file formats, discovery and editing
//! - [`index`] - Full index rebuild and the read-only index handle
//! - [`query`] - Matching, ordering and highlight snippets
//! - [`output`] - Terminal and JSON printing of lookup hits
//! - [`utils`] - Normalization, trigrams, encoding and app config
//!
//! ## Repository layout
//!
//! ```text
//! <root>/projects/<project>/glossary/<name>.<source>.<target>.<yml|csv|tsv>
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use glossa::index::rebuild;
//! use glossa::query::{LookupRequest, lookup};
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/glossaries");
//! let index_dir = Path::new("/tmp/glossa-index");
//!
//! let summary = rebuild(root, index_dir).unwrap();
//! println!("indexed {} records", summary.records);
//!
//! let request = LookupRequest::new("user").target_language("ja");
//! for hit in lookup(index_dir, &request).unwrap() {
//!     println!("{} => {}", hit.record.source_term, hit.record.target_term);
//! }
//! ```
//!
//! ## Index
//!
//! A rebuild writes three structures per repository:
//!
//! 1. **Record table** - every term in discovery order; its position is the record id
//! 2. **Token index** - whole words of the normalized source term
//! 3. **Trigram index** - 3-byte sequences for substring candidate narrowing
//!
//! Postings are delta-varint encoded and memory-mapped when read.

pub mod error;
pub mod glossary;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{GlossaryError, Result};
