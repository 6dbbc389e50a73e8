//! Utility functions shared by the index and the lookup engine.
//!
//! ## Modules
//!
//! - [`app_data`] - Config file and index directory management
//! - [`encoding`] - Varint/delta postings and little-endian framing
//! - [`progress`] - Optional spinners
//! - [`tokenizer`] - Term normalization and word tokens
//! - [`trigram`] - 3-byte sequence extraction for substring lookup
//!
//! ```no_run
//! use glossa::utils::{extract_tokens, extract_trigrams, normalize_term};
//!
//! let normalized = normalize_term("  Sign-In   Page");
//! assert_eq!(normalized, "sign-in page");
//!
//! let tokens = extract_tokens(&normalized);
//! // Returns: ["sign", "in", "page"]
//!
//! let trigrams = extract_trigrams(normalized.as_bytes());
//! ```

pub mod app_data;
pub mod encoding;
pub mod progress;
pub mod tokenizer;
pub mod trigram;

pub use app_data::*;
pub use encoding::*;
pub use progress::Spinner;
pub use tokenizer::*;
pub use trigram::*;
