pub mod build;
pub mod reader;
pub mod stats;
pub mod types;
pub mod writer;

pub use build::{RebuildSummary, rebuild, rebuild_with_progress};
pub use reader::IndexReader;
pub use types::*;
pub use writer::IndexWriter;
