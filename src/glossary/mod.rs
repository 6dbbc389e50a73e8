pub mod discovery;
pub mod mutate;
pub mod project;
pub mod record;
pub mod source;

pub use discovery::{Discovery, GlossaryFile, discover, find_glossary, parse_glossary_filename};
pub use mutate::GlossarySource;
pub use record::{GlossaryKey, TermRecord};
pub use source::{RawRow, SourceFormat};
