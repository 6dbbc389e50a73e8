pub mod executor;
pub mod matcher;

pub use executor::{LookupEngine, LookupHit, LookupRequest, lookup};
pub use matcher::{MatchKind, Snippet};
