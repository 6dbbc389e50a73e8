use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the glossary core (records, sources, index, lookup)
#[derive(Debug, Error)]
pub enum GlossaryError {
    /// A term field is empty or cannot be stored in the glossary's format
    #[error("invalid term: {field} {reason}")]
    InvalidTerm {
        field: &'static str,
        reason: &'static str,
    },

    /// The (source, target) pair already exists in the glossary
    #[error("term already exists: '{source_term}' -> '{target_term}'")]
    DuplicateTerm {
        source_term: String,
        target_term: String,
    },

    /// No record matches the requested (source, target) pair
    #[error("term not found: '{source_term}' -> '{target_term}'")]
    TermNotFound {
        source_term: String,
        target_term: String,
    },

    /// delete_all would remove more than one record and was not forced
    #[error("'{source_term}' has {candidates} translations; pass --force to delete all of them")]
    AmbiguousDelete {
        source_term: String,
        candidates: usize,
    },

    /// A glossary file name does not follow `<name>.<src>.<tgt>.<ext>`
    #[error("malformed glossary file name: {}", path.display())]
    MalformedGlossaryFilename { path: PathBuf },

    /// The index directory cannot be created or written
    #[error("index storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    /// No usable index exists at the storage location
    #[error("no index found at {}; run 'glossa index' first", path.display())]
    IndexUnavailable { path: PathBuf },

    /// The index exists but is corrupt or was written by another version
    #[error("index at {} is unreadable: {reason}; run 'glossa index' to rebuild", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("invalid project name: '{0}'")]
    InvalidProjectName(String),

    #[error("unknown glossary: {0}")]
    UnknownGlossary(String),

    /// A glossary reference is not `<name>.<source>.<target>`
    #[error("invalid glossary '{0}': expected <name>.<source_language>.<target_language>")]
    InvalidGlossaryKey(String),

    /// More than one project holds a glossary with the same identity
    #[error("glossary {name} exists in several projects ({projects}); pick one with --project")]
    AmbiguousGlossary { name: String, projects: String },

    #[error("glossary already exists: {}", path.display())]
    GlossaryExists { path: PathBuf },

    #[error("failed to parse {}: {reason}", path.display())]
    SourceParse { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML emit error: {0}")]
    YamlEmit(#[from] yaml_rust::EmitError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GlossaryError {
    pub fn storage(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn source_parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::SourceParse {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlossaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        let errors = [
            GlossaryError::InvalidTerm {
                field: "source_term",
                reason: "must not be empty",
            },
            GlossaryError::AmbiguousDelete {
                source_term: "user".into(),
                candidates: 2,
            },
            GlossaryError::IndexUnavailable {
                path: PathBuf::from("/tmp/idx"),
            },
            GlossaryError::MalformedGlossaryFilename {
                path: PathBuf::from("projects/a/glossary/bad.yml"),
            },
        ];

        for err in errors {
            let msg = err.to_string();
            assert!(!msg.is_empty());
            assert!(!msg.contains('\n'), "multi-line message: {msg}");
        }
    }

    #[test]
    fn test_ambiguous_delete_mentions_force() {
        let err = GlossaryError::AmbiguousDelete {
            source_term: "user".into(),
            candidates: 3,
        };
        assert!(err.to_string().contains("--force"));
        assert!(err.to_string().contains('3'));
    }
}
