use crate::error::{GlossaryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Identity of a glossary: name plus language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlossaryKey {
    pub name: String,
    pub source_language: String,
    pub target_language: String,
}

impl GlossaryKey {
    pub fn new(
        name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

impl fmt::Display for GlossaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -> {})",
            self.name, self.source_language, self.target_language
        )
    }
}

/// Parses `<name>.<source>.<target>`; the name may itself contain dots
impl FromStr for GlossaryKey {
    type Err = GlossaryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GlossaryError::InvalidGlossaryKey(s.to_string());

        let mut parts = s.rsplitn(3, '.');
        let target = parts.next().ok_or_else(invalid)?;
        let source = parts.next().ok_or_else(invalid)?;
        let name = parts.next().ok_or_else(invalid)?;

        let well_formed = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
        if !(well_formed(name) && well_formed(source) && well_formed(target)) {
            return Err(invalid());
        }
        Ok(Self::new(name, source, target))
    }
}

/// One bilingual glossary entry.
///
/// Equality and hashing consider the owning glossary and the
/// (source, target) pair only; the note is payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRecord {
    pub glossary_name: String,
    pub source_language: String,
    pub target_language: String,
    pub source_term: String,
    pub target_term: String,
    #[serde(default)]
    pub note: String,
}

impl TermRecord {
    /// Build a record, rejecting empty source or target terms
    pub fn new(
        key: &GlossaryKey,
        source_term: impl Into<String>,
        target_term: impl Into<String>,
        note: Option<String>,
    ) -> Result<Self> {
        let source_term = source_term.into();
        let target_term = target_term.into();
        validate_pair(&source_term, &target_term)?;

        Ok(Self {
            glossary_name: key.name.clone(),
            source_language: key.source_language.clone(),
            target_language: key.target_language.clone(),
            source_term,
            target_term,
            note: note.unwrap_or_default(),
        })
    }

    fn identity(&self) -> (&str, &str, &str, &str, &str) {
        (
            &self.glossary_name,
            &self.source_language,
            &self.target_language,
            &self.source_term,
            &self.target_term,
        )
    }
}

impl PartialEq for TermRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for TermRecord {}

impl Hash for TermRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Reject pairs whose source or target term is blank
pub fn validate_pair(source_term: &str, target_term: &str) -> Result<()> {
    if source_term.trim().is_empty() {
        return Err(GlossaryError::InvalidTerm {
            field: "source_term",
            reason: "must not be empty",
        });
    }
    if target_term.trim().is_empty() {
        return Err(GlossaryError::InvalidTerm {
            field: "target_term",
            reason: "must not be empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn key() -> GlossaryKey {
        GlossaryKey::new("spec", "en", "ja")
    }

    #[test]
    fn test_new_defaults_note() {
        let record = TermRecord::new(&key(), "user", "ユーザ", None).unwrap();
        assert_eq!(record.note, "");
        assert_eq!(record.glossary_name, "spec");
        assert_eq!(record.source_language, "en");
        assert_eq!(record.target_language, "ja");
    }

    #[test]
    fn test_new_rejects_empty_terms() {
        assert!(matches!(
            TermRecord::new(&key(), "", "ユーザ", None),
            Err(GlossaryError::InvalidTerm {
                field: "source_term",
                ..
            })
        ));
        assert!(matches!(
            TermRecord::new(&key(), "user", "   ", None),
            Err(GlossaryError::InvalidTerm {
                field: "target_term",
                ..
            })
        ));
    }

    #[test]
    fn test_equality_ignores_note() {
        let a = TermRecord::new(&key(), "user", "ユーザ", Some("a".into())).unwrap();
        let b = TermRecord::new(&key(), "user", "ユーザ", Some("b".into())).unwrap();
        let c = TermRecord::new(&GlossaryKey::new("ui", "en", "ja"), "user", "ユーザ", None)
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: FxHashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key().to_string(), "spec (en -> ja)");
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("spec.en.ja".parse::<GlossaryKey>().unwrap(), key());
        assert_eq!(
            "api.v2.en.fr".parse::<GlossaryKey>().unwrap(),
            GlossaryKey::new("api.v2", "en", "fr")
        );
        for bad in ["spec", "spec.en", ".en.ja", "spec..ja", "my spec.en.ja"] {
            assert!(
                matches!(
                    bad.parse::<GlossaryKey>(),
                    Err(GlossaryError::InvalidGlossaryKey(_))
                ),
                "{bad} should be rejected"
            );
        }
    }
}
