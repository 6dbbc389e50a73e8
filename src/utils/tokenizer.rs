use rustc_hash::FxHashSet;

/// Maximum token length to store in the index.
/// Longer tokens are sentences pasted into a term field, not vocabulary.
const MAX_TOKEN_LENGTH: usize = 128;

/// Normalize a term for indexing and matching:
/// lowercase, whitespace runs collapsed to one space, trimmed.
pub fn normalize_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut pending_space = false;

    for ch in term.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Split a normalized term into its word tokens.
///
/// A token is a maximal run of alphanumeric characters (any script), so
/// `sign-in page` yields `sign`, `in`, `page`. Tokens keep first-seen order
/// and are deduplicated.
pub fn extract_tokens(normalized: &str) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut tokens: Vec<String> = Vec::new();

    for token in normalized.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            continue;
        }
        if seen.insert(token) {
            tokens.push(token.to_string());
        }
    }

    tokens
}

/// True when the normalized query is exactly one token
pub fn is_single_token(normalized: &str) -> bool {
    !normalized.is_empty() && normalized.chars().all(char::is_alphanumeric)
}

/// True when `text[start..end]` sits on token boundaries
pub fn on_token_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Sign   In\tPage "), "sign in page");
        assert_eq!(normalize_term("USER"), "user");
        assert_eq!(normalize_term("ユーザ"), "ユーザ");
        assert_eq!(normalize_term("   "), "");
    }

    #[test]
    fn test_extract_tokens() {
        let tokens = extract_tokens("sign-in page sign");
        assert_eq!(tokens, vec!["sign", "in", "page"]);
    }

    #[test]
    fn test_extract_tokens_unicode() {
        let tokens = extract_tokens("ユーザー 管理");
        assert_eq!(tokens, vec!["ユーザー", "管理"]);
    }

    #[test]
    fn test_is_single_token() {
        assert!(is_single_token("user"));
        assert!(!is_single_token("user name"));
        assert!(!is_single_token("e-mail"));
        assert!(!is_single_token(""));
    }

    #[test]
    fn test_on_token_boundaries() {
        let text = "user name";
        assert!(on_token_boundaries(text, 0, 4));
        assert!(on_token_boundaries(text, 5, 9));
        assert!(!on_token_boundaries(text, 1, 4));
        assert!(!on_token_boundaries("username", 0, 4));
    }
}
