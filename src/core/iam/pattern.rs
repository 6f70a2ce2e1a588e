//! Pattern matching for policy attribute sets
//!
//! Grammar:
//! - A pattern without `*` is an exact, case-sensitive literal
//! - `*` matches zero or more characters of any kind (including `/` and `:`)
//!
//! There is no escape sequence and no single-character wildcard.

/// Wildcard character
pub const WILDCARD: char = '*';

/// Pattern matcher for actions, subjects and resources
pub struct PatternMatcher;

impl PatternMatcher {
    /// Check if a candidate matches at least one pattern in the set
    ///
    /// An empty set matches nothing.
    ///
    /// # Examples
    /// ```
    /// use pbac::PatternMatcher;
    ///
    /// assert!(PatternMatcher::matches(&["read:*"], "read:file"));
    /// assert!(!PatternMatcher::matches(&["read:*"], "write:file"));
    /// assert!(!PatternMatcher::matches::<&str>(&[], "anything"));
    /// ```
    pub fn matches<S: AsRef<str>>(patterns: &[S], candidate: &str) -> bool {
        patterns
            .iter()
            .any(|pattern| Self::matches_pattern(pattern.as_ref(), candidate))
    }

    /// Check if a candidate matches a single pattern
    pub fn matches_pattern(pattern: &str, candidate: &str) -> bool {
        if !pattern.contains(WILDCARD) {
            return pattern == candidate;
        }

        Self::match_glob(pattern, candidate)
    }

    /// Check whether a pattern contains a wildcard
    pub fn is_wildcard(pattern: &str) -> bool {
        pattern.contains(WILDCARD)
    }

    /// Match a pattern containing at least one `*`
    ///
    /// The literal head must prefix the candidate and the literal tail must
    /// suffix what is left after the middle pieces. Middle pieces are taken
    /// leftmost-first, which is sufficient when `*` is the only metacharacter.
    fn match_glob(pattern: &str, candidate: &str) -> bool {
        let mut pieces: Vec<&str> = pattern.split(WILDCARD).collect();

        let tail = match pieces.pop() {
            Some(tail) => tail,
            None => return false,
        };
        if pieces.is_empty() {
            // No wildcard after all
            return tail == candidate;
        }

        let head = pieces[0];
        let mut rest = match candidate.strip_prefix(head) {
            Some(rest) => rest,
            None => return false,
        };

        for piece in &pieces[1..] {
            if piece.is_empty() {
                continue;
            }
            match rest.find(piece) {
                Some(found) => rest = &rest[found + piece.len()..],
                None => return false,
            }
        }

        rest.ends_with(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(PatternMatcher::matches_pattern("get", "get"));
        assert!(!PatternMatcher::matches_pattern("get", "GET"));
        assert!(!PatternMatcher::matches_pattern("get", "gets"));
        assert!(!PatternMatcher::matches_pattern("doc1", "doc10"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let empty: Vec<String> = Vec::new();
        assert!(!PatternMatcher::matches(&empty, ""));
        assert!(!PatternMatcher::matches(&empty, "alice"));
    }

    #[test]
    fn test_any_member_matches() {
        let patterns = vec!["get".to_string(), "update".to_string(), "delete".to_string()];
        assert!(PatternMatcher::matches(&patterns, "update"));
        assert!(!PatternMatcher::matches(&patterns, "create"));
    }

    #[test]
    fn test_suffix_wildcard() {
        assert!(PatternMatcher::matches_pattern("read:*", "read:file"));
        assert!(PatternMatcher::matches_pattern("read:*", "read:"));
        assert!(!PatternMatcher::matches_pattern("read:*", "write:file"));
        assert!(!PatternMatcher::matches_pattern("read:*", "read"));
    }

    #[test]
    fn test_prefix_wildcard() {
        assert!(PatternMatcher::matches_pattern("*@example.com", "alice@example.com"));
        assert!(!PatternMatcher::matches_pattern("*@example.com", "alice@other.com"));
    }

    #[test]
    fn test_lone_wildcard_matches_everything() {
        assert!(PatternMatcher::matches_pattern("*", "alice"));
        assert!(PatternMatcher::matches_pattern("*", ""));
        assert!(PatternMatcher::matches_pattern("**", "users/alice/profile"));
    }

    #[test]
    fn test_wildcard_crosses_separators() {
        assert!(PatternMatcher::matches_pattern("docs/*", "docs/a/b/c.txt"));
        assert!(PatternMatcher::matches_pattern("urn:*:doc", "urn:tenant:42:doc"));
    }

    #[test]
    fn test_infix_wildcards() {
        assert!(PatternMatcher::matches_pattern("a*b*c", "abc"));
        assert!(PatternMatcher::matches_pattern("a*b*c", "aXXbYYc"));
        assert!(!PatternMatcher::matches_pattern("a*b*c", "acb"));
        assert!(PatternMatcher::matches_pattern("logs/*-*-*.log", "logs/app-prod-2024.log"));
    }

    #[test]
    fn test_head_and_tail_do_not_overlap() {
        assert!(!PatternMatcher::matches_pattern("a*a", "a"));
        assert!(PatternMatcher::matches_pattern("a*a", "aa"));
        assert!(!PatternMatcher::matches_pattern("ab*bc", "abc"));
        assert!(PatternMatcher::matches_pattern("ab*bc", "abbc"));
    }

    #[test]
    fn test_repeated_tail_uses_last_occurrence() {
        assert!(PatternMatcher::matches_pattern("*.txt", "a.txt.txt"));
        assert!(PatternMatcher::matches_pattern("x*y", "xyyy"));
    }

    #[test]
    fn test_is_wildcard() {
        assert!(PatternMatcher::is_wildcard("read:*"));
        assert!(!PatternMatcher::is_wildcard("read:file"));
    }
}
