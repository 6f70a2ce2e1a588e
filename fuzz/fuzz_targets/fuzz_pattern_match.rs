#![no_main]
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};
use pbac::PatternMatcher;

#[derive(Debug, Arbitrary)]
struct MatchInput {
    pattern: String,
    candidate: String,
}

fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);
    let MatchInput { pattern, candidate } = match u.arbitrary() {
        Ok(m) => m,
        Err(_) => return,
    };

    let matched = PatternMatcher::matches_pattern(&pattern, &candidate);

    // A literal pattern matches exactly itself
    if !PatternMatcher::is_wildcard(&pattern) {
        assert_eq!(matched, pattern == candidate);
    }

    // Appending a wildcard only widens the pattern
    if matched {
        assert!(PatternMatcher::matches_pattern(&format!("{pattern}*"), &candidate));
    }
});
