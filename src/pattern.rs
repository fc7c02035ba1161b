// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Anchored glob matching for connection strings
//!
//! Two wildcards only: `*` matches inside one path segment, `**` matches
//! anything including `/`. Every other character is literal, so brackets in
//! `user[schema]` need no escaping. Matching ignores case.

use crate::error::{Result, RouteError};
use regex::{Regex, RegexBuilder};

/// Translate a glob into an anchored regular expression
#[must_use]
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    out.push('^');
    while let Some(c) = chars.next() {
        if c != '*' {
            literal.push(c);
            continue;
        }

        out.push_str(&regex::escape(&literal));
        literal.clear();
        if chars.peek() == Some(&'*') {
            chars.next();
            out.push_str(".*");
        } else {
            out.push_str("[^/]*");
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Compile a glob into a case-insensitive regex
pub fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&glob_to_regex(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Match `text` against a glob, compiling the pattern on the spot
#[must_use]
pub fn matches(pattern: &str, text: &str) -> bool {
    compile(pattern).is_ok_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal_is_anchored() {
        assert!(matches("abc", "abc"));
        assert!(!matches("abc", "xabc"));
        assert!(!matches("abc", "abcx"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(matches("db/*/x.sql", "db/sales/x.sql"));
        assert!(!matches("db/*/x.sql", "db/sales/tables/x.sql"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(matches("db/**", "db/sales/tables/x.sql"));
        assert!(matches("depl[sales_data]**", "depl[sales_data]/pw@host:1521/pdb"));
    }

    #[test]
    fn test_brackets_and_dots_are_literal() {
        assert!(matches("depl[data]", "depl[data]"));
        assert!(!matches("depl[data]", "depld"));
        assert!(!matches("a.c", "abc"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("DEPL[Data]**", "depl[data]/x@y"));
    }

    proptest! {
        #[test]
        fn prop_star_free_pattern_matches_itself(s in "[a-zA-Z0-9_\\[\\]./@:$(){}+?^|-]{0,24}") {
            prop_assert!(matches(&s, &s));
        }

        #[test]
        fn prop_trailing_double_star_accepts_any_suffix(
            prefix in "[a-z_\\[\\]]{1,12}",
            suffix in ".{0,24}",
        ) {
            let pattern = format!("{prefix}**");
            let text = format!("{prefix}{suffix}");
            prop_assert!(matches(&pattern, &text));
        }
    }
}
