//! Translation of LIKE patterns into anchored regular expressions.
//!
//! `%` matches any run of characters, `_` a single character, and `[set]` or
//! `[^set]` a character class where `a-z` ranges are kept.

use crate::error::{CompileError, Result};
use regex::{Regex, RegexBuilder};

pub(crate) fn like_to_regex(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    let invalid = |reason: &str| CompileError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '[' => {
                let mut class = String::new();
                if chars.peek() == Some(&'^') {
                    chars.next();
                    class.push('^');
                }

                let mut members = 0;
                let mut closed = false;
                while let Some(member) = chars.next() {
                    match member {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '-' if members > 0 && chars.peek().is_some_and(|next| *next != ']') => {
                            class.push('-');
                        }
                        other => {
                            class.push_str(&regex::escape(&other.to_string()));
                            members += 1;
                        }
                    }
                }

                if !closed {
                    return Err(invalid("unterminated character set"));
                }
                if members == 0 {
                    return Err(invalid("empty character set"));
                }
                out.push('[');
                out.push_str(&class);
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');

    RegexBuilder::new(&out)
        .case_insensitive(!case_sensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| invalid(&e.to_string()))
}
