//! Text utilities used by the string builtins.

pub mod printf;
pub mod tagged;

pub use tagged::{close_tag, match_close_tag, remove_tag, skip_tag, untag};

/// Capitalize the first letter of every word.
#[must_use]
pub fn to_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = c.is_whitespace();
        }
    }
    out
}

/// Characters `begin..end` of `s`, clamped to the string.
#[must_use]
pub fn substring(s: &str, begin: i64, end: i64) -> String {
    let begin = begin.max(0) as usize;
    let end = end.max(0) as usize;
    if begin >= end {
        return String::new();
    }
    s.chars().skip(begin).take(end - begin).collect()
}

/// Character offset of `needle` in `haystack`.
#[must_use]
pub fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_title() {
        assert_eq!(to_title("hello wORLD"), "Hello World");
        assert_eq!(to_title("first-strike"), "First-strike");
    }

    #[test]
    fn test_substring_clamps() {
        assert_eq!(substring("hello", -3, 2), "he");
        assert_eq!(substring("hello", 10, 20), "");
        assert_eq!(substring("hello", 0, i64::MAX), "hello");
        assert_eq!(substring("hello", 3, 1), "");
        assert_eq!(substring("héllo", 1, 3), "él");
    }

    #[test]
    fn test_char_position() {
        assert_eq!(char_position("hello", "lo"), Some(3));
        assert_eq!(char_position("héllo", "l"), Some(2));
        assert_eq!(char_position("hello", "z"), None);
    }
}
