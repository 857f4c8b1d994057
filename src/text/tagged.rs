//! Tagged text.
//!
//! Card text carries inline markup tags such as `<b>bold</b>` or
//! `<kw-a>Flying</kw-a>`. Tags never nest across each other, but a tag may
//! contain another instance of itself, so close tags are matched with a
//! nesting count.

/// Name of the tag starting at `pos`, without `<`, `/` or attributes.
fn tag_name_at(s: &str, pos: usize) -> &str {
    let rest = &s[pos..];
    let rest = rest.strip_prefix('<').unwrap_or(rest);
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let end = rest
        .find(|c: char| c == '>' || c.is_whitespace())
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Close tag for `tag`: `<kw-a>` and `<kw-a` both give `</kw-a>`.
#[must_use]
pub fn close_tag(tag: &str) -> String {
    let name = tag_name_at(tag, 0);
    format!("</{name}>")
}

/// Position just past the tag starting at `pos`.
///
/// Returns the length of `s` if the tag is not closed with `>`.
#[must_use]
pub fn skip_tag(s: &str, pos: usize) -> usize {
    match s[pos..].find('>') {
        Some(i) => pos + i + 1,
        None => s.len(),
    }
}

/// Position of the close tag matching the open tag at `start`.
///
/// Nested tags of the same name are skipped. `None` if the tag is never
/// closed.
#[must_use]
pub fn match_close_tag(s: &str, start: usize) -> Option<usize> {
    let name = tag_name_at(s, start);
    let mut depth = 0usize;
    let mut pos = skip_tag(s, start);
    while let Some(i) = s[pos..].find('<') {
        let at = pos + i;
        let is_close = s[at..].starts_with("</");
        if tag_name_at(s, at) == name {
            if is_close {
                if depth == 0 {
                    return Some(at);
                }
                depth -= 1;
            } else {
                depth += 1;
            }
        }
        pos = skip_tag(s, at);
    }
    None
}

/// Remove every tag starting with `tag` and the matching close tags,
/// keeping the text in between.
///
/// `remove_tag(s, "<kw-")` strips `<kw-a>` as well as `</kw-a>`.
#[must_use]
pub fn remove_tag(s: &str, tag: &str) -> String {
    let close_prefix = format!("</{}", tag.strip_prefix('<').unwrap_or(tag));
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(i) = s[pos..].find('<') {
        let at = pos + i;
        out.push_str(&s[pos..at]);
        let rest = &s[at..];
        if rest.starts_with(tag) || rest.starts_with(close_prefix.as_str()) {
            pos = skip_tag(s, at);
        } else {
            out.push('<');
            pos = at + 1;
        }
    }
    out.push_str(&s[pos..]);
    out
}

/// Remove every tag, leaving only the text.
#[must_use]
pub fn untag(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_tag() {
        assert_eq!(close_tag("<b>"), "</b>");
        assert_eq!(close_tag("<kw-a>"), "</kw-a>");
        assert_eq!(close_tag("<sym"), "</sym>");
    }

    #[test]
    fn test_match_close_tag_nesting() {
        let s = "<b>x<b>y</b>z</b>!";
        assert_eq!(match_close_tag(s, 0), Some(13));
        assert_eq!(match_close_tag("<b>open", 0), None);
        // other tags are ignored
        assert_eq!(match_close_tag("<i><b></b></i>", 0), Some(10));
    }

    #[test]
    fn test_remove_tag() {
        assert_eq!(remove_tag("<kw-a>Flying</kw-a>, <b>x</b>", "<kw-"), "Flying, <b>x</b>");
        assert_eq!(remove_tag("a < b", "<b"), "a < b");
    }

    #[test]
    fn test_untag() {
        assert_eq!(untag("<b>bold</b> <i>it</i>"), "bold it");
    }
}
