//! Scanning helpers used while inserting and searching path patterns.

const PARAM_START: char = '{';
const PARAM_END: char = '}';
const SEGMENT_DELIMITER: char = '/';

/// Returns the byte length of the longest common prefix of `a` and `b`.
///
/// Comparison stops as soon as either side reaches a `{`, so the returned prefix never reaches
/// into parameter syntax. The result always lies on a char boundary of both strings.
pub(crate) fn longest_common_prefix(a: &str, b: &str) -> usize {
    let mut size = 0;

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == PARAM_START || cb == PARAM_START || ca != cb {
            break;
        }

        size += ca.len_utf8();
    }

    size
}

/// Byte offset of the first `{` in `s`.
pub(crate) fn find_param_start(s: &str) -> Option<usize> {
    s.find(PARAM_START)
}

/// Byte offset just past the `}` closing the first parameter token in `s`.
///
/// Yields `None` when a `/` shows up before the closing brace, when the token is empty (`{}`)
/// or when the token is never closed.
pub(crate) fn find_param_end(s: &str) -> Option<usize> {
    let mut prev = None;

    for (i, c) in s.char_indices() {
        match c {
            SEGMENT_DELIMITER => return None,
            PARAM_END if prev == Some(PARAM_START) => return None,
            PARAM_END => return Some(i + c.len_utf8()),
            _ => prev = Some(c),
        }
    }

    None
}

/// Byte offset of the next `/` in `s`, or `s.len()` if there is none.
pub(crate) fn find_slash_or_end(s: &str) -> usize {
    s.find(SEGMENT_DELIMITER).unwrap_or(s.len())
}
