//! Brace-aware scanning primitives
//!
//!     Source markup nests `{...}` groups to arbitrary depth, so groups are consumed by explicit
//!     depth counting rather than by regular expressions. A delimiter is escaped iff it is
//!     preceded by an odd run of backslashes.
//!
//!     Every function here is pure and works on byte offsets into the caller's `&str`. All the
//!     delimiters involved are ASCII, so every returned offset is a char boundary. The parser
//!     and the builder call these recursively on the content of groups they have already cut.

use crate::error::LexError;
use std::borrow::Cow;

/// Whether the byte at `index` is escaped by an odd run of backslashes before it
pub fn is_escaped(text: &str, index: usize) -> bool {
    let bytes = text.as_bytes();
    let mut run = 0;
    let mut i = index.min(bytes.len());
    while i > 0 && bytes[i - 1] == b'\\' {
        run += 1;
        i -= 1;
    }
    run % 2 == 1
}

/// Consume a `{`-delimited, depth-balanced group starting at `open`.
///
/// Returns the content between the outer braces and the offset just past the closing brace.
pub fn parse_group(text: &str, open: usize) -> Result<(&str, usize), LexError> {
    parse_delimited(text, open, b'{', b'}')
}

/// The `[...]` analog of [parse_group]
pub fn parse_bracket_group(text: &str, open: usize) -> Result<(&str, usize), LexError> {
    parse_delimited(text, open, b'[', b']')
}

fn parse_delimited(
    text: &str,
    open: usize,
    open_byte: u8,
    close_byte: u8,
) -> Result<(&str, usize), LexError> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&open_byte) || is_escaped(text, open) {
        return Err(LexError::MissingGroup {
            open: open_byte as char,
            offset: open,
        });
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            // The next byte is escaped, whatever it is.
            i += 2;
            continue;
        }
        if b == open_byte {
            depth += 1;
        } else if b == close_byte {
            depth -= 1;
            if depth == 0 {
                return Ok((&text[open + 1..i], i + 1));
            }
        }
        i += 1;
    }

    Err(LexError::UnbalancedGroup {
        open: open_byte as char,
        offset: open,
    })
}

/// Remove, per line, everything from an unescaped `%` to the end of the line.
///
/// Line breaks are kept so offsets keep mapping to the same line numbers.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match find_unescaped(line, "%", 0) {
            Some(cut) => {
                out.push_str(&line[..cut]);
                if line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(line),
        }
    }
    Cow::Owned(out)
}

/// Turn `\r\n` and lone `\r` line breaks into `\n`
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Trim surrounding whitespace, keeping the one character a trailing backslash escapes.
///
/// `x\ ` stays `x\ `: cutting the space would leave a backslash that escapes whatever the
/// builder writes next, usually the closing brace.
pub fn trim_unescaped(text: &str) -> &str {
    let text = text.trim_start();
    let kept = text.trim_end();
    if kept.len() < text.len() && kept.ends_with('\\') && !is_escaped(kept, kept.len() - 1) {
        let escaped = text[kept.len()..].chars().next().map_or(0, char::len_utf8);
        return &text[..kept.len() + escaped];
    }
    kept
}

/// Find the first unescaped occurrence of `needle` at or after `from`
pub fn find_unescaped(text: &str, needle: &str, from: usize) -> Option<usize> {
    let mut start = from;
    while start <= text.len() {
        let found = start + text[start..].find(needle)?;
        if !is_escaped(text, found) {
            return Some(found);
        }
        start = found + needle.len();
    }
    None
}

/// Offset of the first non-whitespace byte at or after `from`
pub fn skip_whitespace(text: &str, from: usize) -> usize {
    let rest = &text[from.min(text.len())..];
    from + (rest.len() - rest.trim_start().len())
}

/// Read a control word (`\name`) at `at`.
///
/// Returns the name and the offset just past it, or `None` when `at` does not hold an
/// unescaped backslash followed by ASCII letters.
pub fn command_at(text: &str, at: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(at) != Some(&b'\\') || is_escaped(text, at) {
        return None;
    }
    let start = at + 1;
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if len == 0 {
        return None;
    }
    Some((&text[start..start + len], start + len))
}

/// Read every consecutive `{...}` group starting at `from`, allowing whitespace between them.
///
/// Stops at the first byte that does not open a group and returns the groups plus the offset
/// just past the last one. Only an unbalanced group is an error.
pub fn parse_group_run(text: &str, from: usize) -> Result<(Vec<&str>, usize), LexError> {
    let mut groups = Vec::new();
    let mut pos = from;
    loop {
        let open = skip_whitespace(text, pos);
        match parse_group(text, open) {
            Ok((content, end)) => {
                groups.push(content);
                pos = end;
            }
            Err(LexError::MissingGroup { .. }) => return Ok((groups, pos)),
            Err(err) => return Err(err),
        }
    }
}
