//! Quote-tracking utilities for AutoHotkey source lines.
//!
//! Both `"` and `'` delimit strings. A quote character inside a string opened
//! by the other kind is literal, and the backtick escapes the character that
//! follows it, so `` `" `` never opens or closes a string.

/// Stateless quote analysis.
pub struct QuoteTracker;

impl QuoteTracker {
    /// Walk `line`, calling `visit(byte_offset, ch, inside_string)` for every
    /// character. Quote delimiters count as inside their own string. The
    /// walk stops early when `visit` returns `false`.
    ///
    /// Returns the open state at the point the walk ended as
    /// `(single_open, double_open)`.
    fn walk(line: &str, mut visit: impl FnMut(usize, char, bool) -> bool) -> (bool, bool) {
        let mut in_single = false;
        let mut in_double = false;
        let mut backticks = 0usize;

        for (i, ch) in line.char_indices() {
            let escaped = backticks % 2 == 1;
            let was_inside = in_single || in_double;

            match ch {
                '\'' if !in_double && !escaped => in_single = !in_single,
                '"' if !in_single && !escaped => in_double = !in_double,
                _ => {}
            }

            let inside = was_inside || in_single || in_double;
            if !visit(i, ch, inside) {
                break;
            }

            if ch == '`' {
                backticks += 1;
            } else {
                backticks = 0;
            }
        }
        (in_single, in_double)
    }

    /// Returns `(single_open, double_open)`: true if that quote kind is left
    /// unterminated at the end of the line.
    pub fn line_has_open_quote(line: &str) -> (bool, bool) {
        Self::walk(line, |_, _, _| true)
    }

    /// Byte offset of an inline `;` comment: a semicolon outside any string
    /// that starts the line or follows a space or tab.
    pub fn comment_start(line: &str) -> Option<usize> {
        let mut found = None;
        let mut prev: Option<char> = None;
        Self::walk(line, |i, ch, inside| {
            if ch == ';' && !inside && matches!(prev, None | Some(' ') | Some('\t')) {
                found = Some(i);
                return false;
            }
            prev = Some(ch);
            true
        });
        found
    }

    /// The part of `line` before any inline comment.
    pub fn strip_comment(line: &str) -> &str {
        match Self::comment_start(line) {
            Some(pos) => &line[..pos],
            None => line,
        }
    }

    /// Byte offset of the first occurrence of `needle` that starts outside
    /// any string.
    pub fn find_outside(line: &str, needle: &str) -> Option<usize> {
        let mut found = None;
        Self::walk(line, |i, _, inside| {
            if !inside && line[i..].starts_with(needle) {
                found = Some(i);
                return false;
            }
            true
        });
        found
    }

    /// Replace every string literal (delimiters included) with spaces so that
    /// word searches only see code. Byte offsets are preserved.
    pub fn mask_strings(line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        Self::walk(line, |_, ch, inside| {
            if inside {
                out.extend(std::iter::repeat(' ').take(ch.len_utf8()));
            } else {
                out.push(ch);
            }
            true
        });
        out
    }
}
