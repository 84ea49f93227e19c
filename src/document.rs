//! Immutable view of one script: raw text plus its physical lines.

/// A script under validation. Borrowed from the caller for one call.
#[derive(Debug)]
pub struct ScriptDocument<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    comments: Vec<bool>,
    line_ending: &'static str,
    trailing_newline: bool,
}

impl<'a> ScriptDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let comments = comment_mask(&lines);
        Self {
            text,
            lines,
            comments,
            line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True for `;` comment lines and every line of a `/* ... */` block.
    pub fn is_comment(&self, index: usize) -> bool {
        self.comments.get(index).copied().unwrap_or(false)
    }

    pub fn is_blank(&self, index: usize) -> bool {
        self.lines.get(index).map_or(true, |l| l.trim().is_empty())
    }

    /// Reassemble lines with the document's own line ending convention.
    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let mut out = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join(self.line_ending);
        if self.trailing_newline {
            out.push_str(self.line_ending);
        }
        out
    }
}

fn comment_mask(lines: &[&str]) -> Vec<bool> {
    let mut in_block = false;
    lines
        .iter()
        .map(|line| {
            let trimmed = line.trim();
            if in_block {
                if trimmed.contains("*/") {
                    in_block = false;
                }
                return true;
            }
            if trimmed.starts_with("/*") {
                in_block = !trimmed[2..].contains("*/");
                return true;
            }
            trimmed.starts_with(';')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_comments() {
        let doc = ScriptDocument::new("; a\nMsgBox(\"x\")\n  ; b\n");
        assert!(doc.is_comment(0));
        assert!(!doc.is_comment(1));
        assert!(doc.is_comment(2));
    }

    #[test]
    fn block_comments_span_lines() {
        let doc = ScriptDocument::new("/*\nit's text\n*/\nSend(\"a\")");
        assert!(doc.is_comment(0));
        assert!(doc.is_comment(1));
        assert!(doc.is_comment(2));
        assert!(!doc.is_comment(3));
    }

    #[test]
    fn single_line_block_comment() {
        let doc = ScriptDocument::new("/* note */\nSend(\"a\")");
        assert!(doc.is_comment(0));
        assert!(!doc.is_comment(1));
    }

    #[test]
    fn join_preserves_crlf_and_trailing_newline() {
        let doc = ScriptDocument::new("a\r\nb\r\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.join(&["x", "y"]), "x\r\ny\r\n");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(ScriptDocument::new(" \n\t\n").is_empty());
        assert!(!ScriptDocument::new("x").is_empty());
    }
}
