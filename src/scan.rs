//! Structural scan: brace and parenthesis balance over the whole text,
//! quote parity per physical line.

use crate::classify::hotstring_body_start;
use crate::document::ScriptDocument;
use crate::quote::QuoteTracker;
use crate::report::{Issue, IssueKind};

/// Result of one structural pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StructureSummary {
    /// Count of `{` minus count of `}`.
    pub brace_net: i64,
    /// Count of `(` minus count of `)`.
    pub paren_net: i64,
    /// 1-based lines with an unterminated quote, with the kinds left open.
    pub unmatched_quotes: Vec<(usize, OpenQuotes)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenQuotes {
    pub single: bool,
    pub double: bool,
}

/// Net brace and paren counts of a fragment. String literals are not
/// excluded: the whole-document balance is a raw character count.
pub fn balance(text: &str) -> (i64, i64) {
    text.chars().fold((0, 0), |(b, p), ch| match ch {
        '{' => (b + 1, p),
        '}' => (b - 1, p),
        '(' => (b, p + 1),
        ')' => (b, p - 1),
        _ => (b, p),
    })
}

pub fn scan(doc: &ScriptDocument<'_>) -> StructureSummary {
    let (brace_net, paren_net) = balance(doc.text());

    let mut unmatched_quotes = Vec::new();
    for (idx, line) in doc.lines().iter().enumerate() {
        if doc.is_comment(idx) || doc.is_blank(idx) {
            continue;
        }
        let code = quote_checked_part(line);
        let (single, double) = QuoteTracker::line_has_open_quote(code);
        if single || double {
            unmatched_quotes.push((idx + 1, OpenQuotes { single, double }));
        }
    }

    StructureSummary {
        brace_net,
        paren_net,
        unmatched_quotes,
    }
}

/// Hotstring replacement text is literal, so only the trigger is checked.
fn quote_checked_part(line: &str) -> &str {
    let trimmed = line.trim_start();
    if let Some(end) = hotstring_body_start(trimmed) {
        return &trimmed[..end];
    }
    QuoteTracker::strip_comment(line)
}

impl StructureSummary {
    pub fn issues(&self, doc: &ScriptDocument<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        if self.brace_net != 0 {
            issues.push(
                Issue::new(
                    IssueKind::StructuralError,
                    0,
                    format!("unbalanced braces: {}", describe_net(self.brace_net)),
                )
                .rule("brace-balance"),
            );
        }
        if self.paren_net != 0 {
            issues.push(
                Issue::new(
                    IssueKind::StructuralError,
                    0,
                    format!("unbalanced parentheses: {}", describe_net(self.paren_net)),
                )
                .rule("paren-balance"),
            );
        }
        for &(line, open) in &self.unmatched_quotes {
            let which = match (open.single, open.double) {
                (true, true) => "unmatched single and double quotes",
                (true, false) => "unmatched single quote",
                _ => "unmatched double quote",
            };
            let raw = doc.lines().get(line - 1).copied().unwrap_or_default();
            issues.push(
                Issue::new(IssueKind::StructuralError, line, which)
                    .snippet(raw)
                    .rule("quote-balance"),
            );
        }
        issues
    }
}

fn describe_net(net: i64) -> String {
    let side = if net > 0 { "opening" } else { "closing" };
    format!("{} extra {}", net.abs(), side)
}
