//! Issues, the validation report, and the aggregator that builds it.

use crate::config::Strictness;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// What kind of finding an issue is. Severity follows from the kind and the
/// configured [`Strictness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Empty or whitespace-only document.
    InputError,
    /// Brace, parenthesis or quote imbalance; malformed hotkey bodies.
    StructuralError,
    /// A legacy command form with a known modern equivalent.
    LegacySyntaxError,
    /// Removed names in expression context, unrecognized comma commands.
    StyleWarning,
    /// Missing version directive.
    StructuralWarning,
    /// Informational notes produced by the fixer.
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// 1-based line number; 0 for whole-document findings.
    pub line: usize,
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    /// The offending source line, trimmed.
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Identifier of the rule that produced this issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_fixed: bool,
}

impl Issue {
    pub fn new(kind: IssueKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Strictness::default().severity_for(kind),
            kind,
            message: message.into(),
            snippet: String::new(),
            suggestion: None,
            rule: None,
            auto_fixed: false,
        }
    }

    pub fn snippet(mut self, snippet: &str) -> Self {
        self.snippet = snippet.trim().to_string();
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `SEVERITY: Line N: message | Suggestion: ...`
    pub fn format(&self) -> String {
        let mut base = if self.line == 0 {
            format!("{}: {}", self.severity.as_str().to_uppercase(), self.message)
        } else {
            format!(
                "{}: Line {}: {}",
                self.severity.as_str().to_uppercase(),
                self.line,
                self.message
            )
        };
        if let Some(ref suggestion) = self.suggestion {
            base.push_str(" | Suggestion: ");
            base.push_str(suggestion);
        }
        base
    }
}

/// One rewritten line (or inserted block) in a fix candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    /// 1-based line number in the original text.
    pub line: usize,
    pub rule: String,
    pub replacement: String,
}

/// Verified output of the auto-fix rewriter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixCandidate {
    pub text: String,
    pub applied: Vec<AppliedFix>,
    /// Lines added by hotkey brace insertion (two per block).
    pub inserted_lines: usize,
    pub errors_before: usize,
    pub errors_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub strictness: Strictness,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixCandidate>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn count_kind(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Demote the issue a fix resolved to an `info` note.
    pub(crate) fn mark_auto_fixed(&mut self, line: usize, rule: &str) {
        for issue in &mut self.issues {
            if issue.line == line && issue.rule.as_deref() == Some(rule) {
                issue.severity = Severity::Info;
                issue.auto_fixed = true;
            }
        }
        self.refresh_validity();
    }

    /// Append a whole-document note, keeping line order.
    pub(crate) fn push_note(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::new(IssueKind::Note, 0, message));
        self.issues.sort_by_key(|i| i.line);
    }

    fn refresh_validity(&mut self) {
        self.valid = !self.issues.iter().any(Issue::is_error);
    }
}

/// Collects issues from every stage, applies the strictness policy, drops
/// duplicate `(line, message)` pairs and orders by line then discovery.
pub struct IssueAggregator {
    strictness: Strictness,
    issues: Vec<Issue>,
    seen: HashSet<(usize, String)>,
}

impl IssueAggregator {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            issues: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn push(&mut self, mut issue: Issue) {
        if !self.seen.insert((issue.line, issue.message.clone())) {
            return;
        }
        issue.severity = self.strictness.severity_for(issue.kind);
        self.issues.push(issue);
    }

    pub fn finish(mut self) -> ValidationReport {
        self.issues.sort_by_key(|i| i.line);
        let valid = !self.issues.iter().any(Issue::is_error);
        ValidationReport {
            valid,
            strictness: self.strictness,
            issues: self.issues,
            fix: None,
        }
    }
}

impl Extend<Issue> for IssueAggregator {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_line_and_message() {
        let mut agg = IssueAggregator::new(Strictness::Standard);
        agg.push(Issue::new(IssueKind::StructuralError, 3, "unmatched double quote"));
        agg.push(Issue::new(IssueKind::StructuralError, 3, "unmatched double quote"));
        agg.push(Issue::new(IssueKind::StructuralError, 4, "unmatched double quote"));
        assert_eq!(agg.finish().issues.len(), 2);
    }

    #[test]
    fn orders_by_line_then_discovery() {
        let mut agg = IssueAggregator::new(Strictness::Standard);
        agg.push(Issue::new(IssueKind::StyleWarning, 5, "b"));
        agg.push(Issue::new(IssueKind::StructuralError, 0, "doc"));
        agg.push(Issue::new(IssueKind::StyleWarning, 2, "a"));
        agg.push(Issue::new(IssueKind::LegacySyntaxError, 5, "c"));
        let report = agg.finish();
        let order: Vec<_> = report.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(order, vec!["doc", "a", "b", "c"]);
    }

    #[test]
    fn only_errors_invalidate() {
        let mut agg = IssueAggregator::new(Strictness::Standard);
        agg.push(Issue::new(IssueKind::StyleWarning, 1, "w"));
        agg.push(Issue::new(IssueKind::StructuralWarning, 0, "d"));
        assert!(agg.finish().valid);

        let mut agg = IssueAggregator::new(Strictness::Strict);
        agg.push(Issue::new(IssueKind::StyleWarning, 1, "w"));
        assert!(!agg.finish().valid);
    }

    #[test]
    fn mark_auto_fixed_restores_validity() {
        let mut agg = IssueAggregator::new(Strictness::Standard);
        agg.push(Issue::new(IssueKind::LegacySyntaxError, 2, "legacy").rule("msgbox"));
        let mut report = agg.finish();
        assert!(!report.valid);
        report.mark_auto_fixed(2, "msgbox");
        assert!(report.valid);
        assert!(report.issues[0].auto_fixed);
        assert_eq!(report.issues[0].severity, Severity::Info);
    }

    #[test]
    fn format_line() {
        let issue = Issue::new(IssueKind::LegacySyntaxError, 7, "legacy syntax")
            .suggestion("MsgBox(\"hi\")");
        assert_eq!(
            issue.format(),
            "ERROR: Line 7: legacy syntax | Suggestion: MsgBox(\"hi\")"
        );
    }
}
