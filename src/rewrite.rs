//! Auto-fix rewriter. Turns deterministic rule matches into line replacements,
//! wraps bare hotkey bodies in braces, and assembles the candidate text.
//!
//! A replacement is only kept when its brace and parenthesis balance equals
//! the balance of the code it replaces. Everything else is reported for
//! manual review.

use crate::classify::{LineCategory, LineRecord, MissingBody};
use crate::document::ScriptDocument;
use crate::report::Issue;
use crate::rules::{legacy_issue, RuleMatch};
use crate::scan::balance;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static RE_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+|0[xX][0-9A-Fa-f]+)$").unwrap());

static RE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// `%name%` variable reference inside legacy literal text.
static RE_DEREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%").unwrap());

/// Plain prose: what a bare legacy parameter looks like when it is text.
static RE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w \t.,!?'/\\:&@~+\-]*$").unwrap());

// -- Parameter rendering --------------------------------------------------------

/// How a legacy parameter is turned into an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Prose is quoted, anything that looks like an expression passes through.
    Words,
    /// The parameter is literal text: keys, paths, titles.
    Text,
    /// The parameter is already an expression.
    Expr,
}

pub fn is_numeric(p: &str) -> bool {
    RE_NUMERIC.is_match(p)
}

pub fn is_identifier(p: &str) -> bool {
    RE_IDENT.is_match(p)
}

fn is_quoted(p: &str) -> bool {
    p.len() >= 2
        && ((p.starts_with('"') && p.ends_with('"')) || (p.starts_with('\'') && p.ends_with('\'')))
}

/// `% expr` forces expression mode; a lone `%name%` is a variable.
pub fn expression_param(p: &str) -> Option<String> {
    let p = p.trim();
    if let Some(expr) = p.strip_prefix("% ") {
        return Some(expr.trim().to_string());
    }
    let caps = RE_DEREF.captures(p)?;
    let whole = caps.get(0)?;
    (whole.start() == 0 && whole.end() == p.len()).then(|| caps[1].to_string())
}

fn quote_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "`\""))
}

/// Literal text with embedded `%name%` references, as a concatenation.
fn literal_with_derefs(p: &str) -> String {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in RE_DEREF.captures_iter(p) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            parts.push(quote_literal(&p[last..whole.start()]));
        }
        parts.push(caps[1].to_string());
        last = whole.end();
    }
    if last < p.len() || parts.is_empty() {
        parts.push(quote_literal(&p[last..]));
    }
    parts.join(" ")
}

fn looks_like_words(p: &str) -> bool {
    let stripped = RE_DEREF.replace_all(p, "");
    !p.contains(":=") && RE_WORDS.is_match(&stripped) && p.chars().any(|c| c.is_alphanumeric())
}

/// Render one legacy parameter as a v2 expression. Empty stays empty so
/// omitted positional arguments survive.
pub fn render_param(raw: &str, style: ParamStyle) -> String {
    let p = raw.trim();
    if p.is_empty() {
        return String::new();
    }
    if let Some(expr) = expression_param(p) {
        return expr;
    }
    if is_quoted(p) || is_numeric(p) {
        return p.to_string();
    }
    match style {
        ParamStyle::Expr => p.to_string(),
        ParamStyle::Words if !looks_like_words(p) => p.to_string(),
        _ => literal_with_derefs(p),
    }
}

/// Like [`render_param`] in text style, but an omitted value becomes `""`.
pub fn literal_or_empty(raw: &str) -> String {
    match render_param(raw, ParamStyle::Text) {
        s if s.is_empty() => "\"\"".to_string(),
        s => s,
    }
}

/// `function(a, b, ...)` with trailing omitted arguments dropped.
pub fn call(function: &str, args: &[String]) -> String {
    let used = args.iter().rposition(|a| !a.is_empty()).map_or(0, |i| i + 1);
    format!("{}({})", function, args[..used].join(", "))
}

pub fn call_with(function: &str, params: &[String], style: ParamStyle) -> String {
    let args: Vec<String> = params.iter().map(|p| render_param(p, style)).collect();
    call(function, &args)
}

// -- Planning -------------------------------------------------------------------

/// A single rewritten line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFix {
    /// 0-based line index.
    pub index: usize,
    pub rule: &'static str,
    /// The replacement code span.
    pub code: String,
    /// The whole replacement line, indentation and comment preserved.
    pub line: String,
}

/// Braces to insert around a bare hotkey body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BraceBlock {
    /// 0-based header line; `{` goes right after it.
    pub header: usize,
    /// 0-based line after which `}` goes. Equal to `header` for an empty body.
    pub close_after: usize,
    pub indent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The rule's rewrite function declined these parameters.
    Unsupported,
    /// The replacement would change the line's brace or paren balance.
    BalanceChanged { braces: i64, parens: i64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unsupported => f.write_str("parameters need manual review"),
            Rejection::BalanceChanged { braces, parens } => write!(
                f,
                "rewrite would change balance (braces {braces:+}, parentheses {parens:+})"
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct FixPlan {
    pub fixes: Vec<LineFix>,
    pub blocks: Vec<BraceBlock>,
    /// One legacy issue per match, suggestion included.
    pub issues: Vec<Issue>,
}

impl FixPlan {
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty() && self.blocks.is_empty()
    }

    /// Lines the candidate gains over the original.
    pub fn inserted_lines(&self) -> usize {
        self.blocks.len() * 2
    }
}

/// Rewrite one matched line, or say why it can't be done safely.
pub fn plan_line(record: &LineRecord<'_>, m: &RuleMatch<'_>) -> Result<LineFix, Rejection> {
    let rewrite = m.rule.rewrite.as_ref().ok_or(Rejection::Unsupported)?;
    let code = rewrite.apply(&m.args).ok_or(Rejection::Unsupported)?;

    let (old_braces, old_parens) = balance(record.code());
    let (new_braces, new_parens) = balance(&code);
    if (old_braces, old_parens) != (new_braces, new_parens) {
        return Err(Rejection::BalanceChanged {
            braces: new_braces - old_braces,
            parens: new_parens - old_parens,
        });
    }

    let line = format!(
        "{}{}{}",
        &record.raw[..record.code.start],
        code,
        &record.raw[record.code.end..]
    );
    Ok(LineFix {
        index: record.index,
        rule: m.rule.id,
        code,
        line,
    })
}

/// Last line of a bare hotkey body: up to the first blank line, header,
/// directive or `}` outside any block the body opens itself, with a
/// terminating `return` included.
fn block_end(records: &[LineRecord<'_>], body: &MissingBody) -> usize {
    let mut last = body.header;
    let mut depth = 0i64;
    for record in &records[body.body_start..] {
        if matches!(
            record.category,
            LineCategory::HotkeyHeader | LineCategory::Directive
        ) {
            break;
        }
        let outer = depth == 0;
        if outer && (record.category == LineCategory::Blank || record.trimmed.starts_with('}')) {
            break;
        }
        if depth + record.brace_delta < 0 {
            break;
        }
        depth += record.brace_delta;
        last = record.index;
        if outer && depth == 0 && record.code().eq_ignore_ascii_case("return") {
            break;
        }
    }
    last
}

pub fn plan(
    records: &[LineRecord<'_>],
    matches: &[RuleMatch<'_>],
    missing: &[MissingBody],
) -> FixPlan {
    let mut out = FixPlan::default();

    for m in matches {
        let record = &records[m.line];
        match plan_line(record, m) {
            Ok(fix) => {
                out.issues
                    .push(legacy_issue(record, m.rule).suggestion(fix.code.clone()));
                out.fixes.push(fix);
            }
            Err(rejection) => {
                debug!(line = record.number(), rule = m.rule.id, %rejection, "rewrite rejected");
                out.issues.push(
                    legacy_issue(record, m.rule)
                        .suggestion(format!("{} ({})", m.rule.guidance, rejection)),
                );
            }
        }
    }

    for body in missing {
        out.blocks.push(BraceBlock {
            header: body.header,
            close_after: block_end(records, body),
            indent: records[body.header].indent().to_string(),
        });
    }

    out
}

/// Build the candidate text. Line endings and the trailing newline follow
/// the original document.
pub fn apply(doc: &ScriptDocument<'_>, plan: &FixPlan) -> String {
    let fixes: HashMap<usize, &str> = plan
        .fixes
        .iter()
        .map(|f| (f.index, f.line.as_str()))
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(doc.len() + plan.inserted_lines());
    for (idx, line) in doc.lines().iter().enumerate() {
        out.push(fixes.get(&idx).copied().unwrap_or(*line).to_string());
        for block in plan.blocks.iter().filter(|b| b.header == idx) {
            out.push(format!("{}{{", block.indent));
        }
        for block in plan.blocks.iter().filter(|b| b.close_after == idx) {
            out.push(format!("{}}}", block.indent));
        }
    }
    doc.join(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::rules::PatternDatabase;

    fn plan_text(text: &str) -> (FixPlan, String) {
        let doc = ScriptDocument::new(text);
        let c = classify(&doc, 3);
        let db = PatternDatabase::builtin();
        let outcome = db.match_records(&c.records);
        let p = plan(&c.records, &outcome.matches, &c.missing_bodies);
        let fixed = apply(&doc, &p);
        (p, fixed)
    }

    #[test]
    fn numeric_and_identifier() {
        assert!(is_numeric("5"));
        assert!(is_numeric("-1.5"));
        assert!(is_numeric("+10"));
        assert!(is_numeric("0x1F"));
        assert!(!is_numeric("5px"));
        assert!(is_identifier("my_var1"));
        assert!(!is_identifier("1abc"));
    }

    #[test]
    fn render_styles() {
        assert_eq!(render_param("Hello world", ParamStyle::Words), "\"Hello world\"");
        assert_eq!(render_param("a + b * 2", ParamStyle::Words), "a + b * 2");
        assert_eq!(render_param("a + b", ParamStyle::Expr), "a + b");
        assert_eq!(render_param("{Ctrl down}c", ParamStyle::Text), "\"{Ctrl down}c\"");
        assert_eq!(render_param("%name%", ParamStyle::Text), "name");
        assert_eq!(render_param("% x * 2", ParamStyle::Text), "x * 2");
        assert_eq!(render_param("\"quoted\"", ParamStyle::Text), "\"quoted\"");
        assert_eq!(render_param("  ", ParamStyle::Text), "");
    }

    #[test]
    fn derefs_become_concatenation() {
        assert_eq!(
            render_param("Hello %name%!", ParamStyle::Text),
            "\"Hello \" name \"!\""
        );
        assert_eq!(
            render_param("%dir%\\file.txt", ParamStyle::Text),
            "dir \"\\file.txt\""
        );
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(render_param("say \"hi\"", ParamStyle::Text), "\"say `\"hi`\"\"");
    }

    #[test]
    fn call_drops_trailing_empties_only() {
        let args = vec!["a".to_string(), String::new(), "c".to_string(), String::new()];
        assert_eq!(call("F", &args), "F(a, , c)");
        assert_eq!(call("F", &[]), "F()");
    }

    #[test]
    fn rewrites_line_preserving_indent_and_comment() {
        let (p, fixed) = plan_text("    MsgBox, hi ; greet");
        assert_eq!(p.fixes.len(), 1);
        assert_eq!(fixed, "    MsgBox(\"hi\") ; greet");
        assert_eq!(p.issues[0].suggestion.as_deref(), Some("MsgBox(\"hi\")"));
    }

    #[test]
    fn balance_change_is_rejected() {
        let (p, fixed) = plan_text("TrayTip, Title, Text, (5");
        assert!(p.fixes.is_empty());
        assert_eq!(fixed, "TrayTip, Title, Text, (5");
        let suggestion = p.issues[0].suggestion.as_deref().unwrap_or_default();
        assert!(suggestion.contains("change balance"));
    }

    #[test]
    fn inserts_braces_around_bare_body() {
        let text = "F1::\nSend(\"a\")\nreturn\n\nF2::MsgBox(\"b\")";
        let (p, fixed) = plan_text(text);
        assert_eq!(p.blocks.len(), 1);
        assert_eq!(
            fixed,
            "F1::\n{\nSend(\"a\")\nreturn\n}\n\nF2::MsgBox(\"b\")"
        );
        assert_eq!(fixed.lines().count(), text.lines().count() + 2);
    }

    #[test]
    fn block_stops_at_next_header() {
        let (_, fixed) = plan_text("F1::\nSend(\"a\")\nF2::Send(\"b\")");
        assert_eq!(fixed, "F1::\n{\nSend(\"a\")\n}\nF2::Send(\"b\")");
    }

    #[test]
    fn nested_block_stays_inside_body() {
        let text = "F1::\nif x {\n    Send(\"a\")\n}\nreturn\n";
        let (p, fixed) = plan_text(text);
        assert_eq!(p.blocks[0].close_after, 4);
        assert_eq!(
            fixed,
            "F1::\n{\nif x {\n    Send(\"a\")\n}\nreturn\n}\n"
        );
    }

    #[test]
    fn return_inside_nested_block_does_not_end_body() {
        let (_, fixed) = plan_text("F1::\nif x {\nreturn\n}\nSend(\"a\")\n");
        assert_eq!(fixed, "F1::\n{\nif x {\nreturn\n}\nSend(\"a\")\n}\n");
    }

    #[test]
    fn braces_follow_header_indent() {
        let (_, fixed) = plan_text("#HotIf x\n  F1::\n  Send(\"a\")\n");
        assert_eq!(fixed, "#HotIf x\n  F1::\n  {\n  Send(\"a\")\n  }\n");
    }

    #[test]
    fn crlf_is_preserved() {
        let (_, fixed) = plan_text("Sleep, 100\r\nSend, a\r\n");
        assert_eq!(fixed, "Sleep(100)\r\nSend(\"a\")\r\n");
    }
}
