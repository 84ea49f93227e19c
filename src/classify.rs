//! Line classifier: one pass over the document, categorizing each line and
//! driving the hotkey-body state machine.
//!
//! Category priority: blank/comment, directive, hotkey header, hotkey block
//! close, continuation, legacy command, modern call, unknown.

use crate::document::ScriptDocument;
use crate::quote::QuoteTracker;
use crate::report::{Issue, IssueKind};
use crate::scan::balance;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

// -- Regex patterns -----------------------------------------------------------

static RE_REQUIRES_V2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#Requires\s+AutoHotkey\s+(?:>=?\s*)?v?2\b").unwrap()
});

/// `:options:abbreviation::`, the hotstring trigger up to its terminator.
static RE_HOTSTRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:\s]*):(.+?)::").unwrap());

/// `Name, params`: legacy command-style invocation.
static RE_LEGACY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)[ \t]*,(.*)$").unwrap());

/// `Name(`: a modern function call, methods included.
static RE_MODERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*\(").unwrap());

// -- Types ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCategory {
    Blank,
    Comment,
    /// `#Requires`, `#SingleInstance`, `#HotIf`, ...
    Directive,
    /// A line carrying the `::` trigger terminator.
    HotkeyHeader,
    /// The `}` that ends an open hotkey block.
    HotkeyBlockClose,
    /// Inside a `(` or `[` left open by an earlier line.
    Continuation,
    LegacyCommand,
    ModernCall,
    Unknown,
}

/// One classified physical line.
#[derive(Debug, Clone)]
pub struct LineRecord<'a> {
    /// 0-based line index.
    pub index: usize,
    pub raw: &'a str,
    pub trimmed: &'a str,
    pub category: LineCategory,
    /// Brace delta of the code span.
    pub brace_delta: i64,
    /// Parenthesis delta of the code span.
    pub paren_delta: i64,
    /// Byte range in `raw` of the code to match: the line without indentation
    /// and inline comment, or a hotkey header's inline body.
    pub code: Range<usize>,
    /// Hotstring replacement text: never pattern-matched.
    pub literal_body: bool,
}

impl<'a> LineRecord<'a> {
    fn new(index: usize, raw: &'a str, category: LineCategory) -> Self {
        let lead = raw.len() - raw.trim_start().len();
        let end = lead + QuoteTracker::strip_comment(&raw[lead..]).trim_end().len();
        let mut record = Self {
            index,
            raw,
            trimmed: raw.trim(),
            category,
            brace_delta: 0,
            paren_delta: 0,
            code: lead..end.max(lead),
            literal_body: false,
        };
        if matches!(category, LineCategory::Blank | LineCategory::Comment) {
            record.code = lead..lead;
        }
        record.refresh_deltas();
        record
    }

    fn refresh_deltas(&mut self) {
        let (braces, parens) = balance(self.code());
        self.brace_delta = braces;
        self.paren_delta = parens;
    }

    /// 1-based line number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn code(&self) -> &'a str {
        &self.raw[self.code.clone()]
    }

    pub fn indent(&self) -> &'a str {
        &self.raw[..self.raw.len() - self.raw.trim_start().len()]
    }
}

/// A `Name, params` invocation split at its first comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCommand<'a> {
    pub name: &'a str,
    pub params: &'a str,
}

pub fn parse_legacy(code: &str) -> Option<LegacyCommand<'_>> {
    let caps = RE_LEGACY.captures(code)?;
    Some(LegacyCommand {
        name: caps.get(1)?.as_str(),
        params: caps.get(2)?.as_str(),
    })
}

/// A bare hotkey header whose body neither opens with `{` nor is indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingBody {
    /// 0-based index of the header line.
    pub header: usize,
    /// 0-based index of the first body line.
    pub body_start: usize,
}

#[derive(Debug)]
pub struct Classification<'a> {
    pub records: Vec<LineRecord<'a>>,
    pub issues: Vec<Issue>,
    pub missing_bodies: Vec<MissingBody>,
    /// A `#Requires AutoHotkey v2` directive is present.
    pub has_directive: bool,
}

// -- Hotkey triggers ------------------------------------------------------------

/// Byte offset (in `trimmed`) where a hotstring's replacement text starts.
pub fn hotstring_body_start(trimmed: &str) -> Option<usize> {
    RE_HOTSTRING.find(trimmed).map(|m| m.end())
}

enum Trigger {
    /// Body starts at this offset in the trimmed line.
    Header { body_start: usize, literal: bool },
    /// `::` with nothing before it.
    Empty,
}

fn hotkey_trigger(trimmed: &str) -> Option<Trigger> {
    if let Some(caps) = RE_HOTSTRING.captures(trimmed) {
        let options = caps.get(1).map_or("", |m| m.as_str());
        let end = caps.get(0).map_or(0, |m| m.end());
        return Some(Trigger::Header {
            body_start: end,
            literal: !options.contains(['x', 'X']),
        });
    }
    let pos = QuoteTracker::find_outside(QuoteTracker::strip_comment(trimmed), "::")?;
    let keys = trimmed[..pos].trim();
    if keys.is_empty() {
        return Some(Trigger::Empty);
    }
    if keys.contains(['(', '"', '\''])
        || keys.contains(":=")
        || RE_LEGACY.is_match(keys)
    {
        return None;
    }
    Some(Trigger::Header {
        body_start: pos + 2,
        literal: false,
    })
}

// -- State machine --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HotkeyState {
    Normal,
    /// A bare header was seen; its body must open with `{` or be indented.
    ExpectingBody { header: usize },
    /// Inside a hotkey body. `braced` is false for indentation-only bodies,
    /// which end at the first line not indented past `indent`.
    InBlock { depth: i64, braced: bool, indent: usize },
}

struct Classifier<'d, 'a> {
    doc: &'d ScriptDocument<'a>,
    lookahead: usize,
    state: HotkeyState,
    open_groups: i64,
    out: Classification<'a>,
}

/// Classify every line of `doc`. `lookahead` bounds how far after a bare
/// hotkey header its body may start.
pub fn classify<'a>(doc: &ScriptDocument<'a>, lookahead: usize) -> Classification<'a> {
    let mut classifier = Classifier {
        doc,
        lookahead,
        state: HotkeyState::Normal,
        open_groups: 0,
        out: Classification {
            records: Vec::with_capacity(doc.len()),
            issues: Vec::new(),
            missing_bodies: Vec::new(),
            has_directive: false,
        },
    };
    for idx in 0..doc.len() {
        classifier.process_line(idx);
    }
    debug!(
        lines = classifier.out.records.len(),
        missing_bodies = classifier.out.missing_bodies.len(),
        "classified document"
    );
    classifier.out
}

impl<'a> Classifier<'_, 'a> {
    fn process_line(&mut self, idx: usize) {
        let raw = self.doc.lines()[idx];

        if let HotkeyState::ExpectingBody { header } = self.state {
            if idx - header > self.lookahead {
                self.state = HotkeyState::Normal;
            }
        }

        if self.doc.is_blank(idx) {
            self.out.records.push(LineRecord::new(idx, raw, LineCategory::Blank));
            return;
        }
        if self.doc.is_comment(idx) {
            self.out.records.push(LineRecord::new(idx, raw, LineCategory::Comment));
            return;
        }

        let mut record = LineRecord::new(idx, raw, LineCategory::Unknown);
        let trimmed = record.trimmed;

        if trimmed.starts_with('#') {
            record.category = LineCategory::Directive;
            if RE_REQUIRES_V2.is_match(trimmed) {
                self.out.has_directive = true;
            }
            self.resolve_pending_body(&record);
            self.open_groups = 0;
            self.out.records.push(record);
            return;
        }

        match hotkey_trigger(trimmed) {
            Some(Trigger::Header { body_start, literal }) => {
                self.enter_header(&mut record, body_start, literal);
            }
            Some(Trigger::Empty) => {
                self.resolve_pending_body(&record);
                self.out.issues.push(
                    Issue::new(IssueKind::StructuralError, record.number(), "invalid hotkey definition")
                        .snippet(raw)
                        .rule("hotkey-trigger"),
                );
            }
            None => {
                self.resolve_pending_body(&record);
                self.categorize_code(&mut record);
            }
        }

        if record.category != LineCategory::HotkeyHeader || !record.literal_body {
            self.open_groups = (self.open_groups + group_delta(record.code())).max(0);
        }
        self.out.records.push(record);
    }

    fn enter_header(&mut self, record: &mut LineRecord<'a>, body_start: usize, literal: bool) {
        record.category = LineCategory::HotkeyHeader;
        record.literal_body = literal;

        let lead = record.raw.len() - record.raw.trim_start().len();
        let body_abs = lead + body_start;
        let rest = &record.raw[body_abs..];
        let rest = if literal { rest } else { QuoteTracker::strip_comment(rest) };
        let start = body_abs + (rest.len() - rest.trim_start().len());
        let end = (body_abs + rest.trim_end().len()).max(start);
        record.code = start..end;
        record.refresh_deltas();
        self.open_groups = 0;

        let body = record.code();
        self.state = if body.is_empty() {
            // Stacked headers share the body that follows the last one.
            HotkeyState::ExpectingBody { header: record.index }
        } else if !literal && body.starts_with('{') && record.brace_delta > 0 {
            HotkeyState::InBlock {
                depth: record.brace_delta,
                braced: true,
                indent: record.indent().len(),
            }
        } else {
            HotkeyState::Normal
        };
    }

    /// First code line after a bare header decides whether the body is valid.
    fn resolve_pending_body(&mut self, record: &LineRecord<'a>) {
        let HotkeyState::ExpectingBody { header } = self.state else {
            return;
        };
        let header_raw = self.doc.lines()[header];
        let indent = header_raw.len() - header_raw.trim_start().len();
        let braced = record.trimmed.starts_with('{');
        if braced || record.indent().len() > indent {
            self.state = HotkeyState::InBlock { depth: 0, braced, indent };
            return;
        }
        self.out.issues.push(
            Issue::new(
                IssueKind::StructuralError,
                header + 1,
                "hotkey missing opening brace or indentation",
            )
            .snippet(header_raw)
            .suggestion("wrap the hotkey body in { }")
            .rule("hotkey-body"),
        );
        self.out.missing_bodies.push(MissingBody {
            header,
            body_start: record.index,
        });
        self.state = HotkeyState::Normal;
    }

    fn categorize_code(&mut self, record: &mut LineRecord<'a>) {
        if let HotkeyState::InBlock { depth, braced, indent } = self.state {
            if !braced && depth <= 0 && record.indent().len() <= indent {
                self.state = HotkeyState::Normal;
            } else {
                let depth = depth + record.brace_delta;
                if record.trimmed == "}" && depth <= 0 {
                    record.category = LineCategory::HotkeyBlockClose;
                    self.state = HotkeyState::Normal;
                    return;
                }
                self.state = HotkeyState::InBlock { depth, braced, indent };
            }
        }

        let first = record.trimmed.chars().next();
        let continued = self.open_groups > 0
            && (!record.indent().is_empty() || matches!(first, Some(')' | ']' | ',')));
        if self.open_groups > 0 && !continued {
            self.open_groups = 0;
        }

        let code = record.code();
        record.category = if continued {
            LineCategory::Continuation
        } else if parse_legacy(code).is_some() {
            LineCategory::LegacyCommand
        } else if RE_MODERN.is_match(code) {
            LineCategory::ModernCall
        } else {
            LineCategory::Unknown
        };
    }
}

/// Net `(`/`[` depth of code outside string literals.
fn group_delta(code: &str) -> i64 {
    QuoteTracker::mask_strings(code)
        .chars()
        .fold(0, |acc, ch| match ch {
            '(' | '[' => acc + 1,
            ')' | ']' => acc - 1,
            _ => acc,
        })
}
