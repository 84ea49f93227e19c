//! Legacy pattern database: a declarative table mapping v1 command forms to
//! their v2 equivalents, and the matching engine that consumes it.
//!
//! ## Matching
//!
//! | Line | Behavior |
//! |------|----------|
//! | `Name, params` with a rule | deterministic rules are queued for the rewriter, manual ones become issues |
//! | `Name, params` without a rule | style warning |
//! | expression code | style warning for removed names, unless a modern replacement is on the same line |
//!
//! Template rules match the whole command text and win over the plain
//! leading-identifier rule for the same name. Adding a construct is a new
//! table entry in [`builtin_rules`].

use crate::classify::{parse_legacy, LegacyCommand, LineCategory, LineRecord};
use crate::params::split_params;
use crate::quote::QuoteTracker;
use crate::report::{Issue, IssueKind};
use crate::rewrite::{
    call, call_with, expression_param, is_identifier, is_numeric, literal_or_empty, render_param,
    ParamStyle,
};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use tracing::{debug, trace};

// -- Templates ------------------------------------------------------------------

static RE_SOUNDSET_MUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^SoundSet\s*,\s*(\+1|-1|1|0|On|Off|Toggle)\s*,\s*(?:Master)?\s*,\s*Mute\s*$")
        .unwrap()
});

static RE_SOUNDGET_MUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^SoundGet\s*,\s*([A-Za-z_]\w*)\s*,\s*(?:Master)?\s*,\s*Mute\s*$").unwrap()
});

static RE_SOUNDGET_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^SoundGet\s*,\s*([A-Za-z_]\w*)\s*(?:,\s*(?:Master)?\s*(?:,\s*(?:Volume|Vol)\s*)?)?$",
    )
    .unwrap()
});

static RE_LOOP_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Loop\s*,\s*(Parse|Read|Files|Reg)\b").unwrap());

// -- Rule model -----------------------------------------------------------------

/// Rewrite function: receives the split parameters (leading rules) or the
/// template's capture groups, returns the modern code or `None` when the
/// parameters don't fit a safe rewrite.
pub type RewriteFn = fn(&[String]) -> Option<String>;

#[derive(Clone, Copy)]
pub enum Rewrite {
    /// `Function(p1, p2, ...)` with every parameter rendered in `style`.
    Call {
        function: &'static str,
        style: ParamStyle,
    },
    /// `out := Function(p2, ...)`: the first parameter names the output variable.
    Assign {
        function: &'static str,
        style: ParamStyle,
    },
    Custom(RewriteFn),
}

impl Rewrite {
    pub fn apply(&self, args: &[String]) -> Option<String> {
        match *self {
            Rewrite::Call { function, style } => Some(call_with(function, args, style)),
            Rewrite::Assign { function, style } => {
                let (out, rest) = args.split_first()?;
                if !is_identifier(out) {
                    return None;
                }
                Some(format!("{} := {}", out, call_with(function, rest, style)))
            }
            Rewrite::Custom(f) => f(args),
        }
    }
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rewrite::Call { function, style } => write!(f, "Call({function}, {style:?})"),
            Rewrite::Assign { function, style } => write!(f, "Assign({function}, {style:?})"),
            Rewrite::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Safe to rewrite without review.
    Auto,
    /// Surfaced as guidance only.
    Manual,
}

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// The leading identifier alone selects the rule.
    Leading,
    /// The whole command text must match.
    Template(&'static LazyLock<Regex>),
}

#[derive(Debug, Clone)]
pub struct LegacyRule {
    pub id: &'static str,
    /// The v1 command name, matched as a whole word, case-insensitively.
    pub symbol: &'static str,
    pub matcher: Matcher,
    /// Modern names that replace `symbol`. A line already using one of them
    /// never triggers the rule.
    pub modern: &'static [&'static str],
    pub guidance: &'static str,
    pub rewrite: Option<Rewrite>,
    pub confidence: Confidence,
    /// `symbol` no longer exists in v2, so seeing it in an expression is
    /// worth a style warning.
    pub removed: bool,
}

impl LegacyRule {
    pub fn new(id: &'static str, symbol: &'static str, guidance: &'static str) -> Self {
        Self {
            id,
            symbol,
            matcher: Matcher::Leading,
            modern: &[],
            guidance,
            rewrite: None,
            confidence: Confidence::Manual,
            removed: false,
        }
    }

    pub fn template(mut self, re: &'static LazyLock<Regex>) -> Self {
        self.matcher = Matcher::Template(re);
        self
    }

    pub fn modern(mut self, forms: &'static [&'static str]) -> Self {
        self.modern = forms;
        self
    }

    /// Deterministic rewrite applied by the fixer.
    pub fn auto(mut self, rewrite: Rewrite) -> Self {
        self.rewrite = Some(rewrite);
        self.confidence = Confidence::Auto;
        self
    }

    /// Rewrite shown as a suggestion only.
    pub fn suggest(mut self, rewrite: Rewrite) -> Self {
        self.rewrite = Some(rewrite);
        self.confidence = Confidence::Manual;
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    pub fn is_deterministic(&self) -> bool {
        self.confidence == Confidence::Auto && self.rewrite.is_some()
    }

    /// True when `code` already uses one of the modern replacements.
    pub fn suppressed_by(&self, code: &str) -> bool {
        self.modern.iter().any(|m| contains_word(code, m))
    }
}

/// A legacy line queued for the rewriter.
#[derive(Debug, Clone)]
pub struct RuleMatch<'r> {
    /// 0-based line index.
    pub line: usize,
    pub rule: &'r LegacyRule,
    /// Split parameters, or template captures.
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MatchOutcome<'r> {
    pub matches: Vec<RuleMatch<'r>>,
    pub issues: Vec<Issue>,
}

pub(crate) fn legacy_issue(record: &LineRecord<'_>, rule: &LegacyRule) -> Issue {
    Issue::new(
        IssueKind::LegacySyntaxError,
        record.number(),
        format!("legacy `{}` command syntax is not valid in v2", rule.symbol),
    )
    .snippet(record.raw)
    .rule(rule.id)
}

/// Whole-word, ASCII case-insensitive search.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let hay = haystack.to_ascii_lowercase();
    let needle = word.to_ascii_lowercase();
    let bytes = hay.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    hay.match_indices(&needle).any(|(i, _)| {
        let end = i + needle.len();
        (i == 0 || !is_word(bytes[i - 1])) && (end == bytes.len() || !is_word(bytes[end]))
    })
}

// -- Database -------------------------------------------------------------------

#[derive(Debug)]
pub struct PatternDatabase {
    rules: Vec<LegacyRule>,
    by_symbol: HashMap<String, Vec<usize>>,
    /// One rule per removed symbol, for expression-context warnings.
    removed: Vec<usize>,
    invocations: AtomicUsize,
}

impl Default for PatternDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternDatabase {
    pub fn new(rules: Vec<LegacyRule>) -> Self {
        let mut by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            by_symbol
                .entry(rule.symbol.to_ascii_lowercase())
                .or_default()
                .push(i);
        }

        // Prefer the generic rule's guidance over a template's.
        let mut removed = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let leading_first = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r.matcher, Matcher::Leading))
            .chain(
                rules
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| matches!(r.matcher, Matcher::Template(_))),
            );
        for (i, rule) in leading_first {
            if rule.removed && seen.insert(rule.symbol.to_ascii_lowercase()) {
                removed.push(i);
            }
        }

        Self {
            rules,
            by_symbol,
            removed,
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_rules())
    }

    pub fn rules(&self) -> &[LegacyRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&LegacyRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// How many times [`PatternDatabase::match_records`] has run.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Select the rule for a legacy command. Template rules take precedence
    /// over the leading-identifier rule for the same name.
    pub fn lookup(&self, cmd: LegacyCommand<'_>, code: &str) -> Option<(&LegacyRule, Vec<String>)> {
        let candidates = self.by_symbol.get(&cmd.name.to_ascii_lowercase())?;

        for &i in candidates {
            let rule = &self.rules[i];
            if let Matcher::Template(re) = rule.matcher {
                if let Some(caps) = re.captures(code) {
                    let args = caps
                        .iter()
                        .skip(1)
                        .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                        .collect();
                    return Some((rule, args));
                }
            }
        }

        candidates
            .iter()
            .map(|&i| &self.rules[i])
            .find(|r| matches!(r.matcher, Matcher::Leading))
            .map(|r| (r, split_params(cmd.params)))
    }

    /// Run every classified line against the table.
    pub fn match_records<'r>(&'r self, records: &[LineRecord<'_>]) -> MatchOutcome<'r> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        let mut out = MatchOutcome::default();

        for record in records {
            let code = record.code();
            match record.category {
                LineCategory::LegacyCommand => self.match_legacy(record, code, &mut out),
                LineCategory::HotkeyHeader if !record.literal_body && !code.is_empty() => {
                    if parse_legacy(code).is_some() {
                        self.match_legacy(record, code, &mut out);
                    } else {
                        self.scan_removed_names(record, code, &mut out);
                    }
                }
                LineCategory::ModernCall | LineCategory::Unknown => {
                    self.scan_removed_names(record, code, &mut out)
                }
                _ => {}
            }
        }

        debug!(
            queued = out.matches.len(),
            issues = out.issues.len(),
            "pattern matching finished"
        );
        out
    }

    fn match_legacy<'r>(&'r self, record: &LineRecord<'_>, code: &str, out: &mut MatchOutcome<'r>) {
        let Some(cmd) = parse_legacy(code) else {
            return;
        };

        let Some((rule, args)) = self.lookup(cmd, code) else {
            out.issues.push(
                Issue::new(
                    IssueKind::StyleWarning,
                    record.number(),
                    format!("possible legacy command syntax `{}, ...`", cmd.name),
                )
                .snippet(record.raw)
                .suggestion(format!("{}(...)", cmd.name))
                .rule("unknown-command"),
            );
            return;
        };

        if rule.suppressed_by(code) {
            trace!(line = record.number(), rule = rule.id, "suppressed by modern form");
            return;
        }
        trace!(line = record.number(), rule = rule.id, "legacy rule matched");

        if rule.is_deterministic() {
            out.matches.push(RuleMatch {
                line: record.index,
                rule,
                args,
            });
            return;
        }

        let suggestion = match rule.rewrite.as_ref().and_then(|r| r.apply(&args)) {
            Some(code) => format!("{} ({})", code, rule.guidance),
            None => rule.guidance.to_string(),
        };
        out.issues.push(legacy_issue(record, rule).suggestion(suggestion));
    }

    fn scan_removed_names(&self, record: &LineRecord<'_>, code: &str, out: &mut MatchOutcome<'_>) {
        let masked = QuoteTracker::mask_strings(code);
        for &i in &self.removed {
            let rule = &self.rules[i];
            if contains_word(&masked, rule.symbol) && !rule.suppressed_by(&masked) {
                out.issues.push(
                    Issue::new(
                        IssueKind::StyleWarning,
                        record.number(),
                        format!("`{}` was removed in v2", rule.symbol),
                    )
                    .snippet(record.raw)
                    .suggestion(rule.guidance)
                    .rule(rule.id),
                );
            }
        }
    }
}

// -- Rewrite functions ----------------------------------------------------------

fn arg(args: &[String], i: usize) -> &str {
    args.get(i).map_or("", |s| s.trim())
}

fn output_var(args: &[String], i: usize) -> Option<&str> {
    let name = arg(args, i);
    is_identifier(name).then_some(name)
}

/// `&name` for an output parameter, empty when omitted.
fn out_ref(args: &[String], i: usize) -> Option<String> {
    match arg(args, i) {
        "" => Some(String::new()),
        name if is_identifier(name) => Some(format!("&{name}")),
        _ => None,
    }
}

/// Numeric parameters accept a number, a variable or a forced expression.
fn number_or_expr(p: &str) -> Option<String> {
    if is_numeric(p) || is_identifier(p) {
        Some(p.to_string())
    } else {
        expression_param(p)
    }
}

fn soundset_mute(args: &[String]) -> Option<String> {
    let value = match arg(args, 0).to_ascii_lowercase().as_str() {
        "+1" | "-1" | "toggle" => "-1",
        "1" | "on" => "1",
        "0" | "off" => "0",
        _ => return None,
    };
    Some(format!("SoundSetMute({value})"))
}

fn soundset_volume(args: &[String]) -> Option<String> {
    let component = arg(args, 1);
    let control = arg(args, 2);
    let component_ok = component.is_empty() || component.eq_ignore_ascii_case("master");
    let control_ok = control.is_empty()
        || control.eq_ignore_ascii_case("volume")
        || control.eq_ignore_ascii_case("vol");
    if !component_ok || !control_ok || !arg(args, 3).is_empty() {
        return None;
    }
    let setting = arg(args, 0);
    // Relative changes are passed as strings in v2.
    let value = if is_numeric(setting) && setting.starts_with(['+', '-']) {
        format!("\"{setting}\"")
    } else {
        number_or_expr(setting)?
    };
    Some(call("SoundSetVolume", &[value]))
}

fn soundget_mute(args: &[String]) -> Option<String> {
    Some(format!("{} := SoundGetMute()", output_var(args, 0)?))
}

fn soundget_volume(args: &[String]) -> Option<String> {
    Some(format!("{} := SoundGetVolume()", output_var(args, 0)?))
}

fn string_replace(args: &[String]) -> Option<String> {
    let out = output_var(args, 0)?;
    let input = output_var(args, 1)?;
    if arg(args, 2).is_empty() {
        return None;
    }
    let find = render_param(arg(args, 2), ParamStyle::Text);
    let replace = literal_or_empty(arg(args, 3));
    let all = matches!(arg(args, 4).to_ascii_lowercase().as_str(), "all" | "a" | "1");
    let mut call_args = vec![input.to_string(), find, replace];
    if !all {
        // v1 replaced only the first occurrence unless told otherwise.
        call_args.extend([String::new(), String::new(), "1".to_string()]);
    }
    Some(format!("{} := {}", out, call("StrReplace", &call_args)))
}

fn string_split(args: &[String]) -> Option<String> {
    let out = output_var(args, 0)?;
    let input = output_var(args, 1)?;
    let call_args = [
        input.to_string(),
        render_param(arg(args, 2), ParamStyle::Text),
        render_param(arg(args, 3), ParamStyle::Text),
    ];
    Some(format!("{} := {}", out, call("StrSplit", &call_args)))
}

fn case_convert(args: &[String], function: &str) -> Option<String> {
    let out = output_var(args, 0)?;
    let input = output_var(args, 1)?;
    let function = match arg(args, 2) {
        "" => function,
        t if t.eq_ignore_ascii_case("t") => "StrTitle",
        _ => return None,
    };
    Some(format!("{} := {}({})", out, function, input))
}

fn string_lower(args: &[String]) -> Option<String> {
    case_convert(args, "StrLower")
}

fn string_upper(args: &[String]) -> Option<String> {
    case_convert(args, "StrUpper")
}

/// Character count for the trim/left/right family.
enum Count {
    Literal(u64),
    /// A variable, or a parenthesised expression, safe to negate or add to.
    Term(String),
}

impl Count {
    /// Zero and signed counts mean something else to `SubStr`, so they are
    /// left for manual review.
    fn parse(p: &str) -> Option<Self> {
        if p.bytes().all(|b| b.is_ascii_digit()) {
            return p.parse().ok().filter(|&n| n > 0).map(Count::Literal);
        }
        if is_identifier(p) {
            return Some(Count::Term(p.to_string()));
        }
        let expr = expression_param(p)?;
        if expr.is_empty() || is_numeric(&expr) {
            return None;
        }
        Some(Count::Term(if is_identifier(&expr) {
            expr
        } else {
            format!("({expr})")
        }))
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Literal(n) => write!(f, "{n}"),
            Count::Term(t) => f.write_str(t),
        }
    }
}

/// `out := SubStr(in, ...)` for the v1 trim/left/right family.
fn substring(args: &[String], build: fn(&Count) -> Option<String>) -> Option<String> {
    let out = output_var(args, 0)?;
    let input = output_var(args, 1)?;
    let count = Count::parse(arg(args, 2))?;
    Some(format!("{} := SubStr({}, {})", out, input, build(&count)?))
}

fn string_trim_left(args: &[String]) -> Option<String> {
    substring(args, |n| match n {
        Count::Literal(n) => Some(n.checked_add(1)?.to_string()),
        Count::Term(t) => Some(format!("{t} + 1")),
    })
}

fn string_trim_right(args: &[String]) -> Option<String> {
    substring(args, |n| Some(format!("1, -{n}")))
}

fn string_left(args: &[String]) -> Option<String> {
    substring(args, |n| Some(format!("1, {n}")))
}

fn string_right(args: &[String]) -> Option<String> {
    substring(args, |n| Some(format!("-{n}")))
}

fn set_env(args: &[String]) -> Option<String> {
    let var = output_var(args, 0)?;
    Some(format!("{} := {}", var, literal_or_empty(arg(args, 1))))
}

fn env_math(args: &[String], op: &str) -> Option<String> {
    let var = output_var(args, 0)?;
    if !arg(args, 2).is_empty() {
        // Time-unit arithmetic became DateAdd/DateDiff.
        return None;
    }
    Some(format!("{} {} {}", var, op, number_or_expr(arg(args, 1))?))
}

fn env_add(args: &[String]) -> Option<String> {
    env_math(args, "+=")
}

fn env_sub(args: &[String]) -> Option<String> {
    env_math(args, "-=")
}

fn if_call(args: &[String], negate: bool, function: &str) -> Option<String> {
    let bang = if negate { "!" } else { "" };
    Some(format!(
        "if {}{}",
        bang,
        call_with(function, args, ParamStyle::Text)
    ))
}

fn if_win_active(args: &[String]) -> Option<String> {
    if_call(args, false, "WinActive")
}

fn if_win_not_active(args: &[String]) -> Option<String> {
    if_call(args, true, "WinActive")
}

fn if_win_exist(args: &[String]) -> Option<String> {
    if_call(args, false, "WinExist")
}

fn if_win_not_exist(args: &[String]) -> Option<String> {
    if_call(args, true, "WinExist")
}

fn if_exist(args: &[String]) -> Option<String> {
    if_call(args, false, "FileExist")
}

fn if_not_exist(args: &[String]) -> Option<String> {
    if_call(args, true, "FileExist")
}

fn if_compare(args: &[String], op: &str) -> Option<String> {
    if args.len() > 2 {
        return None;
    }
    let var = output_var(args, 0)?;
    Some(format!("if ({} {} {})", var, op, literal_or_empty(arg(args, 1))))
}

fn if_equal(args: &[String]) -> Option<String> {
    if_compare(args, "=")
}

fn if_not_equal(args: &[String]) -> Option<String> {
    if_compare(args, "!=")
}

fn if_greater(args: &[String]) -> Option<String> {
    if_compare(args, ">")
}

fn if_greater_or_equal(args: &[String]) -> Option<String> {
    if_compare(args, ">=")
}

fn if_less(args: &[String]) -> Option<String> {
    if_compare(args, "<")
}

fn if_less_or_equal(args: &[String]) -> Option<String> {
    if_compare(args, "<=")
}

/// `MsgBox, Options, Title, Text[, Timeout]` reorders to
/// `MsgBox(Text, Title, Options)`; anything else is positional.
fn msgbox(args: &[String]) -> Option<String> {
    if args.len() < 3 || !is_numeric(arg(args, 0)) {
        return Some(call_with("MsgBox", args, ParamStyle::Words));
    }
    if args.len() > 4 {
        return None;
    }
    let options = match arg(args, 3) {
        "" => arg(args, 0).to_string(),
        timeout if is_numeric(timeout) => format!("\"{} T{}\"", arg(args, 0), timeout),
        _ => return None,
    };
    let call_args = [
        literal_or_empty(arg(args, 2)),
        render_param(arg(args, 1), ParamStyle::Text),
        options,
    ];
    Some(call("MsgBox", &call_args))
}

/// `TrayTip, Title, Text, Seconds, Options` becomes
/// `TrayTip(Text, Title, Options)`; the seconds parameter is gone in v2.
fn traytip(args: &[String]) -> Option<String> {
    let call_args = [
        render_param(arg(args, 1), ParamStyle::Text),
        render_param(arg(args, 0), ParamStyle::Text),
        render_param(arg(args, 3), ParamStyle::Expr),
    ];
    Some(call("TrayTip", &call_args))
}

fn run_like(args: &[String], function: &str) -> Option<String> {
    if args.len() > 4 {
        return None;
    }
    let call_args = [
        render_param(arg(args, 0), ParamStyle::Text),
        render_param(arg(args, 1), ParamStyle::Text),
        render_param(arg(args, 2), ParamStyle::Text),
        out_ref(args, 3)?,
    ];
    Some(call(function, &call_args))
}

fn run(args: &[String]) -> Option<String> {
    run_like(args, "Run")
}

fn run_wait(args: &[String]) -> Option<String> {
    run_like(args, "RunWait")
}

/// `WinMove, X, Y` or `WinMove, Title, Text, X, Y[, W, H]`; v2 takes the
/// coordinates first.
fn win_move(args: &[String]) -> Option<String> {
    if args.len() == 2 {
        let x = number_or_expr(arg(args, 0))?;
        let y = number_or_expr(arg(args, 1))?;
        return Some(call("WinMove", &[x, y]));
    }
    if !(3..=6).contains(&args.len()) {
        return None;
    }
    let mut call_args: Vec<String> = (2..6)
        .map(|i| render_param(arg(args, i), ParamStyle::Expr))
        .collect();
    call_args.push(render_param(arg(args, 0), ParamStyle::Text));
    call_args.push(render_param(arg(args, 1), ParamStyle::Text));
    Some(call("WinMove", &call_args))
}

fn win_get_pos(args: &[String]) -> Option<String> {
    let mut call_args = (0..4).map(|i| out_ref(args, i)).collect::<Option<Vec<_>>>()?;
    call_args.extend((4..args.len().max(4)).map(|i| render_param(arg(args, i), ParamStyle::Text)));
    Some(call("WinGetPos", &call_args))
}

fn mouse_get_pos(args: &[String]) -> Option<String> {
    let mut call_args = (0..4).map(|i| out_ref(args, i)).collect::<Option<Vec<_>>>()?;
    call_args.push(render_param(arg(args, 4), ParamStyle::Expr));
    Some(call("MouseGetPos", &call_args))
}

fn format_time(args: &[String]) -> Option<String> {
    let out = output_var(args, 0)?;
    let time = match arg(args, 1) {
        "" => String::new(),
        t => number_or_expr(t)?,
    };
    let call_args = [time, render_param(arg(args, 2), ParamStyle::Text)];
    Some(format!("{} := {}", out, call("FormatTime", &call_args)))
}

fn loop_count(args: &[String]) -> Option<String> {
    if args.len() != 1 {
        return None;
    }
    Some(format!("Loop {}", number_or_expr(arg(args, 0))?))
}

// -- Table ----------------------------------------------------------------------

const fn text_call(function: &'static str) -> Rewrite {
    Rewrite::Call {
        function,
        style: ParamStyle::Text,
    }
}

/// The built-in v1 → v2 rule table.
pub fn builtin_rules() -> Vec<LegacyRule> {
    use ParamStyle::{Expr, Text, Words};
    use Rewrite::{Assign, Call, Custom};

    const SOUNDSET_MODERN: &[&str] = &["SoundSetVolume", "SoundSetMute"];
    const SOUNDGET_MODERN: &[&str] = &["SoundGetVolume", "SoundGetMute"];

    vec![
        // Sound
        LegacyRule::new("soundset-mute", "SoundSet", "SoundSetMute(-1) toggles; SoundSetMute(1) or SoundSetMute(0) sets")
            .template(&RE_SOUNDSET_MUTE)
            .modern(SOUNDSET_MODERN)
            .auto(Custom(soundset_mute))
            .removed(),
        LegacyRule::new("soundset-volume", "SoundSet", "SoundSetVolume(n) or SoundSetMute(n)")
            .modern(SOUNDSET_MODERN)
            .auto(Custom(soundset_volume))
            .removed(),
        LegacyRule::new("soundget-mute", "SoundGet", "var := SoundGetMute()")
            .template(&RE_SOUNDGET_MUTE)
            .modern(SOUNDGET_MODERN)
            .auto(Custom(soundget_mute))
            .removed(),
        LegacyRule::new("soundget-volume", "SoundGet", "var := SoundGetVolume()")
            .template(&RE_SOUNDGET_VOLUME)
            .modern(SOUNDGET_MODERN)
            .auto(Custom(soundget_volume))
            .removed(),
        LegacyRule::new("soundget", "SoundGet", "SoundGetVolume() or SoundGetMute()")
            .modern(SOUNDGET_MODERN)
            .removed(),
        // Strings
        LegacyRule::new("stringreplace", "StringReplace", "out := StrReplace(in, find, replace)")
            .modern(&["StrReplace"])
            .auto(Custom(string_replace))
            .removed(),
        LegacyRule::new(
            "stringsplit",
            "StringSplit",
            "StrSplit() returns an array; rewrite Out1, Out2 as Out[1], Out[2]",
        )
        .modern(&["StrSplit"])
        .suggest(Custom(string_split))
        .removed(),
        LegacyRule::new("stringlen", "StringLen", "out := StrLen(in)")
            .modern(&["StrLen"])
            .auto(Assign { function: "StrLen", style: Expr })
            .removed(),
        LegacyRule::new("stringlower", "StringLower", "out := StrLower(in)")
            .modern(&["StrLower", "StrTitle"])
            .auto(Custom(string_lower))
            .removed(),
        LegacyRule::new("stringupper", "StringUpper", "out := StrUpper(in)")
            .modern(&["StrUpper", "StrTitle"])
            .auto(Custom(string_upper))
            .removed(),
        LegacyRule::new("stringtrimleft", "StringTrimLeft", "out := SubStr(in, n + 1)")
            .modern(&["SubStr"])
            .auto(Custom(string_trim_left))
            .removed(),
        LegacyRule::new("stringtrimright", "StringTrimRight", "out := SubStr(in, 1, -n)")
            .modern(&["SubStr"])
            .auto(Custom(string_trim_right))
            .removed(),
        LegacyRule::new("stringleft", "StringLeft", "out := SubStr(in, 1, n)")
            .modern(&["SubStr"])
            .auto(Custom(string_left))
            .removed(),
        LegacyRule::new("stringright", "StringRight", "out := SubStr(in, -n)")
            .modern(&["SubStr"])
            .auto(Custom(string_right))
            .removed(),
        LegacyRule::new("stringmid", "StringMid", "out := SubStr(in, start, count)")
            .modern(&["SubStr"])
            .removed(),
        LegacyRule::new(
            "stringgetpos",
            "StringGetPos",
            "pos := InStr(haystack, needle) - 1 (v2 positions are 1-based)",
        )
        .modern(&["InStr"])
        .removed(),
        // Variables
        LegacyRule::new("setenv", "SetEnv", "var := value")
            .auto(Custom(set_env))
            .removed(),
        LegacyRule::new("envadd", "EnvAdd", "var += n, or DateAdd() for time units")
            .modern(&["DateAdd"])
            .auto(Custom(env_add))
            .removed(),
        LegacyRule::new("envsub", "EnvSub", "var -= n, or DateDiff() for time units")
            .modern(&["DateDiff"])
            .auto(Custom(env_sub))
            .removed(),
        LegacyRule::new("envget", "EnvGet", "out := EnvGet(name)")
            .auto(Assign { function: "EnvGet", style: Text }),
        LegacyRule::new("transform", "Transform", "use the matching v2 function (Chr, Ord, Round, Mod, ...)")
            .removed(),
        LegacyRule::new("random", "Random", "out := Random(min, max)")
            .auto(Assign { function: "Random", style: Expr }),
        LegacyRule::new("formattime", "FormatTime", "out := FormatTime(time, format)")
            .auto(Custom(format_time)),
        // Files and directories
        LegacyRule::new("filecreatedir", "FileCreateDir", "DirCreate(path)")
            .modern(&["DirCreate"])
            .auto(text_call("DirCreate"))
            .removed(),
        LegacyRule::new("fileremovedir", "FileRemoveDir", "DirDelete(path, recurse)")
            .modern(&["DirDelete"])
            .auto(text_call("DirDelete"))
            .removed(),
        LegacyRule::new("fileselectfile", "FileSelectFile", "path := FileSelect(options, root, title, filter)")
            .modern(&["FileSelect"])
            .removed(),
        LegacyRule::new("fileselectfolder", "FileSelectFolder", "path := DirSelect(start, options, prompt)")
            .modern(&["DirSelect"])
            .removed(),
        LegacyRule::new("fileread", "FileRead", "out := FileRead(path)")
            .auto(Assign { function: "FileRead", style: Text }),
        LegacyRule::new("fileappend", "FileAppend", "FileAppend(text, path)").auto(text_call("FileAppend")),
        LegacyRule::new("filedelete", "FileDelete", "FileDelete(pattern)").auto(text_call("FileDelete")),
        LegacyRule::new("filecopy", "FileCopy", "FileCopy(source, dest, overwrite)").auto(text_call("FileCopy")),
        LegacyRule::new("filemove", "FileMove", "FileMove(source, dest, overwrite)").auto(text_call("FileMove")),
        // Conditionals
        LegacyRule::new("ifwinactive", "IfWinActive", "if WinActive(title)")
            .modern(&["WinActive"])
            .auto(Custom(if_win_active))
            .removed(),
        LegacyRule::new("ifwinnotactive", "IfWinNotActive", "if !WinActive(title)")
            .modern(&["WinActive"])
            .auto(Custom(if_win_not_active))
            .removed(),
        LegacyRule::new("ifwinexist", "IfWinExist", "if WinExist(title)")
            .modern(&["WinExist"])
            .auto(Custom(if_win_exist))
            .removed(),
        LegacyRule::new("ifwinnotexist", "IfWinNotExist", "if !WinExist(title)")
            .modern(&["WinExist"])
            .auto(Custom(if_win_not_exist))
            .removed(),
        LegacyRule::new("ifexist", "IfExist", "if FileExist(path)")
            .modern(&["FileExist"])
            .auto(Custom(if_exist))
            .removed(),
        LegacyRule::new("ifnotexist", "IfNotExist", "if !FileExist(path)")
            .modern(&["FileExist"])
            .auto(Custom(if_not_exist))
            .removed(),
        LegacyRule::new("ifequal", "IfEqual", "if (var = value)").auto(Custom(if_equal)).removed(),
        LegacyRule::new("ifnotequal", "IfNotEqual", "if (var != value)").auto(Custom(if_not_equal)).removed(),
        LegacyRule::new("ifgreater", "IfGreater", "if (var > value)").auto(Custom(if_greater)).removed(),
        LegacyRule::new("ifgreaterorequal", "IfGreaterOrEqual", "if (var >= value)")
            .auto(Custom(if_greater_or_equal))
            .removed(),
        LegacyRule::new("ifless", "IfLess", "if (var < value)").auto(Custom(if_less)).removed(),
        LegacyRule::new("iflessorequal", "IfLessOrEqual", "if (var <= value)")
            .auto(Custom(if_less_or_equal))
            .removed(),
        // Output and interaction
        LegacyRule::new("msgbox", "MsgBox", "MsgBox(\"Text\")").auto(Custom(msgbox)),
        LegacyRule::new("traytip", "TrayTip", "TrayTip(\"Text\", \"Title\")").auto(Custom(traytip)),
        LegacyRule::new("tooltip", "ToolTip", "ToolTip(\"Text\", x, y)")
            .auto(Call { function: "ToolTip", style: Words }),
        LegacyRule::new("inputbox", "InputBox", "result := InputBox(prompt, title); result.Value holds the text"),
        LegacyRule::new("send", "Send", "Send(\"keys\")").auto(text_call("Send")),
        LegacyRule::new("sendinput", "SendInput", "SendInput(\"keys\")").auto(text_call("SendInput")),
        LegacyRule::new("sendevent", "SendEvent", "SendEvent(\"keys\")").auto(text_call("SendEvent")),
        LegacyRule::new("sendplay", "SendPlay", "SendPlay(\"keys\")").auto(text_call("SendPlay")),
        LegacyRule::new("sendraw", "SendRaw", "SendText(\"text\")")
            .modern(&["SendText"])
            .auto(text_call("SendText"))
            .removed(),
        LegacyRule::new("controlsend", "ControlSend", "ControlSend(keys, control, title): keys now come first"),
        LegacyRule::new("sleep", "Sleep", "Sleep(ms)").auto(Call { function: "Sleep", style: Expr }),
        LegacyRule::new("click", "Click", "Click(\"options\")").auto(text_call("Click")),
        LegacyRule::new("keywait", "KeyWait", "KeyWait(\"key\", \"options\")").auto(text_call("KeyWait")),
        LegacyRule::new("mousegetpos", "MouseGetPos", "MouseGetPos(&x, &y, &win, &control)")
            .auto(Custom(mouse_get_pos)),
        LegacyRule::new("getkeystate", "GetKeyState", "state := GetKeyState(key, mode) returns 1 or 0, not D or U"),
        // Processes and windows
        LegacyRule::new("run", "Run", "Run(\"target\")").auto(Custom(run)),
        LegacyRule::new("runwait", "RunWait", "RunWait(\"target\")").auto(Custom(run_wait)),
        LegacyRule::new("process", "Process", "use ProcessExist(), ProcessClose(), ProcessWait()"),
        LegacyRule::new("winactivate", "WinActivate", "WinActivate(\"title\")").auto(text_call("WinActivate")),
        LegacyRule::new("winclose", "WinClose", "WinClose(\"title\")").auto(text_call("WinClose")),
        LegacyRule::new("winkill", "WinKill", "WinKill(\"title\")").auto(text_call("WinKill")),
        LegacyRule::new("winminimize", "WinMinimize", "WinMinimize(\"title\")").auto(text_call("WinMinimize")),
        LegacyRule::new("winmaximize", "WinMaximize", "WinMaximize(\"title\")").auto(text_call("WinMaximize")),
        LegacyRule::new("winrestore", "WinRestore", "WinRestore(\"title\")").auto(text_call("WinRestore")),
        LegacyRule::new("winshow", "WinShow", "WinShow(\"title\")").auto(text_call("WinShow")),
        LegacyRule::new("winhide", "WinHide", "WinHide(\"title\")").auto(text_call("WinHide")),
        LegacyRule::new("winwait", "WinWait", "WinWait(\"title\", , timeout)").auto(text_call("WinWait")),
        LegacyRule::new("winwaitactive", "WinWaitActive", "WinWaitActive(\"title\")").auto(text_call("WinWaitActive")),
        LegacyRule::new("winwaitclose", "WinWaitClose", "WinWaitClose(\"title\")").auto(text_call("WinWaitClose")),
        LegacyRule::new("winmove", "WinMove", "WinMove(x, y, w, h, \"title\")").auto(Custom(win_move)),
        LegacyRule::new("wingetpos", "WinGetPos", "WinGetPos(&x, &y, &w, &h, \"title\")").auto(Custom(win_get_pos)),
        LegacyRule::new("wingettitle", "WinGetTitle", "out := WinGetTitle(\"title\")")
            .auto(Assign { function: "WinGetTitle", style: Text }),
        LegacyRule::new("wingetclass", "WinGetClass", "out := WinGetClass(\"title\")")
            .auto(Assign { function: "WinGetClass", style: Text }),
        LegacyRule::new("settitlematchmode", "SetTitleMatchMode", "SetTitleMatchMode(mode)")
            .auto(text_call("SetTitleMatchMode")),
        LegacyRule::new("coordmode", "CoordMode", "CoordMode(\"target\", \"mode\")").auto(text_call("CoordMode")),
        LegacyRule::new("sendmode", "SendMode", "SendMode(\"mode\")").auto(text_call("SendMode")),
        LegacyRule::new("setworkingdir", "SetWorkingDir", "SetWorkingDir(dir)").auto(text_call("SetWorkingDir")),
        // Flow control
        LegacyRule::new("loop-mode", "Loop", "Loop Parse|Read|Files|Reg without the comma after Loop")
            .template(&RE_LOOP_MODE),
        LegacyRule::new("loop", "Loop", "Loop count").auto(Custom(loop_count)),
        LegacyRule::new("settimer", "SetTimer", "SetTimer(FunctionName, period); labels become functions"),
        LegacyRule::new("gosub", "Gosub", "call a function instead of a label").removed(),
        LegacyRule::new("hotkey", "Hotkey", "Hotkey(keyName, callback, options); labels become functions"),
        // GUI
        LegacyRule::new("gui", "Gui", "MyGui := Gui(), then MyGui.Add(...) and MyGui.Show()"),
        LegacyRule::new("guicontrol", "GuiControl", "use the GuiControl object returned by MyGui.Add()").removed(),
        LegacyRule::new("menu", "Menu", "use A_TrayMenu or Menu() objects"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::document::ScriptDocument;

    fn outcome_for(db: &PatternDatabase, text: &str) -> (Vec<(usize, &'static str)>, Vec<Issue>) {
        let doc = ScriptDocument::new(text);
        let c = classify(&doc, 3);
        let out = db.match_records(&c.records);
        let matches = out.matches.iter().map(|m| (m.line, m.rule.id)).collect();
        (matches, out.issues)
    }

    fn rewrite(db: &PatternDatabase, code: &str) -> Option<String> {
        let cmd = parse_legacy(code)?;
        let (rule, args) = db.lookup(cmd, code)?;
        rule.rewrite.as_ref()?.apply(&args)
    }

    #[test]
    fn rule_ids_are_unique() {
        let rules = builtin_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn modern_forms_never_equal_their_symbol() {
        for rule in builtin_rules() {
            assert!(
                !rule.modern.iter().any(|m| m.eq_ignore_ascii_case(rule.symbol)),
                "{} would suppress itself",
                rule.id
            );
        }
    }

    #[test]
    fn contains_word_respects_boundaries() {
        assert!(contains_word("x := SoundSet(1)", "SoundSet"));
        assert!(contains_word("soundset, 1", "SoundSet"));
        assert!(!contains_word("SoundSetMute(-1)", "SoundSet"));
        assert!(!contains_word("MySoundSet()", "SoundSet"));
    }

    #[test]
    fn toggle_fires_template_rule_once() {
        let db = PatternDatabase::builtin();
        let (matches, issues) = outcome_for(&db, "SoundSet, +1, , Mute");
        assert_eq!(matches, vec![(0, "soundset-mute")]);
        assert!(issues.is_empty());
    }

    #[test]
    fn modern_mute_call_is_not_flagged() {
        let db = PatternDatabase::builtin();
        let (matches, issues) = outcome_for(&db, "SoundSetMute(-1)\nF1::SoundSetMute(-1)");
        assert!(matches.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn removed_name_in_expression_warns() {
        let db = PatternDatabase::builtin();
        let (_, issues) = outcome_for(&db, "vol := SoundGet()");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::StyleWarning);
        assert_eq!(issues[0].rule.as_deref(), Some("soundget"));
    }

    #[test]
    fn removed_name_suppressed_by_modern_sibling() {
        let db = PatternDatabase::builtin();
        let (_, issues) = outcome_for(&db, "x := SoundGet() + SoundGetVolume()");
        assert!(issues.is_empty());
    }

    #[test]
    fn removed_name_inside_string_ignored() {
        let db = PatternDatabase::builtin();
        let (_, issues) = outcome_for(&db, "MsgBox(\"SoundSet is gone\")");
        assert!(issues.is_empty());
    }

    #[test]
    fn manual_rule_becomes_issue() {
        let db = PatternDatabase::builtin();
        let (matches, issues) = outcome_for(&db, "SoundGet, v, Wave, Mute");
        assert!(matches.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::LegacySyntaxError);
        assert_eq!(issues[0].rule.as_deref(), Some("soundget"));
    }

    #[test]
    fn unknown_command_is_style_warning() {
        let db = PatternDatabase::builtin();
        let (_, issues) = outcome_for(&db, "Foo, bar");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::StyleWarning);
        assert_eq!(issues[0].rule.as_deref(), Some("unknown-command"));
    }

    #[test]
    fn legacy_inline_hotkey_body_is_matched() {
        let db = PatternDatabase::builtin();
        let (matches, _) = outcome_for(&db, "F1::MsgBox, hi");
        assert_eq!(matches, vec![(0, "msgbox")]);
    }

    #[test]
    fn hotstring_text_is_not_matched() {
        let db = PatternDatabase::builtin();
        let (matches, issues) = outcome_for(&db, "::sg::SoundGet, is old");
        assert!(matches.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn counts_invocations() {
        let db = PatternDatabase::builtin();
        assert_eq!(db.invocations(), 0);
        outcome_for(&db, "MsgBox, a");
        outcome_for(&db, "MsgBox, b");
        assert_eq!(db.invocations(), 2);
    }

    #[test]
    fn sound_rewrites() {
        let db = PatternDatabase::builtin();
        assert_eq!(rewrite(&db, "SoundSet, +1, , Mute").as_deref(), Some("SoundSetMute(-1)"));
        assert_eq!(rewrite(&db, "SoundSet, 1, Master, Mute").as_deref(), Some("SoundSetMute(1)"));
        assert_eq!(rewrite(&db, "SoundSet, 50").as_deref(), Some("SoundSetVolume(50)"));
        assert_eq!(rewrite(&db, "SoundSet, +10").as_deref(), Some("SoundSetVolume(\"+10\")"));
        assert_eq!(rewrite(&db, "SoundSet, 50, Wave"), None);
        assert_eq!(
            rewrite(&db, "SoundGet, muted, Master, Mute").as_deref(),
            Some("muted := SoundGetMute()")
        );
        assert_eq!(rewrite(&db, "SoundGet, vol").as_deref(), Some("vol := SoundGetVolume()"));
    }

    #[test]
    fn string_rewrites() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, "StringReplace, out, in, foo, bar, All").as_deref(),
            Some("out := StrReplace(in, \"foo\", \"bar\")")
        );
        assert_eq!(
            rewrite(&db, "StringReplace, out, in, foo, bar").as_deref(),
            Some("out := StrReplace(in, \"foo\", \"bar\", , , 1)")
        );
        assert_eq!(rewrite(&db, "StringLen, n, text").as_deref(), Some("n := StrLen(text)"));
        assert_eq!(rewrite(&db, "StringUpper, o, i, T").as_deref(), Some("o := StrTitle(i)"));
        assert_eq!(rewrite(&db, "StringTrimLeft, o, i, 3").as_deref(), Some("o := SubStr(i, 4)"));
        assert_eq!(rewrite(&db, "StringTrimRight, o, i, n").as_deref(), Some("o := SubStr(i, 1, -n)"));
    }

    #[test]
    fn substring_counts_are_kept_intact() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, "StringRight, a, b, % x + 1").as_deref(),
            Some("a := SubStr(b, -(x + 1))")
        );
        assert_eq!(
            rewrite(&db, "StringTrimLeft, o, i, % n * 2").as_deref(),
            Some("o := SubStr(i, (n * 2) + 1)")
        );
        assert_eq!(rewrite(&db, "StringLeft, o, i, %n%").as_deref(), Some("o := SubStr(i, 1, n)"));
        assert_eq!(rewrite(&db, "StringTrimRight, o, i, -3"), None);
        assert_eq!(rewrite(&db, "StringTrimRight, o, i, +3"), None);
        assert_eq!(rewrite(&db, "StringRight, o, i, 0"), None);
        assert_eq!(rewrite(&db, "StringLeft, o, i, 2.5"), None);
    }

    #[test]
    fn huge_trim_count_is_left_for_review() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, "StringTrimLeft, o, i, 9223372036854775807").as_deref(),
            Some("o := SubStr(i, 9223372036854775808)")
        );
        assert_eq!(rewrite(&db, "StringTrimLeft, o, i, 18446744073709551615"), None);
        assert_eq!(rewrite(&db, "StringTrimLeft, o, i, 99999999999999999999999"), None);
    }

    #[test]
    fn conditional_rewrites() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, "IfWinActive, Untitled - Notepad").as_deref(),
            Some("if WinActive(\"Untitled - Notepad\")")
        );
        assert_eq!(
            rewrite(&db, "IfNotExist, C:\\temp").as_deref(),
            Some("if !FileExist(\"C:\\temp\")")
        );
        assert_eq!(rewrite(&db, "IfEqual, x, 5").as_deref(), Some("if (x = 5)"));
        assert_eq!(rewrite(&db, "IfEqual, x, yes").as_deref(), Some("if (x = \"yes\")"));
    }

    #[test]
    fn reordering_rewrites() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, "MsgBox, 4, Confirm, Continue?").as_deref(),
            Some("MsgBox(\"Continue?\", \"Confirm\", 4)")
        );
        assert_eq!(
            rewrite(&db, "MsgBox, 0, T, Hi, 5").as_deref(),
            Some("MsgBox(\"Hi\", \"T\", \"0 T5\")")
        );
        assert_eq!(
            rewrite(&db, "TrayTip, Title, Body").as_deref(),
            Some("TrayTip(\"Body\", \"Title\")")
        );
        assert_eq!(
            rewrite(&db, "WinMove, Notepad, , 0, 0, 800, 600").as_deref(),
            Some("WinMove(0, 0, 800, 600, \"Notepad\")")
        );
        assert_eq!(
            rewrite(&db, "Run, notepad.exe, , , pid").as_deref(),
            Some("Run(\"notepad.exe\", , , &pid)")
        );
    }

    #[test]
    fn generic_call_rewrites() {
        let db = PatternDatabase::builtin();
        assert_eq!(
            rewrite(&db, r#"MsgBox, "Hello, World", 5"#).as_deref(),
            Some(r#"MsgBox("Hello, World", 5)"#)
        );
        assert_eq!(rewrite(&db, "Send, {Escape}").as_deref(), Some("Send(\"{Escape}\")"));
        assert_eq!(rewrite(&db, "Sleep, %delay%").as_deref(), Some("Sleep(delay)"));
        assert_eq!(rewrite(&db, "Loop, 5").as_deref(), Some("Loop 5"));
        assert_eq!(rewrite(&db, "FileRead, data, C:\\a.txt").as_deref(), Some("data := FileRead(\"C:\\a.txt\")"));
        assert_eq!(
            rewrite(&db, "MouseGetPos, mx, my").as_deref(),
            Some("MouseGetPos(&mx, &my)")
        );
    }

    #[test]
    fn loop_mode_template_wins_and_is_manual() {
        let db = PatternDatabase::builtin();
        let (matches, issues) = outcome_for(&db, "Loop, Parse, list, `,");
        assert!(matches.is_empty());
        assert_eq!(issues[0].rule.as_deref(), Some("loop-mode"));
    }
}
