//! The validation pipeline: scan, classify, match, aggregate, and optionally
//! produce a verified auto-fix candidate.

use crate::cache::{Fingerprint, ValidationCache};
use crate::classify::classify;
use crate::config::ValidatorConfig;
use crate::document::ScriptDocument;
use crate::report::{AppliedFix, FixCandidate, Issue, IssueAggregator, IssueKind, ValidationReport};
use crate::rewrite::{self, BraceBlock, FixPlan};
use crate::rules::PatternDatabase;
use crate::scan::scan;
use tracing::{debug, warn};

const DIRECTIVE: &str = "#Requires AutoHotkey v2.0";
const HOTKEY_BODY_RULE: &str = "hotkey-body";

/// Validates scripts against the v2 dialect. Holds the rule table; all
/// per-call state lives on the stack.
#[derive(Debug, Default)]
pub struct Validator {
    config: ValidatorConfig,
    database: PatternDatabase,
}

/// A fix the candidate claims, located in both texts.
#[derive(Debug)]
struct Claim {
    rule: &'static str,
    /// 1-based line in the original.
    original: usize,
    /// 1-based line in the candidate.
    candidate: usize,
}

#[derive(Debug)]
struct Candidate {
    text: String,
    applied: Vec<AppliedFix>,
    claims: Vec<Claim>,
    inserted_lines: usize,
}

struct Analysis {
    report: ValidationReport,
    candidate: Option<Candidate>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_database(config, PatternDatabase::builtin())
    }

    pub fn with_database(config: ValidatorConfig, database: PatternDatabase) -> Self {
        Self { config, database }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn database(&self) -> &PatternDatabase {
        &self.database
    }

    /// How many times the pattern-matching stage has run.
    pub fn match_invocations(&self) -> usize {
        self.database.invocations()
    }

    pub fn validate(&self, text: &str) -> ValidationReport {
        self.analyze(text, false).report
    }

    /// Validate, then build and verify a rewrite candidate. The candidate is
    /// attached to the report only when re-validating it shows no regression.
    pub fn validate_with_fix(&self, text: &str) -> ValidationReport {
        let Analysis { mut report, candidate } = self.analyze(text, true);
        let Some(candidate) = candidate else {
            return report;
        };

        let errors_before = report.error_count();
        let recheck = self.analyze(&candidate.text, false).report;
        let errors_after = recheck.error_count();
        let (defects_before, defects_after) = (defects(&report), defects(&recheck));

        let rejection = if errors_after > errors_before {
            Some(format!(
                "rewritten text has {errors_after} errors, original has {errors_before}"
            ))
        } else if defects_after > defects_before {
            Some(format!(
                "rewritten text has {defects_after} findings, original has {defects_before}"
            ))
        } else {
            candidate
                .claims
                .iter()
                .find(|claim| {
                    recheck.issues.iter().any(|i| {
                        is_defect(i)
                            && i.line == claim.candidate
                            && i.rule.as_deref() == Some(claim.rule)
                    })
                })
                .map(|claim| {
                    format!(
                        "rule `{}` still fires on rewritten line {}",
                        claim.rule, claim.candidate
                    )
                })
        };

        if let Some(reason) = rejection {
            warn!(%reason, "auto-fix candidate rejected");
            report.push_note(format!("auto-fix candidate discarded: {reason}"));
            return report;
        }

        for claim in &candidate.claims {
            report.mark_auto_fixed(claim.original, claim.rule);
        }
        debug!(
            fixes = candidate.applied.len(),
            errors_before, errors_after, "auto-fix candidate accepted"
        );
        report.fix = Some(FixCandidate {
            text: candidate.text,
            applied: candidate.applied,
            inserted_lines: candidate.inserted_lines,
            errors_before,
            errors_after,
        });
        report
    }

    /// Serve from `cache` when the fingerprint is fresh and the stored report
    /// was produced under the same strictness; otherwise validate and store.
    pub fn validate_cached(
        &self,
        cache: &mut ValidationCache,
        fingerprint: &Fingerprint,
        text: &str,
    ) -> ValidationReport {
        if let Some(report) = cache.get(fingerprint) {
            if report.strictness == self.config.strictness {
                debug!(identity = %fingerprint.identity, "validation served from cache");
                return report.clone();
            }
        }
        let report = self.validate(text);
        cache.put(fingerprint.clone(), report.clone());
        report
    }

    fn analyze(&self, text: &str, build_candidate: bool) -> Analysis {
        let doc = ScriptDocument::new(text);
        let mut issues = IssueAggregator::new(self.config.strictness);

        if doc.is_empty() {
            issues.push(Issue::new(IssueKind::InputError, 0, "empty script"));
            return Analysis {
                report: issues.finish(),
                candidate: None,
            };
        }

        let summary = scan(&doc);
        issues.extend(summary.issues(&doc));

        let mut classification = classify(&doc, self.config.hotkey_lookahead);
        issues.extend(std::mem::take(&mut classification.issues));

        let outcome = self.database.match_records(&classification.records);
        issues.extend(outcome.issues);

        let mut plan = rewrite::plan(
            &classification.records,
            &outcome.matches,
            &classification.missing_bodies,
        );
        issues.extend(std::mem::take(&mut plan.issues));

        if !classification.has_directive && text.trim().len() > self.config.directive_min_len {
            issues.push(
                Issue::new(
                    IssueKind::StructuralWarning,
                    0,
                    "missing `#Requires AutoHotkey v2.0` directive",
                )
                .suggestion(DIRECTIVE)
                .rule("requires-directive"),
            );
        }

        let report = issues.finish();
        debug!(
            lines = doc.len(),
            issues = report.issues.len(),
            valid = report.valid,
            "validation finished"
        );

        let candidate = (build_candidate && !plan.is_empty()).then(|| assemble(&doc, &plan));
        Analysis { report, candidate }
    }
}

/// Findings that are errors under standard strictness, whatever severity
/// the configured strictness gave them.
fn is_defect(issue: &Issue) -> bool {
    matches!(
        issue.kind,
        IssueKind::InputError | IssueKind::StructuralError | IssueKind::LegacySyntaxError
    )
}

fn defects(report: &ValidationReport) -> usize {
    report.issues.iter().filter(|i| is_defect(i)).count()
}

/// Candidate index of original line `index` once the braces are in.
fn shifted(index: usize, blocks: &[BraceBlock]) -> usize {
    let opens = blocks.iter().filter(|b| b.header < index).count();
    let closes = blocks.iter().filter(|b| b.close_after < index).count();
    index + opens + closes
}

fn assemble(doc: &ScriptDocument<'_>, plan: &FixPlan) -> Candidate {
    let mut applied = Vec::new();
    let mut claims = Vec::new();

    for fix in &plan.fixes {
        applied.push(AppliedFix {
            line: fix.index + 1,
            rule: fix.rule.to_string(),
            replacement: fix.code.clone(),
        });
        claims.push(Claim {
            rule: fix.rule,
            original: fix.index + 1,
            candidate: shifted(fix.index, &plan.blocks) + 1,
        });
    }
    for block in &plan.blocks {
        applied.push(AppliedFix {
            line: block.header + 1,
            rule: HOTKEY_BODY_RULE.to_string(),
            replacement: format!("lines {}-{} wrapped in {{ }}", block.header + 2, block.close_after + 1),
        });
        claims.push(Claim {
            rule: HOTKEY_BODY_RULE,
            original: block.header + 1,
            candidate: shifted(block.header, &plan.blocks) + 1,
        });
    }
    applied.sort_by_key(|f| f.line);

    Candidate {
        text: rewrite::apply(doc, plan),
        applied,
        claims,
        inserted_lines: plan.inserted_lines(),
    }
}
