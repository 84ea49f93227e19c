//! Report renderers: trait-based format dispatch.

use crate::error::Error;
use crate::report::ValidationReport;

/// Turns a report into printable output.
pub trait Renderer {
    fn render(&self, report: &ValidationReport) -> Result<String, Error>;
}

/// One line per issue, then the verdict.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, report: &ValidationReport) -> Result<String, Error> {
        let mut out = String::new();
        for issue in &report.issues {
            out.push_str(&issue.format());
            out.push('\n');
        }
        out.push_str(if report.valid {
            "Result: VALID\n"
        } else {
            "Result: INVALID\n"
        });
        Ok(out)
    }
}

/// The serialized report, pretty-printed.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &ValidationReport) -> Result<String, Error> {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        Ok(out)
    }
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>, Error> {
    match format {
        "text" | "txt" => Ok(Box::new(TextRenderer)),
        "json" => Ok(Box::new(JsonRenderer)),
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strictness;
    use crate::report::{Issue, IssueKind};

    fn sample() -> ValidationReport {
        ValidationReport {
            valid: false,
            strictness: Strictness::Standard,
            issues: vec![
                Issue::new(IssueKind::StructuralWarning, 0, "missing directive"),
                Issue::new(IssueKind::LegacySyntaxError, 2, "legacy syntax")
                    .suggestion("Sleep(100)")
                    .rule("sleep"),
            ],
            fix: None,
        }
    }

    #[test]
    fn text_lists_issues_then_verdict() {
        let out = create_renderer("text").unwrap().render(&sample()).unwrap();
        assert_eq!(
            out,
            "WARNING: missing directive\n\
             ERROR: Line 2: legacy syntax | Suggestion: Sleep(100)\n\
             Result: INVALID\n"
        );
    }

    #[test]
    fn json_is_parseable() {
        let out = create_renderer("json").unwrap().render(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["strictness"], "standard");
        assert_eq!(value["issues"][1]["kind"], "legacy_syntax_error");
        assert_eq!(value["issues"][1]["rule"], "sleep");
        assert!(value["issues"][0].get("suggestion").is_none());
        assert!(value.get("fix").is_none());
    }

    #[test]
    fn unknown_format_errors() {
        let err = create_renderer("yaml").err().unwrap();
        assert_eq!(err.to_string(), "unknown format: yaml. Use text or json");
    }
}
