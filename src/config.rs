//! Validator configuration: strictness level and pipeline tunables.

use crate::error::Error;
use crate::report::{IssueKind, Severity};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Controls which issue kinds are promoted to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Structure only: legacy syntax is a warning, style findings are notes.
    Permissive,
    #[default]
    Standard,
    /// Style findings (removed names in expressions, unknown comma commands)
    /// fail validation too.
    Strict,
}

impl Strictness {
    pub fn severity_for(self, kind: IssueKind) -> Severity {
        use IssueKind::*;
        use Strictness::*;
        match (kind, self) {
            (InputError | StructuralError, _) => Severity::Error,
            (LegacySyntaxError, Permissive) => Severity::Warning,
            (LegacySyntaxError, _) => Severity::Error,
            (StyleWarning, Permissive) => Severity::Info,
            (StyleWarning, Standard) => Severity::Warning,
            (StyleWarning, Strict) => Severity::Error,
            (StructuralWarning, Permissive) => Severity::Info,
            (StructuralWarning, _) => Severity::Warning,
            (Note, _) => Severity::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strictness::Permissive => "permissive",
            Strictness::Standard => "standard",
            Strictness::Strict => "strict",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strictness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Strictness::Permissive),
            "standard" => Ok(Strictness::Standard),
            "strict" => Ok(Strictness::Strict),
            _ => Err(Error::UnknownStrictness(s.to_string())),
        }
    }
}

/// Pipeline configuration for [`crate::Validator`].
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub strictness: Strictness,
    /// How many lines after a bare hotkey header may hold its body start.
    pub hotkey_lookahead: usize,
    /// Trimmed length above which a missing version directive is reported.
    pub directive_min_len: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Standard,
            hotkey_lookahead: 3,
            directive_min_len: 10,
        }
    }
}

impl ValidatorConfig {
    pub fn with_strictness(strictness: Strictness) -> Self {
        Self {
            strictness,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("STRICT".parse::<Strictness>().unwrap(), Strictness::Strict);
        assert_eq!("permissive".parse::<Strictness>().unwrap(), Strictness::Permissive);
        assert!("lenient".parse::<Strictness>().is_err());
    }

    #[test]
    fn structural_errors_never_demoted() {
        for s in [Strictness::Permissive, Strictness::Standard, Strictness::Strict] {
            assert_eq!(s.severity_for(IssueKind::StructuralError), Severity::Error);
            assert_eq!(s.severity_for(IssueKind::InputError), Severity::Error);
        }
    }

    #[test]
    fn strictness_promotes_style() {
        assert_eq!(
            Strictness::Permissive.severity_for(IssueKind::StyleWarning),
            Severity::Info
        );
        assert_eq!(
            Strictness::Standard.severity_for(IssueKind::StyleWarning),
            Severity::Warning
        );
        assert_eq!(
            Strictness::Strict.severity_for(IssueKind::StyleWarning),
            Severity::Error
        );
        assert_eq!(
            Strictness::Permissive.severity_for(IssueKind::LegacySyntaxError),
            Severity::Warning
        );
    }

    #[test]
    fn default_config() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.strictness, Strictness::Standard);
        assert_eq!(cfg.hotkey_lookahead, 3);
    }
}
