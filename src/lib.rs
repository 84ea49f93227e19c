//! ahk-lint: checks AutoHotkey scripts against the v2 dialect and rewrites
//! high-confidence legacy v1 command syntax.
//!
//! ```
//! use ahk_lint::{Validator, ValidatorConfig};
//!
//! let validator = Validator::new(ValidatorConfig::default());
//! let report = validator.validate("#Requires AutoHotkey v2.0\nMsgBox(\"hi\")");
//! assert!(report.valid);
//! ```

pub mod cache;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod params;
pub mod quote;
pub mod render;
pub mod report;
pub mod rewrite;
pub mod rules;
pub mod scan;
pub mod validator;

pub use cache::{Fingerprint, Freshness, ValidationCache};
pub use config::{Strictness, ValidatorConfig};
pub use error::Error;
pub use render::{create_renderer, Renderer};
pub use report::{AppliedFix, FixCandidate, Issue, IssueKind, Severity, ValidationReport};
pub use rules::{LegacyRule, PatternDatabase};
pub use validator::Validator;
