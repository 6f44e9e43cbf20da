// ABOUTME: Validation issue types and the ordered report collected by the validator.
// ABOUTME: Errors block startup; warnings are shown but never fatal.

use serde::Serialize;
use std::fmt;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Startup must not proceed.
    Error,
    /// Shown to the user; startup continues.
    Warning,
}

/// Which part of the configuration or host an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subject {
    Runtime,
    Gpu,
    Display,
    Audio,
    ComposeFile,
    XAccess,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subject::Runtime => "runtime",
            Subject::Gpu => "gpu",
            Subject::Display => "display",
            Subject::Audio => "audio",
            Subject::ComposeFile => "compose-file",
            Subject::XAccess => "x-access",
        };
        f.write_str(name)
    }
}

/// One problem found by a validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub subject: Subject,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
}

impl ValidationIssue {
    pub fn error(subject: Subject, message: impl Into<String>) -> Self {
        Self {
            subject,
            severity: Severity::Error,
            message: message.into(),
            fix_hint: None,
        }
    }

    pub fn warning(subject: Subject, message: impl Into<String>) -> Self {
        Self {
            subject,
            severity: Severity::Warning,
            message: message.into(),
            fix_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Issues in check registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Record an issue, logging it via tracing.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => {
                tracing::debug!(subject = %issue.subject, "validation error: {}", issue.message)
            }
            Severity::Warning => {
                tracing::debug!(subject = %issue.subject, "validation warning: {}", issue.message)
            }
        }
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Valid when no issue has error severity.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_blocking)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Extend<ValidationIssue> for ValidationReport {
    fn extend<T: IntoIterator<Item = ValidationIssue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}
