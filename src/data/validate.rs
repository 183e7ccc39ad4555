use std::fmt;

use serde::Serialize;

use crate::data::table::{Granularity, ResourceRow, MAX_FORMAT_OVERS, MAX_RESOURCE, WICKET_COLUMNS};

/// How far the full-resource cell may sit from 100 before it is flagged.
pub const FULL_RESOURCE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Error, context, message);
    }

    pub fn warning(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Warning, context, message);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }

    pub fn first_error(&self) -> Option<&ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .find(|diag| diag.severity == ValidationSeverity::Error)
    }

    /// One-line summary used in error messages.
    pub fn summary(&self) -> String {
        match self.first_error() {
            Some(first) if self.error_count() > 1 => format!(
                "{} errors, first: {}: {}",
                self.error_count(),
                first.context,
                first.message
            ),
            Some(first) => format!("{}: {}", first.context, first.message),
            None => "no errors".to_string(),
        }
    }
}

fn row_context(granularity: Granularity, index: usize) -> String {
    format!("{}_remaining={index}", granularity.as_str())
}

/// Reject a format size of zero or beyond [`MAX_FORMAT_OVERS`] before anything is
/// sized from it. Returns whether the size is usable.
pub fn check_format_overs(report: &mut ValidationReport, format_overs: u32) -> bool {
    if format_overs == 0 {
        report.error("format_overs", "format must have at least one over");
        return false;
    }
    if format_overs > MAX_FORMAT_OVERS {
        report.error(
            "format_overs",
            format!("{format_overs} overs is beyond the {MAX_FORMAT_OVERS}-over limit"),
        );
        return false;
    }
    true
}

/// Check a candidate grid against the resource-table invariants. Collects every
/// problem rather than stopping at the first.
pub fn validate_grid(
    format_overs: u32,
    granularity: Granularity,
    rows: &[ResourceRow],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !check_format_overs(&mut report, format_overs) {
        return report;
    }

    let expected = granularity.row_count(format_overs);
    if rows.len() != expected {
        report.error(
            "rows",
            format!(
                "expected {expected} rows for a {format_overs}-over {} table, found {}",
                granularity.as_str(),
                rows.len()
            ),
        );
        return report;
    }

    for (index, row) in rows.iter().enumerate() {
        for (wickets, value) in row.iter().enumerate() {
            if !value.is_finite() || !(0.0..=MAX_RESOURCE).contains(value) {
                report.error(
                    format!("{}.w{wickets}", row_context(granularity, index)),
                    format!("resource {value} outside 0-100"),
                );
            }
        }
    }
    if report.has_errors() {
        return report;
    }

    if rows[0].iter().any(|value| *value != 0.0) {
        report.error(
            row_context(granularity, 0),
            "resources with nothing remaining must all be 0",
        );
    }

    for wickets in 0..WICKET_COLUMNS {
        for index in 1..rows.len() {
            if rows[index][wickets] < rows[index - 1][wickets] {
                report.error(
                    format!("{}.w{wickets}", row_context(granularity, index)),
                    format!(
                        "resource {} drops below {} with less remaining",
                        rows[index][wickets],
                        rows[index - 1][wickets]
                    ),
                );
            }
        }
    }

    for (index, row) in rows.iter().enumerate() {
        if row[WICKET_COLUMNS - 1] > row[0] {
            report.error(
                row_context(granularity, index),
                format!(
                    "nine wickets down ({}) exceeds no wickets down ({})",
                    row[WICKET_COLUMNS - 1],
                    row[0]
                ),
            );
        } else if row.windows(2).any(|pair| pair[1] > pair[0]) {
            report.warning(
                row_context(granularity, index),
                "resource rises with a wicket lost",
            );
        }
    }

    let full = rows[rows.len() - 1][0];
    if (full - MAX_RESOURCE).abs() > FULL_RESOURCE_TOLERANCE {
        report.warning(
            format!("{}.w0", row_context(granularity, rows.len() - 1)),
            format!("full resource is {full}, expected about 100"),
        );
    }

    report
}
