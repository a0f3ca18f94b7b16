//! Diagnostics reported alongside generated output.
//!
//! Diagnostics never replace output: a call site with an unanalyzable
//! argument is still generated, with the affected override treated as absent.

use core::fmt;

use crate::host::SourceLocation;
use crate::{String, ToString, Vec, format};

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Stable short identifier, e.g. `TR001`.
    pub code: &'static str,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the offending argument or call.
    pub location: SourceLocation,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Error - the affected option is ignored.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// What went wrong, before it is attached to a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A marshalling argument is not a statically analyzable expression.
    InvalidMarshallingArgument {
        argument: String,
        /// `"[]"` when an array element was at fault.
        suffix: &'static str,
    },
    /// A collection argument contains a spread element.
    UnsupportedSpreadElement { argument: String },
    /// A constant calling convention outside the supported set.
    UnsupportedCallingConvention { argument: String, value: i64 },
    /// An open call site for which no concrete instantiation was observed.
    UninstantiatedOpenCallSite { member: String },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::InvalidMarshallingArgument { .. } => "TR001",
            DiagnosticKind::UnsupportedSpreadElement { .. } => "TR002",
            DiagnosticKind::UnsupportedCallingConvention { .. } => "TR003",
            DiagnosticKind::UninstantiatedOpenCallSite { .. } => "TR004",
        }
    }

    pub fn to_diagnostic(&self, location: SourceLocation) -> Diagnostic {
        let (severity, message, help) = match self {
            DiagnosticKind::InvalidMarshallingArgument { argument, suffix } => (
                Severity::Error,
                format!("Invalid marshalling argument '{}{}'", argument, suffix),
                Some(
                    "Use null, a `new MarshalAsAttribute(...)` expression, or a readonly field initialized with one",
                ),
            ),
            DiagnosticKind::UnsupportedSpreadElement { argument } => (
                Severity::Error,
                format!("Spread elements are not supported in '{}'", argument),
                Some("List each element explicitly"),
            ),
            DiagnosticKind::UnsupportedCallingConvention { argument, value } => (
                Severity::Warning,
                format!(
                    "Calling convention value {} passed to '{}' is not supported",
                    value, argument
                ),
                Some("Use Cdecl, StdCall, ThisCall or Winapi"),
            ),
            DiagnosticKind::UninstantiatedOpenCallSite { member } => (
                Severity::Warning,
                format!(
                    "No concrete instantiation of this generic '{}' call was found",
                    member
                ),
                Some("Calls through this site will throw NotImplementedException"),
            ),
        };
        Diagnostic {
            severity,
            code: self.code(),
            message,
            location,
            help: help.map(|h| h.to_string()),
        }
    }
}

/// Append-only diagnostic list threaded through one pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, location: &SourceLocation) {
        tracing::trace!(code = kind.code(), %location, "Diagnostic reported");
        self.items.push(kind.to_diagnostic(location.clone()));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_suffix_in_message() {
        let kind = DiagnosticKind::InvalidMarshallingArgument {
            argument: "marshalParamsAs".to_string(),
            suffix: "[]",
        };
        let diag = kind.to_diagnostic(SourceLocation::new("Program.cs", 3, 14));
        assert_eq!(diag.code, "TR001");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(
            diag.message,
            "Invalid marshalling argument 'marshalParamsAs[]'"
        );
        assert_eq!(
            diag.to_string(),
            "Program.cs:3:14: error[TR001]: Invalid marshalling argument 'marshalParamsAs[]'"
        );
    }

    #[test]
    fn test_severities() {
        let location = SourceLocation::new("a.cs", 1, 1);
        let spread = DiagnosticKind::UnsupportedSpreadElement {
            argument: "marshalParamsAs".to_string(),
        };
        let convention = DiagnosticKind::UnsupportedCallingConvention {
            argument: "callingConvention".to_string(),
            value: 5,
        };
        assert_eq!(spread.to_diagnostic(location.clone()).severity, Severity::Error);
        assert_eq!(convention.to_diagnostic(location).severity, Severity::Warning);
    }
}
