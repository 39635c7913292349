//! Diagnostic collection.
//!
//! The pipeline never aborts on ill-formed input; every failure is reported
//! here and compilation continues. The sink keeps errors and warnings in two
//! append-only lists in production order, each entry carrying the token range
//! it applies to. A non-empty error list is what marks a compilation as
//! failed.

use crate::syntax::SyntaxRange;

/// One reported error or warning.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    /// Token range the message applies to.
    pub range: SyntaxRange,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(range: SyntaxRange, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            range,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at tokens {}..{}",
            self.message, self.range.start.0, self.range.end.0
        )
    }
}

/// Collects diagnostics for one compiler invocation.
///
/// No deduplication and no severity hierarchy beyond the error/warning
/// split.
#[derive(Default, Debug)]
pub struct DiagnosticSink {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> DiagnosticSink {
        DiagnosticSink::default()
    }

    pub fn error(&mut self, range: SyntaxRange, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(range, message));
    }

    pub fn warning(&mut self, range: SyntaxRange, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(range, message));
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Moves all collected entries out of the sink.
    pub fn take(&mut self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (
            std::mem::take(&mut self.errors),
            std::mem::take(&mut self.warnings),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTokenId;

    fn range(start: u32, end: u32) -> SyntaxRange {
        SyntaxRange::new(SyntaxTokenId(start), SyntaxTokenId(end))
    }

    #[test]
    fn errors_and_warnings_are_separate() {
        let mut sink = DiagnosticSink::new();
        sink.error(range(0, 1), "expected ';'");
        sink.warning(range(2, 3), "macro redefined");
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.has_errors());
    }

    #[test]
    fn entries_keep_production_order() {
        let mut sink = DiagnosticSink::new();
        sink.error(range(5, 6), "first");
        sink.error(range(1, 2), "second");
        assert_eq!(sink.errors()[0].message, "first");
        assert_eq!(sink.errors()[1].message, "second");
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        let mut sink = DiagnosticSink::new();
        sink.error(range(0, 1), "same");
        sink.error(range(0, 1), "same");
        assert_eq!(sink.errors().len(), 2);
    }

    #[test]
    fn display_mentions_token_range() {
        let diag = Diagnostic::new(range(4, 6), "unexpected token");
        let text = diag.to_string();
        assert!(text.contains("unexpected token"));
        assert!(text.contains("4..6"));
    }
}
