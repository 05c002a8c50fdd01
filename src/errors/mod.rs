// src/errors/mod.rs
//! Structured diagnostics for the generator, using miette for rendering.

pub mod gen;
pub mod report;

pub use gen::{GenError, GenWarning};
pub use report::{render_bag, render_to_stderr, render_to_string};

use miette::SourceSpan;

use crate::syntax::Span;

/// A reported error with its original source span.
#[derive(Debug, Clone)]
pub struct AnalysisError {
    pub error: GenError,
    pub span: Span,
}

impl AnalysisError {
    pub fn new(error: GenError, span: Span) -> Self {
        Self { error, span }
    }
}

/// A reported warning with its original source span.
#[derive(Debug, Clone)]
pub struct AnalysisWarning {
    pub warning: GenWarning,
    pub span: Span,
}

impl AnalysisWarning {
    pub fn new(warning: GenWarning, span: Span) -> Self {
        Self { warning, span }
    }
}

/// Convert a syntax span into miette's offset/length form.
pub fn source_span(span: Span) -> SourceSpan {
    (span.start, span.len()).into()
}

/// Where analysis findings go. Implemented once; the counting variant is
/// the boolean call shape used when only validity matters.
pub trait DiagnosticSink {
    fn error(&mut self, error: GenError, span: Span);
    fn warning(&mut self, warning: GenWarning, span: Span);
    fn error_count(&self) -> usize;
}

/// Collects every finding for later rendering.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    pub errors: Vec<AnalysisError>,
    pub warnings: Vec<AnalysisWarning>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn error(&mut self, error: GenError, span: Span) {
        self.errors.push(AnalysisError::new(error, span));
    }

    fn warning(&mut self, warning: GenWarning, span: Span) {
        self.warnings.push(AnalysisWarning::new(warning, span));
    }

    fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Discards messages, keeps the verdict.
#[derive(Debug, Default)]
pub struct CountingSink {
    errors: usize,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for CountingSink {
    fn error(&mut self, _error: GenError, _span: Span) {
        self.errors += 1;
    }

    fn warning(&mut self, _warning: GenWarning, _span: Span) {}

    fn error_count(&self) -> usize {
        self.errors
    }
}
