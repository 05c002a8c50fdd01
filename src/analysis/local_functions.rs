// src/analysis/local_functions.rs
//! Local functions never generate; the marker's presence is the finding.

use crate::analysis::AnalysisContext;
use crate::errors::{source_span, DiagnosticSink, GenError};
use crate::syntax::receiver::LocalFunctionCandidate;

pub fn analyze_local_functions(
    candidates: &[LocalFunctionCandidate],
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) {
    for candidate in candidates {
        if ctx.cancel.is_cancelled() {
            return;
        }
        let span = candidate
            .marker_spans
            .first()
            .copied()
            .unwrap_or(candidate.span);
        sink.error(
            GenError::MarkerOnLocalFunction {
                span: source_span(span),
            },
            span,
        );
    }
}
