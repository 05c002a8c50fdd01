// src/generator.rs
//! The generator entry point: receiver, filter, analyzer, builder, output.
//!
//! One call per compilation pass, strictly sequential. The driver harness
//! that wires this to a host compiler callback lives with the host; this
//! crate exposes the pass itself.

use crate::analysis::AnalysisContext;
use crate::config::GenConfig;
use crate::errors::DiagnosticBag;
use crate::generate::{build_declaration, GeneratedUnit};
use crate::pipeline::{CancellationToken, DeclFilter, Logged};
use crate::sema::Compilation;
use crate::syntax::SyntaxReceiver;

/// Everything one pass produced: generated units in declaration order plus
/// every diagnostic. Diagnostics are reported even when no unit could be
/// generated; a cancelled pass returns whatever was finished.
#[derive(Debug, Default)]
pub struct GeneratorOutput {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: DiagnosticBag,
}

#[derive(Debug, Default)]
pub struct DefaultParamGenerator {
    config: GenConfig,
}

impl DefaultParamGenerator {
    pub fn new(config: GenConfig) -> Self {
        Self { config }
    }

    pub fn execute(
        &self,
        compilation: &Compilation,
        cancel: &CancellationToken,
    ) -> GeneratorOutput {
        let _span = tracing::info_span!("defgen_pass").entered();

        let receiver = SyntaxReceiver::collect(&compilation.units, &compilation.interner);
        if receiver.is_empty() {
            tracing::debug!("no candidate declarations");
            return GeneratorOutput::default();
        }

        let ctx = AnalysisContext {
            compilation,
            assembly_config: &self.config,
            cancel,
        };
        let filter = DeclFilter::new(ctx, &receiver);

        let mut diagnostics = DiagnosticBag::new();
        let mut units = Vec::new();
        {
            let _span = tracing::info_span!("validate_and_build").entered();
            let stream = Logged::new(filter.stream(&mut diagnostics));
            for record in stream {
                if cancel.is_cancelled() {
                    break;
                }
                if let Some(unit) = build_declaration(compilation, &record) {
                    units.push(unit);
                }
            }
        }

        tracing::debug!(
            units = units.len(),
            errors = diagnostics.errors.len(),
            warnings = diagnostics.warnings.len(),
            "pass complete"
        );
        GeneratorOutput { units, diagnostics }
    }
}
