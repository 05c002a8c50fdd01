// src/analysis/delegates.rs
//! Delegate analysis. No override chain and no convention choice; the
//! invoke signature drives exposure, and collisions follow the type rules
//! (delegates are types in the host language).

use crate::analysis::rules::{self, MemberInfo};
use crate::analysis::types::validate_target_namespace;
use crate::analysis::{collision, AnalysisContext};
use crate::config::resolve_config;
use crate::errors::{source_span, DiagnosticSink, GenWarning};
use crate::pipeline::records::ValidatedDelegate;
use crate::syntax::ast::NodeId;

pub fn analyze_delegate(
    node: NodeId,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> Option<ValidatedDelegate> {
    if ctx.cancel.is_cancelled() {
        return None;
    }
    let compilation = ctx.compilation;
    let decl = compilation.delegate_decl(node)?;
    let def = compilation.type_def_of(node)?;
    let container = compilation.container(node)?.clone();
    let containing = compilation.registry.get_type(def).containing;

    let resolved = resolve_config(compilation, &decl.attributes, containing, ctx.assembly_config);
    let config = resolved.config;

    if !container.has_defaults() {
        if let Some(span) = resolved.member_attr_span {
            sink.warning(
                GenWarning::ConfigurationHasNoEffect {
                    span: source_span(span),
                },
                span,
            );
        }
        return None;
    }

    let exposed = compilation
        .registry
        .get_type(def)
        .delegate_sig
        .as_ref()
        .map(rules::exposed_params);

    let info = MemberInfo {
        name: decl.name,
        span: decl.span,
        attributes: &decl.attributes,
        containing,
        access: compilation.member_accessibility(decl.access, containing),
        exposed,
    };

    let mut ok = rules::check_prohibited_attributes(&info, ctx, sink);
    ok &= rules::check_containing_types(&info, ctx, sink);
    if !ok {
        return None;
    }

    let validity = rules::check_type_params(&container, &info, ctx, sink);
    let max_strip = rules::max_strip(&container, &validity);
    if max_strip == 0 {
        return None;
    }

    let outcome = collision::analyze_type_collisions(
        ctx,
        def,
        &container,
        max_strip,
        config.apply_new && containing.is_some(),
        decl.span,
        sink,
    );
    let strips: Vec<usize> = (1..=max_strip)
        .filter(|strip| !outcome.rejected.contains(strip))
        .collect();
    if strips.is_empty() {
        return None;
    }

    let target_namespace = validate_target_namespace(
        &config.target_namespace,
        containing.is_none(),
        decl.span,
        sink,
    );

    Some(ValidatedDelegate {
        node,
        def,
        container,
        strips,
        new_arities: outcome.apply_new,
        target_namespace,
    })
}
