// src/analysis/types.rs
//! Type analysis: the shared rules plus the inherit-vs-copy convention
//! choice and the type-level collision search.

use crate::analysis::rules::{self, MemberInfo};
use crate::analysis::{collision, AnalysisContext};
use crate::config::{is_valid_target_namespace, resolve_config, TypeConvention};
use crate::errors::{source_span, DiagnosticSink, GenWarning};
use crate::pipeline::records::ValidatedType;
use crate::syntax::ast::{NodeId, TypeKind};

pub fn analyze_type(
    node: NodeId,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> Option<ValidatedType> {
    if ctx.cancel.is_cancelled() {
        return None;
    }
    let compilation = ctx.compilation;
    let decl = compilation.type_decl(node)?;
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

    let info = MemberInfo {
        name: decl.name,
        span: decl.span,
        attributes: &decl.attributes,
        containing,
        access: compilation.member_accessibility(decl.access, containing),
        // Defaults surface through the generated type's base list or its
        // copied members; every parameter counts as exposed.
        exposed: None,
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

    // Inheriting from a sealed or value type is impossible; fall back to
    // copying members and say so.
    let mut convention = config.type_convention;
    if convention == TypeConvention::Inherit
        && (decl.is_sealed || decl.is_static || decl.kind != TypeKind::Class)
    {
        sink.warning(
            GenWarning::InheritConventionImpossible {
                type_name: compilation
                    .interner
                    .resolve(decl.name)
                    .to_string(),
                span: source_span(decl.span),
            },
            decl.span,
        );
        convention = TypeConvention::Copy;
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

    Some(ValidatedType {
        node,
        def,
        container,
        strips,
        new_arities: outcome.apply_new,
        convention,
        target_namespace,
    })
}

/// The namespace override only applies to top-level declarations; a
/// reserved or malformed value falls back with a warning.
pub(crate) fn validate_target_namespace(
    target: &Option<String>,
    top_level: bool,
    span: crate::syntax::Span,
    sink: &mut dyn DiagnosticSink,
) -> Option<String> {
    let target = target.as_ref()?;
    if !top_level {
        return None;
    }
    if is_valid_target_namespace(target) {
        return Some(target.clone());
    }
    sink.warning(
        GenWarning::TargetNamespaceInvalid {
            namespace: target.clone(),
            span: source_span(span),
        },
        span,
    );
    None
}
