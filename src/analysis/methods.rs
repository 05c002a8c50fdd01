// src/analysis/methods.rs
//! Method analysis: structural checks, override-chain reconciliation, the
//! shared parameter rules, then collision search.

use rustc_hash::FxHashSet;

use crate::analysis::rules::{self, MemberInfo};
use crate::analysis::{collision, AnalysisContext};
use crate::config::resolve_config;
use crate::errors::{source_span, DiagnosticSink, GenError, GenWarning};
use crate::pipeline::records::ValidatedMethod;
use crate::sema::{display_type, Type, TypeParamContainer, TypeParamData};
use crate::syntax::ast::NodeId;

pub fn analyze_method(
    node: NodeId,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> Option<ValidatedMethod> {
    if ctx.cancel.is_cancelled() {
        return None;
    }
    let compilation = ctx.compilation;
    let decl = compilation.method_decl(node)?;
    let method_id = compilation.method_of(node)?;
    let method = compilation.registry.get_method(method_id);
    let mut container = compilation.container(node)?.clone();

    let resolved = resolve_config(
        compilation,
        &decl.attributes,
        Some(method.containing),
        ctx.assembly_config,
    );
    let config = resolved.config;

    // Positions whose override reconciliation failed; their arities are
    // dropped while unaffected trailing parameters stay in play.
    let mut override_invalid: FxHashSet<usize> = FxHashSet::default();

    if decl.is_override {
        if let Some(base_id) = method.overrides {
            let base = compilation.registry.get_method(base_id);
            if base.is_generated {
                sink.error(
                    GenError::OverrideOfGenerated {
                        span: source_span(decl.span),
                    },
                    decl.span,
                );
                return None;
            }
            let base_container = base
                .node
                .and_then(|base_node| compilation.container(base_node))
                .cloned()
                .unwrap_or_else(|| {
                    // External base: no syntax, no markers.
                    TypeParamContainer::new(
                        base.sig
                            .type_params
                            .iter()
                            .map(|p| TypeParamData::plain(p.name, decl.span))
                            .collect(),
                    )
                });
            if base_container.len() == container.len() {
                reconcile(
                    &container,
                    &base_container,
                    ctx,
                    config.allow_override_divergence,
                    config.allow_new_defaults_in_override,
                    &mut override_invalid,
                    sink,
                );
                container = container.combine(&base_container);
            }
        }
    }

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

    // The marker is only legal on a real, fully-bodied method.
    let illegal_modifier = if decl.is_partial {
        Some("partial")
    } else if decl.is_extern {
        Some("extern")
    } else {
        None
    };
    if let Some(modifier) = illegal_modifier {
        sink.error(
            GenError::MarkerOnPartialOrExtern {
                modifier,
                span: source_span(decl.span),
            },
            decl.span,
        );
        return None;
    }

    let info = MemberInfo {
        name: decl.name,
        span: decl.span,
        attributes: &decl.attributes,
        containing: Some(method.containing),
        access: compilation.member_accessibility(decl.access, Some(method.containing)),
        exposed: Some(rules::exposed_params(&method.sig)),
    };

    let mut ok = rules::check_prohibited_attributes(&info, ctx, sink);
    ok &= rules::check_containing_types(&info, ctx, sink);
    if !ok {
        return None;
    }

    let mut validity = rules::check_type_params(&container, &info, ctx, sink);
    for index in &override_invalid {
        validity[*index] = false;
    }

    let max_strip = rules::max_strip(&container, &validity);
    if max_strip == 0 {
        return None;
    }

    let outcome = collision::analyze_method_collisions(
        ctx,
        method_id,
        &container,
        max_strip,
        config.apply_new,
        decl.span,
        sink,
    );
    let strips: Vec<usize> = (1..=max_strip)
        .filter(|strip| !outcome.rejected.contains(strip))
        .collect();
    if strips.is_empty() {
        return None;
    }

    Some(ValidatedMethod {
        node,
        method: method_id,
        container,
        strips,
        new_arities: outcome.apply_new,
        convention: config.method_convention,
    })
}

fn reconcile(
    container: &TypeParamContainer,
    base: &TypeParamContainer,
    ctx: &AnalysisContext,
    allow_divergence: bool,
    allow_new_defaults: bool,
    invalid: &mut FxHashSet<usize>,
    sink: &mut dyn DiagnosticSink,
) {
    let compilation = ctx.compilation;
    for index in 0..container.len() {
        let ours = &container.params()[index];
        let theirs = &base.params()[index];

        if theirs.has_marker() {
            if ours.has_marker() {
                if ours.default_ty == theirs.default_ty || allow_divergence {
                    continue;
                }
                sink.error(
                    GenError::OverrideDefaultMismatch {
                        param: compilation.interner.resolve(ours.name).to_string(),
                        base_ty: default_display(ctx, &theirs.default_ty),
                        found_ty: default_display(ctx, &ours.default_ty),
                        span: source_span(ours.blame_span()),
                    },
                    ours.blame_span(),
                );
                invalid.insert(index);
            } else {
                sink.warning(
                    GenWarning::MarkerMissingOnOverride {
                        param: compilation.interner.resolve(ours.name).to_string(),
                        span: source_span(ours.span),
                    },
                    ours.span,
                );
            }
        } else if ours.has_marker() && !allow_new_defaults {
            sink.error(
                GenError::DefaultAddedInOverride {
                    param: compilation.interner.resolve(ours.name).to_string(),
                    span: source_span(ours.blame_span()),
                },
                ours.blame_span(),
            );
            invalid.insert(index);
        }
    }
}

fn default_display(ctx: &AnalysisContext, ty: &Option<Type>) -> String {
    match ty {
        Some(ty) if !ty.is_error() => display_type(
            ty,
            &ctx.compilation.registry,
            &ctx.compilation.interner,
        ),
        _ => "<unresolved>".to_string(),
    }
}
