// src/analysis/collision.rs
//! Signature-collision search for candidate arity reductions.
//!
//! For each strip count the engine substitutes the trailing defaults into
//! the member's signature and looks for an existing symbol the generated
//! member would clash with: hand-written overloads in the same type,
//! reductions a marked sibling would generate, and inherited members.
//! Collisions against inherited members can be suppressed with `new` when
//! configuration allows; everything else is a hard error naming the exact
//! generated signature.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::analysis::AnalysisContext;
use crate::errors::{source_span, DiagnosticSink, GenError};
use crate::sema::{
    display_type, substitute, MethodId, ParamSig, Type, TypeDefId, TypeDefKind,
    TypeParamContainer,
};
use crate::syntax::ast::{Accessibility, RefKind, Symbol};
use crate::syntax::Span;

/// How every collision search ends: strips to decorate with `new`, and
/// strips dropped with a diagnostic.
#[derive(Debug, Default)]
pub struct CollisionOutcome {
    pub apply_new: FxHashSet<usize>,
    pub rejected: FxHashSet<usize>,
}

#[derive(Debug, Clone)]
struct ParamShape {
    ty: Type,
    ref_kind: RefKind,
}

fn shapes(params: &[ParamSig]) -> Vec<ParamShape> {
    params
        .iter()
        .map(|p| ParamShape {
            ty: p.ty.clone(),
            ref_kind: p.ref_kind,
        })
        .collect()
}

/// One pre-existing symbol that could collide at some arity.
#[derive(Debug)]
struct CollidingMember {
    containing: Option<TypeDefId>,
    /// Formal parameters; `None` when the target is a type, which collides
    /// by name and arity alone.
    params: Option<Vec<ParamShape>>,
    /// The candidate's own type parameters; `None` marks a non-generic
    /// symbol.
    type_params: Option<SmallVec<[Symbol; 2]>>,
    arity: usize,
    /// Container of a marked sibling that may generate reductions of its
    /// own; collisions must account for those too.
    sibling: Option<TypeParamContainer>,
}

pub fn analyze_method_collisions(
    ctx: &AnalysisContext,
    method: MethodId,
    container: &TypeParamContainer,
    max_strip: usize,
    apply_new_allowed: bool,
    span: Span,
    sink: &mut dyn DiagnosticSink,
) -> CollisionOutcome {
    let compilation = ctx.compilation;
    let registry = &compilation.registry;
    let own = registry.get_method(method);

    let n = container.len();
    let num_defaults = container.num_defaults();
    let plain = n - num_defaults;
    let own_containing = own.containing;
    let own_param_count = own.sig.params.len();

    let mut candidates: Vec<CollidingMember> = Vec::new();

    // Hand-written overloads and marked siblings in the same type.
    for &sibling_id in &registry.get_type(own_containing).methods {
        if sibling_id == method {
            continue;
        }
        let sibling = registry.get_method(sibling_id);
        if sibling.name != own.name || sibling.sig.params.len() != own_param_count {
            continue;
        }
        let arity = sibling.sig.type_params.len();
        let sibling_container = sibling
            .node
            .and_then(|node| compilation.container(node))
            .filter(|c| c.has_defaults())
            .cloned();
        // Direct collisions need an arity inside the generated range;
        // marked siblings can reach into it by reducing themselves.
        if (plain..n).contains(&arity) || sibling_container.is_some() {
            candidates.push(CollidingMember {
                containing: Some(own_containing),
                params: Some(shapes(&sibling.sig.params)),
                type_params: Some(
                    sibling.sig.type_params.iter().map(|p| p.name).collect(),
                ),
                arity,
                sibling: sibling_container,
            });
        }
    }

    // Inherited members: the full interface closure for interfaces, the
    // base chain minus private members for classes and structs.
    let self_ty = self_instantiation(ctx, own_containing);
    let own_kind = registry.get_type(own_containing).kind;
    let sources = if own_kind == TypeDefKind::Interface {
        registry.all_interfaces(&self_ty)
    } else {
        registry.base_chain(&self_ty)
    };
    for source in sources {
        let Type::Def { def, args } = &source else {
            continue;
        };
        let source_def = registry.get_type(*def);
        let mut instantiation = FxHashMap::default();
        for (param, arg) in source_def.type_params.iter().zip(args.iter()) {
            instantiation.insert(param.name, arg.clone());
        }
        for &inherited_id in &source_def.methods {
            let inherited = registry.get_method(inherited_id);
            if inherited.name != own.name
                || inherited.sig.params.len() != own_param_count
                || !(plain..n).contains(&inherited.sig.type_params.len())
            {
                continue;
            }
            if own_kind != TypeDefKind::Interface
                && inherited.access == Accessibility::Private
            {
                continue;
            }
            let params = inherited
                .sig
                .params
                .iter()
                .map(|p| ParamShape {
                    ty: substitute(&p.ty, &instantiation),
                    ref_kind: p.ref_kind,
                })
                .collect();
            candidates.push(CollidingMember {
                containing: Some(*def),
                params: Some(params),
                type_params: Some(
                    inherited.sig.type_params.iter().map(|p| p.name).collect(),
                ),
                arity: inherited.sig.type_params.len(),
                sibling: None,
            });
        }
    }

    let mut outcome = CollisionOutcome::default();

    for strip in 1..=max_strip {
        let target_arity = n - strip;
        let substitution = container.substitution(strip);
        let remaining: SmallVec<[Symbol; 2]> = container.params()[..target_arity]
            .iter()
            .map(|p| p.name)
            .collect();
        let generated: Vec<ParamShape> = own
            .sig
            .params
            .iter()
            .map(|p| ParamShape {
                ty: substitute(&p.ty, &substitution),
                ref_kind: p.ref_kind,
            })
            .collect();

        let hit = candidates.iter().find(|candidate| {
            collides_at(candidate, target_arity, &generated, &remaining)
        });
        if let Some(candidate) = hit {
            if candidate.containing != Some(own_containing) && apply_new_allowed {
                outcome.apply_new.insert(strip);
            } else {
                let signature = method_signature(
                    ctx,
                    compilation.interner.resolve(own.name),
                    &remaining,
                    &generated,
                );
                sink.error(
                    GenError::GeneratedSignatureExists {
                        signature,
                        span: source_span(span),
                    },
                    span,
                );
                outcome.rejected.insert(strip);
                // Everything is known-bad once every defaulted parameter
                // has been diagnosed; further search adds nothing.
                if outcome.rejected.len() == num_defaults {
                    break;
                }
            }
        }
    }
    outcome
}

/// Does `candidate` occupy `target_arity`, either directly or through a
/// reduction of its own?
fn collides_at(
    candidate: &CollidingMember,
    target_arity: usize,
    generated: &[ParamShape],
    remaining: &[Symbol],
) -> bool {
    let Some(candidate_params) = &candidate.params else {
        return candidate.arity == target_arity;
    };
    let candidate_type_params: &[Symbol] = candidate
        .type_params
        .as_ref()
        .map(|p| p.as_slice())
        .unwrap_or(&[]);

    if candidate.arity == target_arity {
        return params_collide(
            generated,
            candidate_params,
            remaining,
            candidate_type_params,
        );
    }

    // A marked sibling occupies every arity it can reduce itself to.
    if let Some(sibling) = &candidate.sibling {
        if candidate.arity > target_arity {
            let sibling_strip = candidate.arity - target_arity;
            let sibling_defaults: usize = sibling.params()[sibling.len() - sibling_strip.min(sibling.len())..]
                .iter()
                .filter(|p| p.is_default_applying())
                .count();
            if sibling_defaults == sibling_strip {
                let substitution = sibling.substitution(sibling_strip);
                let reduced: Vec<ParamShape> = candidate_params
                    .iter()
                    .map(|p| ParamShape {
                        ty: substitute(&p.ty, &substitution),
                        ref_kind: p.ref_kind,
                    })
                    .collect();
                let sibling_remaining: SmallVec<[Symbol; 2]> = sibling.params()
                    [..target_arity]
                    .iter()
                    .map(|p| p.name)
                    .collect();
                return params_collide(generated, &reduced, remaining, &sibling_remaining);
            }
        }
    }
    false
}

fn params_collide(
    a: &[ParamShape],
    b: &[ParamShape],
    a_params: &[Symbol],
    b_params: &[Symbol],
) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(x, y)| {
            x.ref_kind.collides_with(y.ref_kind)
                && types_collide(&x.ty, &y.ty, a_params, b_params)
        })
}

/// Type identity for overload purposes. A position still occupied by a
/// type parameter matches only the structurally-corresponding parameter of
/// the other signature; enclosing-type parameters compare by name.
fn types_collide(a: &Type, b: &Type, a_params: &[Symbol], b_params: &[Symbol]) -> bool {
    match (a, b) {
        (Type::Param(x), Type::Param(y)) => {
            let ax = a_params.iter().position(|p| p == x);
            let by = b_params.iter().position(|p| p == y);
            match (ax, by) {
                (Some(i), Some(j)) => i == j,
                (None, None) => x == y,
                _ => false,
            }
        }
        (Type::Def { def: d1, args: a1 }, Type::Def { def: d2, args: a2 }) => {
            d1 == d2
                && a1.len() == a2.len()
                && a1
                    .iter()
                    .zip(a2.iter())
                    .all(|(x, y)| types_collide(x, y, a_params, b_params))
        }
        (Type::Array(x), Type::Array(y)) | (Type::Pointer(x), Type::Pointer(y)) => {
            types_collide(x, y, a_params, b_params)
        }
        (
            Type::FnPointer {
                params: p1,
                ret: r1,
            },
            Type::FnPointer {
                params: p2,
                ret: r2,
            },
        ) => {
            p1.len() == p2.len()
                && p1
                    .iter()
                    .zip(p2.iter())
                    .all(|(x, y)| types_collide(x, y, a_params, b_params))
                && types_collide(r1, r2, a_params, b_params)
        }
        (Type::Void, Type::Void) => true,
        _ => false,
    }
}

/// Collision search for generated types and delegates: a type collides by
/// name and arity within its declaration scope, or with an inherited
/// nested type.
pub fn analyze_type_collisions(
    ctx: &AnalysisContext,
    def: TypeDefId,
    container: &TypeParamContainer,
    max_strip: usize,
    apply_new_allowed: bool,
    span: Span,
    sink: &mut dyn DiagnosticSink,
) -> CollisionOutcome {
    let compilation = ctx.compilation;
    let registry = &compilation.registry;
    let own = registry.get_type(def);

    let n = container.len();
    let num_defaults = container.num_defaults();
    let plain = n - num_defaults;

    let mut candidates: Vec<CollidingMember> = Vec::new();
    for other_id in registry.type_ids() {
        if other_id == def {
            continue;
        }
        let other = registry.get_type(other_id);
        if other.name != own.name || !(plain..n).contains(&other.arity()) {
            continue;
        }
        let same_scope =
            other.containing == own.containing && other.namespace == own.namespace;
        let inherited = match own.containing {
            Some(containing) => {
                let self_ty = self_instantiation(ctx, containing);
                registry.base_chain(&self_ty).iter().any(|base| {
                    base.def_id() == other.containing
                })
            }
            None => false,
        };
        if same_scope || inherited {
            candidates.push(CollidingMember {
                containing: other.containing,
                params: None,
                type_params: if other.arity() == 0 {
                    None
                } else {
                    Some(other.type_params.iter().map(|p| p.name).collect())
                },
                arity: other.arity(),
                sibling: None,
            });
        }
    }

    let mut outcome = CollisionOutcome::default();
    for strip in 1..=max_strip {
        let target_arity = n - strip;
        let hit = candidates.iter().find(|c| c.arity == target_arity);
        if let Some(candidate) = hit {
            let inherited = candidate.containing != own.containing;
            if inherited && apply_new_allowed {
                outcome.apply_new.insert(strip);
            } else {
                let remaining: SmallVec<[Symbol; 2]> = container.params()[..target_arity]
                    .iter()
                    .map(|p| p.name)
                    .collect();
                let signature = type_signature(
                    ctx,
                    compilation.interner.resolve(own.name),
                    &remaining,
                );
                sink.error(
                    GenError::GeneratedSignatureExists {
                        signature,
                        span: source_span(span),
                    },
                    span,
                );
                outcome.rejected.insert(strip);
                if outcome.rejected.len() == num_defaults {
                    break;
                }
            }
        }
    }
    outcome
}

fn self_instantiation(ctx: &AnalysisContext, def: TypeDefId) -> Type {
    let type_def = ctx.compilation.registry.get_type(def);
    Type::Def {
        def,
        args: type_def
            .type_params
            .iter()
            .map(|p| Type::Param(p.name))
            .collect(),
    }
}

fn method_signature(
    ctx: &AnalysisContext,
    name: &str,
    remaining: &[Symbol],
    params: &[ParamShape],
) -> String {
    let compilation = ctx.compilation;
    let mut out = String::from(name);
    write_type_param_list(&mut out, ctx, remaining);
    out.push('(');
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(keyword) = param.ref_kind.keyword() {
            out.push_str(keyword);
            out.push(' ');
        }
        out.push_str(&display_type(
            &param.ty,
            &compilation.registry,
            &compilation.interner,
        ));
    }
    out.push(')');
    out
}

fn type_signature(ctx: &AnalysisContext, name: &str, remaining: &[Symbol]) -> String {
    let mut out = String::from(name);
    write_type_param_list(&mut out, ctx, remaining);
    out
}

fn write_type_param_list(out: &mut String, ctx: &AnalysisContext, params: &[Symbol]) {
    if params.is_empty() {
        return;
    }
    out.push('<');
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(ctx.compilation.interner.resolve(*param));
    }
    out.push('>');
}
