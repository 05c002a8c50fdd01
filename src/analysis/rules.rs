// src/analysis/rules.rs
//! Symbol-kind-agnostic validation rules.
//!
//! Each rule reports through a [`DiagnosticSink`] and returns whether it
//! passed; per-parameter checks return a validity mask instead so callers
//! can keep independently valid arities alive.

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::analysis::AnalysisContext;
use crate::errors::{source_span, DiagnosticSink, GenError};
use crate::markers;
use crate::sema::{
    display_type, substitute, MethodSig, Type, TypeConstraint, TypeDefId, TypeDefKind,
    TypeParamContainer, TypeParamData,
};
use crate::syntax::ast::{Accessibility, AttrUse, Symbol};
use crate::syntax::Span;

/// The abstract "symbol + containing context" value the shared rules see.
#[derive(Debug)]
pub struct MemberInfo<'a> {
    pub name: Symbol,
    pub span: Span,
    pub attributes: &'a [AttrUse],
    pub containing: Option<TypeDefId>,
    /// Effective accessibility (member meet containing chain).
    pub access: Accessibility,
    /// Type parameters surfaced through the member's signature. `None`
    /// treats every parameter as exposed (type declarations).
    pub exposed: Option<FxHashSet<Symbol>>,
}

/// Fails when the symbol already carries the generated-code marker.
pub fn check_prohibited_attributes(
    info: &MemberInfo,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let interner = &ctx.compilation.interner;
    if let Some(attr) = info
        .attributes
        .iter()
        .find(|a| markers::is_generated(interner, a))
    {
        sink.error(
            GenError::AlreadyGenerated {
                span: source_span(attr.span),
            },
            attr.span,
        );
        return false;
    }
    true
}

/// Every enclosing type must be partial, and none may default its own
/// parameters. Violations are hard errors; all of them are reported.
pub fn check_containing_types(
    info: &MemberInfo,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let compilation = ctx.compilation;
    let mut ok = true;
    for def in compilation.containing_chain(info.containing) {
        let type_def = compilation.registry.get_type(def);
        if !type_def.is_partial {
            sink.error(
                GenError::ContainingTypeNotPartial {
                    type_name: compilation.registry.full_name(def, &compilation.interner),
                    span: source_span(info.span),
                },
                info.span,
            );
            ok = false;
        }
        if type_def.has_marked_params {
            sink.error(
                GenError::NestedInsideDefaultGenericType {
                    span: source_span(info.span),
                },
                info.span,
            );
            ok = false;
        }
    }
    ok
}

/// Ordering plus default-type legality for every parameter from the first
/// marked index to the end. Returns one validity flag per parameter;
/// leading plain parameters are always valid.
pub fn check_type_params(
    container: &TypeParamContainer,
    info: &MemberInfo,
    ctx: &AnalysisContext,
    sink: &mut dyn DiagnosticSink,
) -> Vec<bool> {
    let compilation = ctx.compilation;
    let mut validity = vec![true; container.len()];
    let Some(first) = container.first_marked_index() else {
        return validity;
    };

    // Defaults of sibling parameters, for resolving constraints that name
    // another defaulted parameter.
    let sibling_defaults = container.substitution(container.len() - first);

    for index in first..container.len() {
        let data = &container.params()[index];

        if !data.has_marker() {
            // Trailing rule broken. Blame the last preceding marked
            // parameter, not the offender.
            let blame = container.params()[..index]
                .iter()
                .rev()
                .find(|p| p.has_marker())
                .map(|p| p.blame_span())
                .unwrap_or(data.span);
            sink.error(
                GenError::DefaultParamNotTrailing {
                    span: source_span(blame),
                },
                blame,
            );
            validity[index] = false;
            continue;
        }

        let default_ty = match &data.default_ty {
            Some(ty) if !ty.is_error() => ty,
            _ => {
                sink.error(
                    GenError::InvalidDefaultType {
                        ty: compilation
                            .interner
                            .resolve(data.name)
                            .to_string(),
                        reason: "the default type could not be resolved",
                        span: source_span(data.blame_span()),
                    },
                    data.blame_span(),
                );
                validity[index] = false;
                continue;
            }
        };

        let display = display_type(default_ty, &compilation.registry, &compilation.interner);

        if let Some(reason) = default_type_reason(ctx, default_ty) {
            sink.error(
                GenError::InvalidDefaultType {
                    ty: display,
                    reason,
                    span: source_span(data.blame_span()),
                },
                data.blame_span(),
            );
            validity[index] = false;
            continue;
        }

        let exposed = info
            .exposed
            .as_ref()
            .is_none_or(|set| set.contains(&data.name));
        if exposed && !compilation.type_accessibility(default_ty).at_least(info.access) {
            sink.error(
                GenError::DefaultTypeLessAccessible {
                    ty: display.clone(),
                    member: compilation.interner.resolve(info.name).to_string(),
                    span: source_span(data.blame_span()),
                },
                data.blame_span(),
            );
            validity[index] = false;
            continue;
        }

        if is_constraint_sensitive(ctx, default_ty)
            && data.constraints.iter().any(TypeConstraint::mentions_any_param)
        {
            sink.error(
                GenError::ConstraintReferencesOtherParam {
                    ty: display,
                    span: source_span(data.blame_span()),
                },
                data.blame_span(),
            );
            validity[index] = false;
            continue;
        }

        if !check_constraints(ctx, default_ty, data, &sibling_defaults, sink) {
            validity[index] = false;
        }
    }
    validity
}

/// Why a type can never be a default, independent of constraints.
fn default_type_reason(ctx: &AnalysisContext, ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Void => Some("'void' is not a valid type argument"),
        Type::Pointer(_) => Some("pointer types cannot be type arguments"),
        Type::FnPointer { .. } => Some("function pointer types cannot be type arguments"),
        Type::Unbound(_) => Some("unbound generic types cannot be type arguments"),
        Type::Def { def, .. } => {
            let type_def = ctx.compilation.registry.get_type(*def);
            if type_def.is_static {
                Some("static types cannot be type arguments")
            } else if type_def.is_ref_like {
                Some("ref struct types cannot be type arguments")
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Sealed, array, value, `object`, `System.Array` and `System.ValueType`
/// defaults cannot stand in for a parameter whose constraints name another
/// type parameter; the substitution would be self-referential.
fn is_constraint_sensitive(ctx: &AnalysisContext, ty: &Type) -> bool {
    let compilation = ctx.compilation;
    match ty {
        Type::Array(_) => true,
        Type::Def { def, .. } => {
            let type_def = compilation.registry.get_type(*def);
            type_def.is_sealed
                || type_def.is_value_type()
                || compilation.well_known.is_object(*def)
                || compilation.well_known.is_system_array(*def)
                || compilation.well_known.is_system_value_type(*def)
        }
        _ => false,
    }
}

fn check_constraints(
    ctx: &AnalysisContext,
    ty: &Type,
    data: &TypeParamData,
    sibling_defaults: &FxHashMap<Symbol, Type>,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let compilation = ctx.compilation;
    let mut ok = true;
    for constraint in &data.constraints {
        let satisfied = match constraint {
            TypeConstraint::ReferenceType => compilation.registry.is_reference_type(ty),
            TypeConstraint::ValueType => compilation.registry.is_value_type(ty),
            TypeConstraint::Unmanaged => compilation.registry.is_unmanaged_type(ty),
            TypeConstraint::Constructor => has_parameterless_ctor(ctx, ty),
            TypeConstraint::Type(target) => {
                let target = substitute(target, sibling_defaults);
                !target.mentions_any_param() && is_assignable(ctx, ty, &target)
            }
        };
        if !satisfied {
            let constraint_text = match constraint {
                TypeConstraint::ReferenceType => "class".to_string(),
                TypeConstraint::ValueType => "struct".to_string(),
                TypeConstraint::Unmanaged => "unmanaged".to_string(),
                TypeConstraint::Constructor => "new()".to_string(),
                TypeConstraint::Type(target) => display_type(
                    &substitute(target, sibling_defaults),
                    &compilation.registry,
                    &compilation.interner,
                ),
            };
            sink.error(
                GenError::ConstraintNotSatisfied {
                    ty: display_type(ty, &compilation.registry, &compilation.interner),
                    constraint: constraint_text,
                    span: source_span(data.blame_span()),
                },
                data.blame_span(),
            );
            ok = false;
        }
    }
    ok
}

fn has_parameterless_ctor(ctx: &AnalysisContext, ty: &Type) -> bool {
    let compilation = ctx.compilation;
    if compilation.registry.is_value_type(ty) {
        return true;
    }
    match ty {
        Type::Def { def, .. } => {
            let type_def = compilation.registry.get_type(*def);
            type_def.kind == TypeDefKind::Class
                && !type_def.is_abstract
                && !type_def.is_static
                && type_def.has_default_ctor
        }
        _ => false,
    }
}

/// Concrete-to-concrete assignability against a base-type or interface
/// constraint target.
pub fn is_assignable(ctx: &AnalysisContext, ty: &Type, target: &Type) -> bool {
    let compilation = ctx.compilation;
    if ty == target {
        return true;
    }
    let Some(def) = target.def_id() else {
        return false;
    };
    if compilation.well_known.is_object(def) {
        return !matches!(
            ty,
            Type::Pointer(_) | Type::FnPointer { .. } | Type::Void | Type::Error
        );
    }
    if compilation.well_known.is_system_value_type(def) {
        return compilation.registry.is_value_type(ty);
    }
    if compilation.well_known.is_system_array(def) {
        return matches!(ty, Type::Array(_));
    }
    match compilation.registry.get_type(def).kind {
        TypeDefKind::Interface => compilation.registry.all_interfaces(ty).contains(target),
        TypeDefKind::Class => compilation.registry.base_chain(ty).contains(target),
        _ => false,
    }
}

/// Type parameters surfaced through a method or invoke signature.
pub fn exposed_params(sig: &MethodSig) -> FxHashSet<Symbol> {
    let mut set = FxHashSet::default();
    collect_params(&sig.ret, &mut set);
    for param in &sig.params {
        collect_params(&param.ty, &mut set);
    }
    set
}

fn collect_params(ty: &Type, set: &mut FxHashSet<Symbol>) {
    match ty {
        Type::Param(name) => {
            set.insert(*name);
        }
        Type::Def { args, .. } => {
            for arg in args {
                collect_params(arg, set);
            }
        }
        Type::Array(elem) | Type::Pointer(elem) => collect_params(elem, set),
        Type::FnPointer { params, ret } => {
            for param in params {
                collect_params(param, set);
            }
            collect_params(ret, set);
        }
        _ => {}
    }
}

/// Longest strip range whose substituted parameters are all valid and
/// default-applying: the arities generation may attempt.
pub fn max_strip(container: &TypeParamContainer, validity: &[bool]) -> usize {
    let mut strip = 0;
    for index in (0..container.len()).rev() {
        let data = &container.params()[index];
        if data.is_default_applying() && validity[index] {
            strip += 1;
        } else {
            break;
        }
    }
    strip
}
