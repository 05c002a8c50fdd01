// src/sema/types.rs

use rustc_hash::FxHashMap;

use crate::sema::registry::TypeDefId;
use crate::syntax::ast::Symbol;

/// Fully-resolved semantic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// `void`; only valid as a return type.
    Void,
    /// Instantiation of a declared or well-known type. `args` is empty for
    /// non-generic types.
    Def {
        def: TypeDefId,
        args: Vec<Type>,
    },
    /// Reference to a type parameter in scope, by declared name.
    Param(Symbol),
    Array(Box<Type>),
    Pointer(Box<Type>),
    FnPointer {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// Unbound generic form, e.g. `List<>` inside a `typeof`.
    Unbound(TypeDefId),
    /// Binding failed; poisons downstream checks without cascading reports.
    Error,
}

impl Type {
    pub fn def(def: TypeDefId) -> Self {
        Type::Def {
            def,
            args: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Definition id when this is a (bound or unbound) named type.
    pub fn def_id(&self) -> Option<TypeDefId> {
        match self {
            Type::Def { def, .. } => Some(*def),
            Type::Unbound(def) => Some(*def),
            _ => None,
        }
    }

    /// Whether `name` occurs anywhere in this type.
    pub fn mentions_param(&self, name: Symbol) -> bool {
        match self {
            Type::Param(p) => *p == name,
            Type::Def { args, .. } => args.iter().any(|a| a.mentions_param(name)),
            Type::Array(elem) | Type::Pointer(elem) => elem.mentions_param(name),
            Type::FnPointer { params, ret } => {
                params.iter().any(|p| p.mentions_param(name)) || ret.mentions_param(name)
            }
            _ => false,
        }
    }

    /// Whether any type parameter reference occurs in this type.
    pub fn mentions_any_param(&self) -> bool {
        match self {
            Type::Param(_) => true,
            Type::Def { args, .. } => args.iter().any(Type::mentions_any_param),
            Type::Array(elem) | Type::Pointer(elem) => elem.mentions_any_param(),
            Type::FnPointer { params, ret } => {
                params.iter().any(Type::mentions_any_param) || ret.mentions_any_param()
            }
            _ => false,
        }
    }
}

/// Replace type-parameter references according to `map`, leaving unmapped
/// parameters in place.
pub fn substitute(ty: &Type, map: &FxHashMap<Symbol, Type>) -> Type {
    match ty {
        Type::Param(name) => map.get(name).cloned().unwrap_or_else(|| ty.clone()),
        Type::Def { def, args } => Type::Def {
            def: *def,
            args: args.iter().map(|a| substitute(a, map)).collect(),
        },
        Type::Array(elem) => Type::Array(Box::new(substitute(elem, map))),
        Type::Pointer(elem) => Type::Pointer(Box::new(substitute(elem, map))),
        Type::FnPointer { params, ret } => Type::FnPointer {
            params: params.iter().map(|p| substitute(p, map)).collect(),
            ret: Box::new(substitute(ret, map)),
        },
        other => other.clone(),
    }
}

/// Resolved constraint on a type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConstraint {
    /// `class`
    ReferenceType,
    /// `struct`
    ValueType,
    /// `unmanaged`
    Unmanaged,
    /// `new()`
    Constructor,
    /// Base type or interface constraint.
    Type(Type),
}

impl TypeConstraint {
    /// Whether the constraint names another type parameter anywhere.
    pub fn mentions_any_param(&self) -> bool {
        match self {
            TypeConstraint::Type(ty) => ty.mentions_any_param(),
            _ => false,
        }
    }
}
