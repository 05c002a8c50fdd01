// src/sema/registry.rs
//! First-class identity for declared and well-known symbols.
//!
//! Every type declaration (including delegates, which are types in the host
//! language) gets a `TypeDefId`; every method gets a `MethodId`. The
//! registry owns the definitions and answers the inheritance and member
//! queries the analyzers need.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::sema::types::{substitute, Type, TypeConstraint};
use crate::syntax::ast::{Accessibility, NodeId, RefKind, Symbol};
use crate::syntax::Interner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    Class,
    Struct,
    Interface,
    Delegate,
}

/// Declared type parameter with its resolved constraints.
#[derive(Debug, Clone)]
pub struct TypeParamDef {
    pub name: Symbol,
    pub constraints: Vec<TypeConstraint>,
}

#[derive(Debug, Clone)]
pub struct ParamSig {
    pub name: Symbol,
    pub ty: Type,
    pub ref_kind: RefKind,
}

#[derive(Debug, Clone)]
pub struct MethodSig {
    pub type_params: Vec<TypeParamDef>,
    pub params: Vec<ParamSig>,
    pub ret: Type,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: Symbol,
    pub namespace: Option<Symbol>,
    pub containing: Option<TypeDefId>,
    pub kind: TypeDefKind,
    pub access: Accessibility,
    pub is_sealed: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_partial: bool,
    pub is_ref_like: bool,
    /// Host-supplied fact; primitives set it, user structs opt in.
    pub is_unmanaged: bool,
    pub has_default_ctor: bool,
    /// Any of this type's own parameters carries the default marker.
    pub has_marked_params: bool,
    pub type_params: Vec<TypeParamDef>,
    pub base: Option<Type>,
    pub interfaces: Vec<Type>,
    pub methods: Vec<MethodId>,
    pub nested: Vec<TypeDefId>,
    /// Invoke signature for `Delegate` kind.
    pub delegate_sig: Option<MethodSig>,
    /// Declaring syntax, absent for well-known/external types.
    pub node: Option<NodeId>,
    /// Language keyword form, e.g. `int` for `System.Int32`.
    pub keyword: Option<&'static str>,
}

impl TypeDef {
    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeDefKind::Struct)
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: Symbol,
    pub containing: TypeDefId,
    pub access: Accessibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub is_extern: bool,
    pub is_partial: bool,
    /// Carries the generated-code marker attribute.
    pub is_generated: bool,
    pub sig: MethodSig,
    pub node: Option<NodeId>,
    pub overrides: Option<MethodId>,
}

#[derive(Debug, Default)]
pub struct Registry {
    types: Vec<TypeDef>,
    methods: Vec<MethodDef>,
    by_full_name: FxHashMap<String, TypeDefId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, def: TypeDef, interner: &Interner) -> TypeDefId {
        let id = TypeDefId(self.types.len() as u32);
        let full = self.full_name_of(&def, interner);
        if let Some(containing) = def.containing {
            self.types[containing.0 as usize].nested.push(id);
        }
        self.types.push(def);
        self.by_full_name.insert(full, id);
        id
    }

    pub fn add_method(&mut self, def: MethodDef) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.types[def.containing.0 as usize].methods.push(id);
        self.methods.push(def);
        id
    }

    pub fn get_type(&self, id: TypeDefId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn get_type_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.types[id.0 as usize]
    }

    pub fn get_method(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.0 as usize]
    }

    pub fn get_method_mut(&mut self, id: MethodId) -> &mut MethodDef {
        &mut self.methods[id.0 as usize]
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeDefId> + '_ {
        (0..self.types.len()).map(|i| TypeDefId(i as u32))
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.methods.len()).map(|i| MethodId(i as u32))
    }

    pub fn type_by_full_name(&self, full: &str) -> Option<TypeDefId> {
        self.by_full_name.get(full).copied()
    }

    /// Dotted name including namespace and containing types.
    pub fn full_name(&self, id: TypeDefId, interner: &Interner) -> String {
        self.full_name_of(self.get_type(id), interner)
    }

    fn full_name_of(&self, def: &TypeDef, interner: &Interner) -> String {
        let mut segments: SmallVec<[&str; 4]> = SmallVec::new();
        segments.push(interner.resolve(def.name));
        let mut containing = def.containing;
        while let Some(id) = containing {
            let outer = self.get_type(id);
            segments.push(interner.resolve(outer.name));
            containing = outer.containing;
        }
        if let Some(ns) = def.namespace {
            segments.push(interner.resolve(ns));
        }
        segments.reverse();
        segments.join(".")
    }

    /// Instantiated base type of `ty`, if any.
    pub fn base_of(&self, ty: &Type) -> Option<Type> {
        let Type::Def { def, args } = ty else {
            return None;
        };
        let type_def = self.get_type(*def);
        let base = type_def.base.as_ref()?;
        Some(self.instantiate(base, &type_def.type_params, args))
    }

    /// Base chain of `ty`, nearest first, instantiated along the way.
    pub fn base_chain(&self, ty: &Type) -> Vec<Type> {
        let mut chain = Vec::new();
        let mut current = self.base_of(ty);
        while let Some(base) = current {
            current = self.base_of(&base);
            chain.push(base);
        }
        chain
    }

    /// Every interface reachable from `ty`: declared, inherited from bases,
    /// and the transitive closure over interface extends-lists.
    pub fn all_interfaces(&self, ty: &Type) -> Vec<Type> {
        let mut out: Vec<Type> = Vec::new();
        let mut work: Vec<Type> = vec![ty.clone()];
        work.extend(self.base_chain(ty));

        while let Some(current) = work.pop() {
            let Type::Def { def, args } = &current else {
                continue;
            };
            let type_def = self.get_type(*def);
            for iface in &type_def.interfaces {
                let inst = self.instantiate(iface, &type_def.type_params, args);
                if !out.contains(&inst) {
                    work.push(inst.clone());
                    out.push(inst);
                }
            }
        }
        out
    }

    fn instantiate(&self, template: &Type, params: &[TypeParamDef], args: &[Type]) -> Type {
        if params.is_empty() || args.is_empty() {
            return template.clone();
        }
        let mut map = FxHashMap::default();
        for (param, arg) in params.iter().zip(args.iter()) {
            map.insert(param.name, arg.clone());
        }
        substitute(template, &map)
    }

    // ----- classification -----

    pub fn is_value_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Def { def, .. } => self.get_type(*def).is_value_type(),
            _ => false,
        }
    }

    pub fn is_reference_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Def { def, .. } => matches!(
                self.get_type(*def).kind,
                TypeDefKind::Class | TypeDefKind::Interface | TypeDefKind::Delegate
            ),
            Type::Array(_) => true,
            _ => false,
        }
    }

    pub fn is_unmanaged_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Def { def, .. } => self.get_type(*def).is_unmanaged,
            Type::Pointer(_) => true,
            _ => false,
        }
    }

    pub fn is_sealed_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Def { def, .. } => {
                let d = self.get_type(*def);
                d.is_sealed || d.is_value_type()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Interner;

    fn plain_type(name: Symbol, namespace: Option<Symbol>) -> TypeDef {
        TypeDef {
            name,
            namespace,
            containing: None,
            kind: TypeDefKind::Class,
            access: Accessibility::Public,
            is_sealed: false,
            is_static: false,
            is_abstract: false,
            is_partial: false,
            is_ref_like: false,
            is_unmanaged: false,
            has_default_ctor: true,
            has_marked_params: false,
            type_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            delegate_sig: None,
            node: None,
            keyword: None,
        }
    }

    #[test]
    fn full_name_includes_namespace_and_containers() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();

        let ns = interner.intern("App.Core");
        let outer_name = interner.intern("Outer");
        let inner_name = interner.intern("Inner");

        let outer = registry.add_type(plain_type(outer_name, Some(ns)), &interner);
        let mut inner = plain_type(inner_name, Some(ns));
        inner.containing = Some(outer);
        let inner = registry.add_type(inner, &interner);

        assert_eq!(registry.full_name(inner, &interner), "App.Core.Outer.Inner");
        assert_eq!(
            registry.type_by_full_name("App.Core.Outer.Inner"),
            Some(inner)
        );
    }

    #[test]
    fn base_chain_instantiates_generic_bases() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();

        let t = interner.intern("T");
        let base_name = interner.intern("Base");
        let derived_name = interner.intern("Derived");

        let mut base = plain_type(base_name, None);
        base.type_params = vec![TypeParamDef {
            name: t,
            constraints: Vec::new(),
        }];
        let base_id = registry.add_type(base, &interner);

        // Derived<U> : Base<U>
        let mut derived = plain_type(derived_name, None);
        let u = interner.intern("U");
        derived.type_params = vec![TypeParamDef {
            name: u,
            constraints: Vec::new(),
        }];
        derived.base = Some(Type::Def {
            def: base_id,
            args: vec![Type::Param(u)],
        });
        let derived_id = registry.add_type(derived, &interner);

        let int_name = interner.intern("Int32");
        let int_id = registry.add_type(plain_type(int_name, None), &interner);

        let closed = Type::Def {
            def: derived_id,
            args: vec![Type::def(int_id)],
        };
        let chain = registry.base_chain(&closed);
        assert_eq!(chain.len(), 1);
        assert_eq!(
            chain[0],
            Type::Def {
                def: base_id,
                args: vec![Type::def(int_id)],
            }
        );
    }
}
