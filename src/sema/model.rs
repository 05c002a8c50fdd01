// src/sema/model.rs
//! The compilation context: syntax trees plus the semantic model derived
//! from them.
//!
//! Built once per generator pass and passed by reference through the whole
//! pipeline; nothing in here is global or cached across passes. Binding is
//! deliberately plain: declare every type, then bind signatures, then bind
//! override targets, then build the type-parameter containers analysis
//! consumes.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::markers;
use crate::sema::generic::{TypeParamContainer, TypeParamData};
use crate::sema::registry::{
    MethodDef, MethodId, MethodSig, ParamSig, Registry, TypeDef, TypeDefId, TypeDefKind,
    TypeParamDef,
};
use crate::sema::types::{substitute, Type, TypeConstraint};
use crate::sema::well_known::WellKnown;
use crate::syntax::ast::*;
use crate::syntax::Interner;

/// Where a declaration lives: unit index plus the member-index path from
/// the unit's items down to the node.
#[derive(Debug, Clone)]
pub struct DeclSite {
    pub unit: usize,
    pub path: SmallVec<[u16; 4]>,
}

#[derive(Debug)]
pub struct Compilation {
    pub units: Vec<CompilationUnit>,
    pub interner: Interner,
    pub registry: Registry,
    pub well_known: WellKnown,
    sites: FxHashMap<NodeId, DeclSite>,
    types_by_node: FxHashMap<NodeId, TypeDefId>,
    methods_by_node: FxHashMap<NodeId, MethodId>,
    containers: FxHashMap<NodeId, TypeParamContainer>,
}

/// Names and ids visible at a binding position.
#[derive(Debug, Clone, Default)]
struct BindScope {
    namespace: Option<Symbol>,
    /// Containing type chain, innermost last.
    containing: SmallVec<[TypeDefId; 4]>,
    /// Type parameters in scope, outer frames first.
    params: SmallVec<[Symbol; 8]>,
}

impl Compilation {
    pub fn build(units: Vec<CompilationUnit>, mut interner: Interner) -> Self {
        let mut registry = Registry::new();
        let well_known = WellKnown::register(&mut registry, &mut interner);
        // Generation stamps this attribute onto output; make sure its
        // symbol exists even when no user code mentions it.
        interner.intern(crate::markers::GENERATED_ATTRIBUTE);

        let mut compilation = Self {
            units,
            interner,
            registry,
            well_known,
            sites: FxHashMap::default(),
            types_by_node: FxHashMap::default(),
            methods_by_node: FxHashMap::default(),
            containers: FxHashMap::default(),
        };

        compilation.declare_all();
        compilation.bind_all();
        compilation.bind_overrides();
        compilation.build_containers();
        compilation
    }

    // ----- pass 1: declare shells -----

    fn declare_all(&mut self) {
        let units = std::mem::take(&mut self.units);
        for (unit_idx, unit) in units.iter().enumerate() {
            for (item_idx, item) in unit.items.iter().enumerate() {
                let mut path = SmallVec::new();
                path.push(item_idx as u16);
                self.declare_member(item, unit_idx, path, None, unit.namespace);
            }
        }
        self.units = units;
    }

    fn declare_member(
        &mut self,
        member: &MemberDecl,
        unit: usize,
        path: SmallVec<[u16; 4]>,
        containing: Option<TypeDefId>,
        namespace: Option<Symbol>,
    ) {
        match member {
            MemberDecl::Type(decl) => {
                let def = TypeDef {
                    name: decl.name,
                    namespace,
                    containing,
                    kind: match decl.kind {
                        TypeKind::Class => TypeDefKind::Class,
                        TypeKind::Struct => TypeDefKind::Struct,
                        TypeKind::Interface => TypeDefKind::Interface,
                    },
                    access: decl.access,
                    is_sealed: decl.is_sealed,
                    is_static: decl.is_static,
                    is_abstract: decl.is_abstract,
                    is_partial: decl.is_partial,
                    is_ref_like: decl.is_ref_like,
                    is_unmanaged: false,
                    has_default_ctor: !decl.is_abstract && !decl.is_static,
                    has_marked_params: decl
                        .type_params
                        .iter()
                        .any(|p| self.find_marker(&p.attributes).is_some()),
                    type_params: decl
                        .type_params
                        .iter()
                        .map(|p| TypeParamDef {
                            name: p.name,
                            constraints: Vec::new(),
                        })
                        .collect(),
                    base: None,
                    interfaces: Vec::new(),
                    methods: Vec::new(),
                    nested: Vec::new(),
                    delegate_sig: None,
                    node: Some(decl.id),
                    keyword: None,
                };
                let id = self.registry.add_type(def, &self.interner);
                self.types_by_node.insert(decl.id, id);
                self.sites.insert(decl.id, DeclSite { unit, path: path.clone() });

                for (idx, nested) in decl.members.iter().enumerate() {
                    let mut nested_path = path.clone();
                    nested_path.push(idx as u16);
                    self.declare_member(nested, unit, nested_path, Some(id), namespace);
                }
            }
            MemberDecl::Method(decl) => {
                let Some(containing) = containing else {
                    return;
                };
                let def = MethodDef {
                    name: decl.name,
                    containing,
                    access: decl.access,
                    is_static: decl.is_static,
                    is_virtual: decl.is_virtual,
                    is_abstract: decl.is_abstract,
                    is_override: decl.is_override,
                    is_sealed: decl.is_sealed,
                    is_extern: decl.is_extern,
                    is_partial: decl.is_partial,
                    is_generated: decl
                        .attributes
                        .iter()
                        .any(|a| markers::is_generated(&self.interner, a)),
                    sig: MethodSig {
                        type_params: decl
                            .type_params
                            .iter()
                            .map(|p| TypeParamDef {
                                name: p.name,
                                constraints: Vec::new(),
                            })
                            .collect(),
                        params: Vec::new(),
                        ret: Type::Void,
                    },
                    node: Some(decl.id),
                    overrides: None,
                };
                let id = self.registry.add_method(def);
                self.methods_by_node.insert(decl.id, id);
                self.sites.insert(decl.id, DeclSite { unit, path });
            }
            MemberDecl::Delegate(decl) => {
                let def = TypeDef {
                    name: decl.name,
                    namespace,
                    containing,
                    kind: TypeDefKind::Delegate,
                    access: decl.access,
                    is_sealed: true,
                    is_static: false,
                    is_abstract: false,
                    is_partial: false,
                    is_ref_like: false,
                    is_unmanaged: false,
                    has_default_ctor: false,
                    has_marked_params: decl
                        .type_params
                        .iter()
                        .any(|p| self.find_marker(&p.attributes).is_some()),
                    type_params: decl
                        .type_params
                        .iter()
                        .map(|p| TypeParamDef {
                            name: p.name,
                            constraints: Vec::new(),
                        })
                        .collect(),
                    base: None,
                    interfaces: Vec::new(),
                    methods: Vec::new(),
                    nested: Vec::new(),
                    delegate_sig: None,
                    node: Some(decl.id),
                    keyword: None,
                };
                let id = self.registry.add_type(def, &self.interner);
                self.types_by_node.insert(decl.id, id);
                self.sites.insert(decl.id, DeclSite { unit, path });
            }
        }
    }

    // ----- pass 2: bind signatures -----

    fn bind_all(&mut self) {
        let units = std::mem::take(&mut self.units);
        for unit in &units {
            let scope = BindScope {
                namespace: unit.namespace,
                ..BindScope::default()
            };
            for item in &unit.items {
                self.bind_member(item, &scope);
            }
        }
        self.units = units;
    }

    fn bind_member(&mut self, member: &MemberDecl, scope: &BindScope) {
        match member {
            MemberDecl::Type(decl) => {
                let id = self.types_by_node[&decl.id];
                let mut inner = scope.clone();
                inner.containing.push(id);
                inner.params.extend(decl.type_params.iter().map(|p| p.name));

                let bases: Vec<Type> = decl
                    .bases
                    .iter()
                    .map(|b| self.resolve_type_ref(b, &inner))
                    .collect();
                let type_params = self.bind_type_params(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );

                let def = self.registry.get_type_mut(id);
                def.type_params = type_params;
                let mut base = None;
                let mut interfaces = Vec::new();
                for bound in bases {
                    let is_interface = bound
                        .def_id()
                        .is_some_and(|d| self.registry.get_type(d).kind == TypeDefKind::Interface);
                    if is_interface {
                        interfaces.push(bound);
                    } else if base.is_none() {
                        base = Some(bound);
                    }
                }
                let def = self.registry.get_type_mut(id);
                def.base = base;
                def.interfaces = interfaces;

                for nested in &decl.members {
                    self.bind_member(nested, &inner);
                }
            }
            MemberDecl::Method(decl) => {
                let Some(&id) = self.methods_by_node.get(&decl.id) else {
                    return;
                };
                let mut inner = scope.clone();
                inner.params.extend(decl.type_params.iter().map(|p| p.name));

                let type_params = self.bind_type_params(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );
                let params = decl
                    .params
                    .iter()
                    .map(|p| ParamSig {
                        name: p.name,
                        ty: self.resolve_type_ref(&p.ty, &inner),
                        ref_kind: p.ref_kind,
                    })
                    .collect();
                let ret = self.resolve_type_ref(&decl.return_type, &inner);

                let def = self.registry.get_method_mut(id);
                def.sig = MethodSig {
                    type_params,
                    params,
                    ret,
                };
            }
            MemberDecl::Delegate(decl) => {
                let id = self.types_by_node[&decl.id];
                let mut inner = scope.clone();
                inner.params.extend(decl.type_params.iter().map(|p| p.name));

                let type_params = self.bind_type_params(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );
                let params = decl
                    .params
                    .iter()
                    .map(|p| ParamSig {
                        name: p.name,
                        ty: self.resolve_type_ref(&p.ty, &inner),
                        ref_kind: p.ref_kind,
                    })
                    .collect();
                let ret = self.resolve_type_ref(&decl.return_type, &inner);

                let def = self.registry.get_type_mut(id);
                def.type_params = type_params.clone();
                def.delegate_sig = Some(MethodSig {
                    type_params,
                    params,
                    ret,
                });
            }
        }
    }

    fn bind_type_params(
        &self,
        params: &[TypeParam],
        clauses: &[ConstraintClause],
        scope: &BindScope,
    ) -> Vec<TypeParamDef> {
        params
            .iter()
            .map(|param| {
                let constraints = clauses
                    .iter()
                    .filter(|c| c.param == param.name)
                    .flat_map(|c| c.constraints.iter())
                    .map(|c| self.resolve_constraint(c, scope))
                    .collect();
                TypeParamDef {
                    name: param.name,
                    constraints,
                }
            })
            .collect()
    }

    fn resolve_constraint(&self, constraint: &Constraint, scope: &BindScope) -> TypeConstraint {
        match constraint {
            Constraint::ReferenceType => TypeConstraint::ReferenceType,
            Constraint::ValueType => TypeConstraint::ValueType,
            Constraint::Unmanaged => TypeConstraint::Unmanaged,
            Constraint::Constructor => TypeConstraint::Constructor,
            Constraint::Type(ty) => TypeConstraint::Type(self.resolve_type_ref(ty, scope)),
        }
    }

    // ----- pass 3: override targets -----

    fn bind_overrides(&mut self) {
        let ids: Vec<MethodId> = self.registry.method_ids().collect();
        for id in ids {
            if !self.registry.get_method(id).is_override {
                continue;
            }
            let target = self.find_override_target(id);
            self.registry.get_method_mut(id).overrides = target;
        }
    }

    fn self_instantiation(&self, def: TypeDefId) -> Type {
        let type_def = self.registry.get_type(def);
        Type::Def {
            def,
            args: type_def
                .type_params
                .iter()
                .map(|p| Type::Param(p.name))
                .collect(),
        }
    }

    fn find_override_target(&self, id: MethodId) -> Option<MethodId> {
        let method = self.registry.get_method(id);
        let self_ty = self.self_instantiation(method.containing);

        for base_ty in self.registry.base_chain(&self_ty) {
            let Type::Def { def, args } = &base_ty else {
                continue;
            };
            let base_def = self.registry.get_type(*def);
            let mut inst_map = FxHashMap::default();
            for (param, arg) in base_def.type_params.iter().zip(args.iter()) {
                inst_map.insert(param.name, arg.clone());
            }

            for &candidate_id in &base_def.methods {
                let candidate = self.registry.get_method(candidate_id);
                if candidate.name != method.name
                    || candidate.is_static
                    || !(candidate.is_virtual || candidate.is_abstract || candidate.is_override)
                    || candidate.sig.type_params.len() != method.sig.type_params.len()
                    || candidate.sig.params.len() != method.sig.params.len()
                {
                    continue;
                }
                let mut map = inst_map.clone();
                for (theirs, ours) in candidate
                    .sig
                    .type_params
                    .iter()
                    .zip(method.sig.type_params.iter())
                {
                    map.insert(theirs.name, Type::Param(ours.name));
                }
                let matches = candidate
                    .sig
                    .params
                    .iter()
                    .zip(method.sig.params.iter())
                    .all(|(theirs, ours)| {
                        theirs.ref_kind == ours.ref_kind
                            && substitute(&theirs.ty, &map) == ours.ty
                    });
                if matches {
                    return Some(candidate_id);
                }
            }
        }
        None
    }

    // ----- pass 4: type-parameter containers -----

    fn build_containers(&mut self) {
        let units = std::mem::take(&mut self.units);
        for unit in &units {
            let scope = BindScope {
                namespace: unit.namespace,
                ..BindScope::default()
            };
            for item in &unit.items {
                self.container_pass(item, &scope);
            }
        }
        self.units = units;
    }

    fn container_pass(&mut self, member: &MemberDecl, scope: &BindScope) {
        match member {
            MemberDecl::Type(decl) => {
                let id = self.types_by_node[&decl.id];
                let mut inner = scope.clone();
                inner.containing.push(id);
                inner.params.extend(decl.type_params.iter().map(|p| p.name));

                let container = self.build_container(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );
                self.containers.insert(decl.id, container);

                for nested in &decl.members {
                    self.container_pass(nested, &inner);
                }
            }
            MemberDecl::Method(decl) => {
                let mut inner = scope.clone();
                inner.params.extend(decl.type_params.iter().map(|p| p.name));
                let container = self.build_container(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );
                self.containers.insert(decl.id, container);
            }
            MemberDecl::Delegate(decl) => {
                let mut inner = scope.clone();
                inner.params.extend(decl.type_params.iter().map(|p| p.name));
                let container = self.build_container(
                    &decl.type_params,
                    &decl.constraint_clauses,
                    &inner,
                );
                self.containers.insert(decl.id, container);
            }
        }
    }

    fn build_container(
        &self,
        params: &[TypeParam],
        clauses: &[ConstraintClause],
        scope: &BindScope,
    ) -> TypeParamContainer {
        let data = params
            .iter()
            .map(|param| {
                let marker = self.find_marker(&param.attributes);
                let (marker_span, marker_arg_span, default_ty) = match marker {
                    Some(attr) => {
                        let arg = attr.args.iter().find(|a| {
                            a.name.is_none() && matches!(a.value, AttrValue::TypeOf(_))
                        });
                        match arg {
                            Some(arg) => {
                                let AttrValue::TypeOf(ty_ref) = &arg.value else {
                                    unreachable!("filtered to TypeOf above");
                                };
                                let mut ty = self.resolve_type_ref(ty_ref, scope);
                                // Type parameters cannot appear in attribute
                                // arguments; a binding that lands on one is
                                // as unusable as an unknown name.
                                if matches!(ty, Type::Param(_)) {
                                    ty = Type::Error;
                                }
                                (Some(attr.span), Some(arg.span), Some(ty))
                            }
                            None => (Some(attr.span), None, None),
                        }
                    }
                    None => (None, None, None),
                };
                let constraints = clauses
                    .iter()
                    .filter(|c| c.param == param.name)
                    .flat_map(|c| c.constraints.iter())
                    .map(|c| self.resolve_constraint(c, scope))
                    .collect();
                TypeParamData {
                    name: param.name,
                    span: param.span,
                    marker_span,
                    marker_arg_span,
                    default_ty,
                    constraints,
                }
            })
            .collect();
        TypeParamContainer::new(data)
    }

    fn find_marker<'a>(&self, attrs: &'a [AttrUse]) -> Option<&'a AttrUse> {
        attrs
            .iter()
            .find(|a| markers::is_default_param(&self.interner, a))
    }

    // ----- name resolution -----

    fn resolve_type_ref(&self, ty: &TypeRef, scope: &BindScope) -> Type {
        match ty {
            TypeRef::Predef(Predef::Void) => Type::Void,
            TypeRef::Predef(p) => match self.well_known.predef(*p) {
                Some(def) => Type::def(def),
                None => Type::Error,
            },
            TypeRef::Named {
                name,
                args,
                unbound,
            } => {
                if !*unbound && args.is_empty() && scope.params.contains(name) {
                    return Type::Param(*name);
                }
                let Some(def) = self.lookup_named(*name, scope) else {
                    return Type::Error;
                };
                let arity = self.registry.get_type(def).arity();
                if *unbound {
                    if arity == 0 {
                        return Type::Error;
                    }
                    return Type::Unbound(def);
                }
                if args.len() != arity {
                    return Type::Error;
                }
                let args: Vec<Type> = args
                    .iter()
                    .map(|a| self.resolve_type_ref(a, scope))
                    .collect();
                Type::Def { def, args }
            }
            TypeRef::Array(elem) => {
                Type::Array(Box::new(self.resolve_type_ref(elem, scope)))
            }
            TypeRef::Pointer(elem) => {
                Type::Pointer(Box::new(self.resolve_type_ref(elem, scope)))
            }
            TypeRef::FunctionPointer { params, ret } => Type::FnPointer {
                params: params
                    .iter()
                    .map(|p| self.resolve_type_ref(p, scope))
                    .collect(),
                ret: Box::new(self.resolve_type_ref(ret, scope)),
            },
        }
    }

    fn lookup_named(&self, name: Symbol, scope: &BindScope) -> Option<TypeDefId> {
        let text = self.interner.resolve(name);

        if text.contains('.') {
            if let Some(def) = self.registry.type_by_full_name(text) {
                return Some(def);
            }
            if let Some(ns) = scope.namespace {
                let qualified = format!("{}.{}", self.interner.resolve(ns), text);
                if let Some(def) = self.registry.type_by_full_name(&qualified) {
                    return Some(def);
                }
            }
            return None;
        }

        // Nested types and self-references, innermost containing type first.
        for &containing in scope.containing.iter().rev() {
            let def = self.registry.get_type(containing);
            if def.name == name {
                return Some(containing);
            }
            for &nested in &def.nested {
                if self.registry.get_type(nested).name == name {
                    return Some(nested);
                }
            }
        }

        if let Some(ns) = scope.namespace {
            let qualified = format!("{}.{}", self.interner.resolve(ns), text);
            if let Some(def) = self.registry.type_by_full_name(&qualified) {
                return Some(def);
            }
        }
        if let Some(def) = self.registry.type_by_full_name(text) {
            return Some(def);
        }
        self.registry
            .type_by_full_name(&format!("System.{text}"))
    }

    // ----- accessors used by the pipeline -----

    pub fn site(&self, node: NodeId) -> Option<&DeclSite> {
        self.sites.get(&node)
    }

    pub fn member_at(&self, site: &DeclSite) -> &MemberDecl {
        let unit = &self.units[site.unit];
        let mut member = &unit.items[site.path[0] as usize];
        for &idx in &site.path[1..] {
            let MemberDecl::Type(decl) = member else {
                unreachable!("declaration sites only nest through types");
            };
            member = &decl.members[idx as usize];
        }
        member
    }

    pub fn method_decl(&self, node: NodeId) -> Option<&MethodDecl> {
        let site = self.site(node)?;
        match self.member_at(site) {
            MemberDecl::Method(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn type_decl(&self, node: NodeId) -> Option<&TypeDecl> {
        let site = self.site(node)?;
        match self.member_at(site) {
            MemberDecl::Type(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn delegate_decl(&self, node: NodeId) -> Option<&DelegateDecl> {
        let site = self.site(node)?;
        match self.member_at(site) {
            MemberDecl::Delegate(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn container(&self, node: NodeId) -> Option<&TypeParamContainer> {
        self.containers.get(&node)
    }

    pub fn type_def_of(&self, node: NodeId) -> Option<TypeDefId> {
        self.types_by_node.get(&node).copied()
    }

    pub fn method_of(&self, node: NodeId) -> Option<MethodId> {
        self.methods_by_node.get(&node).copied()
    }

    /// Containing type chain of a definition, innermost first.
    pub fn containing_chain(&self, mut def: Option<TypeDefId>) -> Vec<TypeDefId> {
        let mut chain = Vec::new();
        while let Some(id) = def {
            chain.push(id);
            def = self.registry.get_type(id).containing;
        }
        chain
    }

    /// Effective accessibility of a member declared with `access` inside
    /// the given containing type.
    pub fn member_accessibility(
        &self,
        access: Accessibility,
        containing: Option<TypeDefId>,
    ) -> Accessibility {
        let mut effective = access;
        for id in self.containing_chain(containing) {
            effective = effective.meet(self.registry.get_type(id).access);
        }
        effective
    }

    /// Effective accessibility of a type reference: the meet over its
    /// definition chain and every type argument. Type parameters and
    /// predefined types are universally visible.
    pub fn type_accessibility(&self, ty: &Type) -> Accessibility {
        match ty {
            Type::Def { def, args } => {
                let type_def = self.registry.get_type(*def);
                let mut effective =
                    self.member_accessibility(type_def.access, type_def.containing);
                for arg in args {
                    effective = effective.meet(self.type_accessibility(arg));
                }
                effective
            }
            Type::Array(elem) | Type::Pointer(elem) => self.type_accessibility(elem),
            Type::FnPointer { params, ret } => {
                let mut effective = self.type_accessibility(ret);
                for param in params {
                    effective = effective.meet(self.type_accessibility(param));
                }
                effective
            }
            Type::Unbound(def) => {
                let type_def = self.registry.get_type(*def);
                self.member_accessibility(type_def.access, type_def.containing)
            }
            _ => Accessibility::Public,
        }
    }

}
