// src/sema/well_known.rs
//
// Host types registered once per compilation.
// These back the predefined-type keywords and the special cases the
// analyzer singles out (object, System.Array, System.ValueType).

use rustc_hash::FxHashMap;

use crate::sema::registry::{Registry, TypeDef, TypeDefId, TypeDefKind};
use crate::syntax::ast::{Accessibility, Predef, Symbol};
use crate::syntax::Interner;

#[derive(Debug, Clone)]
pub struct WellKnown {
    pub object: TypeDefId,
    pub string: TypeDefId,
    /// `System.Array`, the base of all array types.
    pub array: TypeDefId,
    /// `System.ValueType`, the base of all value types.
    pub value_type: TypeDefId,
    predefs: FxHashMap<Predef, TypeDefId>,
}

impl WellKnown {
    /// Populate the registry with the host's core types. Call once, before
    /// any user declarations are registered.
    pub fn register(registry: &mut Registry, interner: &mut Interner) -> Self {
        let system = interner.intern("System");

        let object = add(
            registry, interner, system, "Object", TypeDefKind::Class,
            Flags { keyword: Some("object"), ..Flags::default() },
        );
        let value_type = add(
            registry, interner, system, "ValueType", TypeDefKind::Class,
            Flags { is_abstract: true, base: Some(object), ..Flags::default() },
        );
        let array = add(
            registry, interner, system, "Array", TypeDefKind::Class,
            Flags { is_abstract: true, base: Some(object), ..Flags::default() },
        );
        let string = add(
            registry, interner, system, "String", TypeDefKind::Class,
            Flags { is_sealed: true, keyword: Some("string"), base: Some(object), ..Flags::default() },
        );

        let mut predefs = FxHashMap::default();
        predefs.insert(Predef::Object, object);
        predefs.insert(Predef::String, string);

        let numerics: &[(Predef, &str)] = &[
            (Predef::Bool, "Boolean"),
            (Predef::Char, "Char"),
            (Predef::SByte, "SByte"),
            (Predef::Byte, "Byte"),
            (Predef::Short, "Int16"),
            (Predef::UShort, "UInt16"),
            (Predef::Int, "Int32"),
            (Predef::UInt, "UInt32"),
            (Predef::Long, "Int64"),
            (Predef::ULong, "UInt64"),
            (Predef::Float, "Single"),
            (Predef::Double, "Double"),
            (Predef::Decimal, "Decimal"),
        ];
        for &(predef, clr_name) in numerics {
            let id = add(
                registry, interner, system, clr_name, TypeDefKind::Struct,
                Flags {
                    is_sealed: true,
                    is_unmanaged: true,
                    keyword: Some(predef.keyword()),
                    base: Some(value_type),
                    ..Flags::default()
                },
            );
            predefs.insert(predef, id);
        }

        Self {
            object,
            string,
            array,
            value_type,
            predefs,
        }
    }

    /// Definition backing a predefined-type keyword. `void` has no
    /// definition; the caller maps it to `Type::Void` before asking.
    pub fn predef(&self, predef: Predef) -> Option<TypeDefId> {
        self.predefs.get(&predef).copied()
    }

    pub fn is_object(&self, def: TypeDefId) -> bool {
        def == self.object
    }

    pub fn is_system_array(&self, def: TypeDefId) -> bool {
        def == self.array
    }

    pub fn is_system_value_type(&self, def: TypeDefId) -> bool {
        def == self.value_type
    }
}

#[derive(Default)]
struct Flags {
    is_sealed: bool,
    is_abstract: bool,
    is_unmanaged: bool,
    keyword: Option<&'static str>,
    base: Option<TypeDefId>,
}

fn add(
    registry: &mut Registry,
    interner: &mut Interner,
    namespace: Symbol,
    name: &str,
    kind: TypeDefKind,
    flags: Flags,
) -> TypeDefId {
    let name = interner.intern(name);
    registry.add_type(
        TypeDef {
            name,
            namespace: Some(namespace),
            containing: None,
            kind,
            access: Accessibility::Public,
            is_sealed: flags.is_sealed,
            is_static: false,
            is_abstract: flags.is_abstract,
            is_partial: false,
            is_ref_like: false,
            is_unmanaged: flags.is_unmanaged,
            has_default_ctor: kind == TypeDefKind::Struct,
            has_marked_params: false,
            type_params: Vec::new(),
            base: flags.base.map(crate::sema::types::Type::def),
            interfaces: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            delegate_sig: None,
            node: None,
            keyword: flags.keyword,
        },
        interner,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefs_resolve_by_full_name() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();
        let wk = WellKnown::register(&mut registry, &mut interner);

        assert_eq!(registry.type_by_full_name("System.Int32"), wk.predef(Predef::Int));
        assert_eq!(registry.type_by_full_name("System.Object"), Some(wk.object));
        assert_eq!(registry.type_by_full_name("System.Array"), Some(wk.array));
    }

    #[test]
    fn value_types_are_sealed_and_unmanaged() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();
        let wk = WellKnown::register(&mut registry, &mut interner);

        let int = registry.get_type(wk.predef(Predef::Int).unwrap());
        assert!(int.is_sealed);
        assert!(int.is_unmanaged);
        assert!(int.is_value_type());
        assert_eq!(int.keyword, Some("int"));
    }
}
