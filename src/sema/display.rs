// src/sema/display.rs
//! Printable form of semantic types: the language keyword when one exists,
//! the fully-qualified dotted name otherwise. Diagnostics and generated
//! source both go through here so the two always agree.

use crate::sema::registry::Registry;
use crate::sema::types::Type;
use crate::syntax::Interner;

pub fn display_type(ty: &Type, registry: &Registry, interner: &Interner) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, registry, interner);
    out
}

fn write_type(out: &mut String, ty: &Type, registry: &Registry, interner: &Interner) {
    match ty {
        Type::Void => out.push_str("void"),
        Type::Def { def, args } => {
            let type_def = registry.get_type(*def);
            if let Some(keyword) = type_def.keyword {
                out.push_str(keyword);
            } else {
                out.push_str(&registry.full_name(*def, interner));
            }
            if !args.is_empty() {
                out.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(out, arg, registry, interner);
                }
                out.push('>');
            }
        }
        Type::Param(name) => out.push_str(interner.resolve(*name)),
        Type::Array(elem) => {
            write_type(out, elem, registry, interner);
            out.push_str("[]");
        }
        Type::Pointer(elem) => {
            write_type(out, elem, registry, interner);
            out.push('*');
        }
        Type::FnPointer { params, ret } => {
            out.push_str("delegate*<");
            for param in params {
                write_type(out, param, registry, interner);
                out.push_str(", ");
            }
            write_type(out, ret, registry, interner);
            out.push('>');
        }
        Type::Unbound(def) => {
            out.push_str(&registry.full_name(*def, interner));
            out.push_str("<>");
        }
        Type::Error => out.push_str("<error>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::well_known::WellKnown;
    use crate::syntax::ast::Predef;

    #[test]
    fn keyword_form_wins_over_full_name() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();
        let wk = WellKnown::register(&mut registry, &mut interner);

        let int = Type::def(wk.predef(Predef::Int).unwrap());
        assert_eq!(display_type(&int, &registry, &interner), "int");
        assert_eq!(
            display_type(&Type::def(wk.array), &registry, &interner),
            "System.Array"
        );
    }

    #[test]
    fn generic_arguments_are_rendered() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();
        let wk = WellKnown::register(&mut registry, &mut interner);

        let t = interner.intern("T");
        let ty = Type::Def {
            def: wk.string,
            args: vec![Type::Param(t), Type::def(wk.object)],
        };
        assert_eq!(display_type(&ty, &registry, &interner), "string<T, object>");
    }
}
