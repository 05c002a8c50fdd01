// src/syntax/build.rs
//! Programmatic construction of syntax trees.
//!
//! Hosts (and this crate's tests) build declaration trees through a
//! [`SyntaxFactory`], which owns the interner and hands out fresh node ids.
//! Factory methods return nodes with common defaults (`public`, `partial`,
//! empty body); callers adjust the public fields afterwards.

use crate::markers;
use crate::syntax::ast::*;
use crate::syntax::{Interner, Span};

#[derive(Debug, Default)]
pub struct SyntaxFactory {
    pub interner: Interner,
    next_node: u32,
}

impl SyntaxFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn sym(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    // ----- type references -----

    /// Possibly-dotted named type without arguments.
    pub fn named(&mut self, name: &str) -> TypeRef {
        TypeRef::named(self.sym(name))
    }

    pub fn generic(&mut self, name: &str, args: Vec<TypeRef>) -> TypeRef {
        TypeRef::Named {
            name: self.sym(name),
            args,
            unbound: false,
        }
    }

    pub fn unbound(&mut self, name: &str) -> TypeRef {
        TypeRef::Named {
            name: self.sym(name),
            args: Vec::new(),
            unbound: true,
        }
    }

    pub fn array_of(&mut self, elem: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(elem))
    }

    pub fn void(&self) -> TypeRef {
        TypeRef::Predef(Predef::Void)
    }

    pub fn int(&self) -> TypeRef {
        TypeRef::Predef(Predef::Int)
    }

    pub fn string(&self) -> TypeRef {
        TypeRef::Predef(Predef::String)
    }

    pub fn object(&self) -> TypeRef {
        TypeRef::Predef(Predef::Object)
    }

    pub fn bool(&self) -> TypeRef {
        TypeRef::Predef(Predef::Bool)
    }

    // ----- attributes and type parameters -----

    pub fn attr(&mut self, name: &str, args: Vec<AttrArg>) -> AttrUse {
        AttrUse {
            name: self.sym(name),
            args,
            span: Span::dummy(),
        }
    }

    pub fn named_arg(&mut self, name: &str, value: AttrValue) -> AttrArg {
        AttrArg {
            name: Some(self.sym(name)),
            value,
            span: Span::dummy(),
        }
    }

    pub fn positional_arg(&self, value: AttrValue) -> AttrArg {
        AttrArg {
            name: None,
            value,
            span: Span::dummy(),
        }
    }

    /// Plain type parameter.
    pub fn type_param(&mut self, name: &str) -> TypeParam {
        TypeParam {
            name: self.sym(name),
            attributes: Vec::new(),
            span: Span::dummy(),
        }
    }

    /// Type parameter carrying the default marker: `[DefaultParam(typeof(ty))] T`.
    pub fn default_param(&mut self, name: &str, default: TypeRef) -> TypeParam {
        let arg = self.positional_arg(AttrValue::TypeOf(default));
        let marker = self.attr(markers::DEFAULT_PARAM_ATTRIBUTE, vec![arg]);
        TypeParam {
            name: self.sym(name),
            attributes: vec![marker],
            span: Span::dummy(),
        }
    }

    pub fn where_clause(&mut self, param: &str, constraints: Vec<Constraint>) -> ConstraintClause {
        ConstraintClause {
            param: self.sym(param),
            constraints,
            span: Span::dummy(),
        }
    }

    // ----- parameters -----

    pub fn param(&mut self, name: &str, ty: TypeRef) -> Param {
        Param {
            name: self.sym(name),
            ty,
            ref_kind: RefKind::ByValue,
            span: Span::dummy(),
        }
    }

    pub fn ref_param(&mut self, name: &str, ty: TypeRef, ref_kind: RefKind) -> Param {
        Param {
            name: self.sym(name),
            ty,
            ref_kind,
            span: Span::dummy(),
        }
    }

    // ----- declarations -----

    /// `public partial class` with no members.
    pub fn class(&mut self, name: &str) -> TypeDecl {
        self.type_decl(name, TypeKind::Class)
    }

    /// `public partial struct` with no members.
    pub fn strukt(&mut self, name: &str) -> TypeDecl {
        self.type_decl(name, TypeKind::Struct)
    }

    /// `public partial interface` with no members.
    pub fn interface(&mut self, name: &str) -> TypeDecl {
        self.type_decl(name, TypeKind::Interface)
    }

    fn type_decl(&mut self, name: &str, kind: TypeKind) -> TypeDecl {
        TypeDecl {
            id: self.next(),
            name: self.sym(name),
            kind,
            access: Accessibility::Public,
            is_partial: true,
            is_sealed: false,
            is_static: false,
            is_abstract: false,
            is_ref_like: false,
            is_new: false,
            type_params: Vec::new(),
            constraint_clauses: Vec::new(),
            bases: Vec::new(),
            attributes: Vec::new(),
            members: Vec::new(),
            span: Span::dummy(),
        }
    }

    /// `public void` method with an empty body.
    pub fn method(&mut self, name: &str) -> MethodDecl {
        MethodDecl {
            id: self.next(),
            name: self.sym(name),
            access: Accessibility::Public,
            is_static: false,
            is_partial: false,
            is_extern: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_sealed: false,
            is_new: false,
            is_unsafe: false,
            type_params: Vec::new(),
            constraint_clauses: Vec::new(),
            params: Vec::new(),
            return_type: TypeRef::Predef(Predef::Void),
            body: Some(Block {
                stmts: Vec::new(),
                span: Span::dummy(),
            }),
            attributes: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn delegate(&mut self, name: &str) -> DelegateDecl {
        DelegateDecl {
            id: self.next(),
            name: self.sym(name),
            access: Accessibility::Public,
            is_unsafe: false,
            type_params: Vec::new(),
            constraint_clauses: Vec::new(),
            params: Vec::new(),
            return_type: TypeRef::Predef(Predef::Void),
            attributes: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn local_function(&mut self, name: &str) -> LocalFunctionDecl {
        LocalFunctionDecl {
            id: self.next(),
            name: self.sym(name),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: TypeRef::Predef(Predef::Void),
            body: Some(Block {
                stmts: Vec::new(),
                span: Span::dummy(),
            }),
            span: Span::dummy(),
        }
    }

    // ----- units -----

    pub fn unit(&mut self, items: Vec<MemberDecl>) -> CompilationUnit {
        CompilationUnit {
            namespace: None,
            items,
        }
    }

    pub fn unit_in(&mut self, namespace: &str, items: Vec<MemberDecl>) -> CompilationUnit {
        CompilationUnit {
            namespace: Some(self.sym(namespace)),
            items,
        }
    }
}
