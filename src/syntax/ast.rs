// src/syntax/ast.rs

use crate::syntax::Span;

/// Unique identifier for symbols (interned strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// Unique identifier for a syntax node, assigned at construction time.
///
/// Node ids are the handles the receiver collects and the semantic model
/// indexes; they are stable for the lifetime of one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// One source file worth of declarations.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Dotted namespace the unit's declarations live in, if any.
    pub namespace: Option<Symbol>,
    pub items: Vec<MemberDecl>,
}

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

impl Accessibility {
    /// Whether `self` is visible everywhere `other` is.
    ///
    /// This is the partial order of the host language's accessibility
    /// domains; `Internal` and `Protected` are incomparable.
    pub fn at_least(self, other: Accessibility) -> bool {
        use Accessibility::*;
        match self {
            Public => true,
            ProtectedInternal => !matches!(other, Public),
            Internal => matches!(other, Internal | PrivateProtected | Private),
            Protected => matches!(other, Protected | PrivateProtected | Private),
            PrivateProtected => matches!(other, PrivateProtected | Private),
            Private => matches!(other, Private),
        }
    }

    /// Greatest accessibility visible from both domains. For the
    /// incomparable `Internal`/`Protected` pair this is `PrivateProtected`
    /// (derived types within the same assembly).
    pub fn meet(self, other: Accessibility) -> Accessibility {
        if self.at_least(other) {
            other
        } else if other.at_least(self) {
            self
        } else {
            Accessibility::PrivateProtected
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

/// By-ref passing mode of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefKind {
    #[default]
    ByValue,
    Ref,
    Out,
    In,
}

impl RefKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            RefKind::ByValue => None,
            RefKind::Ref => Some("ref"),
            RefKind::Out => Some("out"),
            RefKind::In => Some("in"),
        }
    }

    /// Whether two parameters with these ref kinds would still collide as
    /// overloads. Signatures may differ by value vs. by-ref, but not by
    /// ref kind alone (`ref`/`out`/`in` conflict with each other).
    pub fn collides_with(self, other: RefKind) -> bool {
        self == other || (self != RefKind::ByValue && other != RefKind::ByValue)
    }
}

/// Built-in types addressable by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predef {
    Void,
    Object,
    String,
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

impl Predef {
    pub fn keyword(self) -> &'static str {
        match self {
            Predef::Void => "void",
            Predef::Object => "object",
            Predef::String => "string",
            Predef::Bool => "bool",
            Predef::Char => "char",
            Predef::SByte => "sbyte",
            Predef::Byte => "byte",
            Predef::Short => "short",
            Predef::UShort => "ushort",
            Predef::Int => "int",
            Predef::UInt => "uint",
            Predef::Long => "long",
            Predef::ULong => "ulong",
            Predef::Float => "float",
            Predef::Double => "double",
            Predef::Decimal => "decimal",
        }
    }
}

/// Reference to a type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Predef(Predef),
    /// Possibly-dotted name with optional type arguments. An empty argument
    /// list on a generic type denotes its unbound form (`List<>`).
    Named {
        name: Symbol,
        args: Vec<TypeRef>,
        unbound: bool,
    },
    Array(Box<TypeRef>),
    Pointer(Box<TypeRef>),
    FunctionPointer {
        params: Vec<TypeRef>,
        ret: Box<TypeRef>,
    },
}

impl TypeRef {
    pub fn named(name: Symbol) -> Self {
        TypeRef::Named {
            name,
            args: Vec::new(),
            unbound: false,
        }
    }
}

/// Attribute applied to a declaration or type parameter.
#[derive(Debug, Clone)]
pub struct AttrUse {
    pub name: Symbol,
    pub args: Vec<AttrArg>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AttrArg {
    /// Named argument (`Convention = ...`) or positional when None.
    pub name: Option<Symbol>,
    pub value: AttrValue,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// `typeof(T)` argument; the payload is the referenced type.
    TypeOf(TypeRef),
    /// Bare enum member reference such as `MethodConvention.Call`.
    EnumMember(Symbol),
}

/// Declared generic type parameter.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: Symbol,
    pub attributes: Vec<AttrUse>,
    pub span: Span,
}

/// `where T : ...` clause.
#[derive(Debug, Clone)]
pub struct ConstraintClause {
    pub param: Symbol,
    pub constraints: Vec<Constraint>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `class`
    ReferenceType,
    /// `struct`
    ValueType,
    /// `unmanaged`
    Unmanaged,
    /// `new()`
    Constructor,
    /// Base type or interface constraint.
    Type(TypeRef),
}

/// Formal parameter of a method or delegate.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeRef,
    pub ref_kind: RefKind,
    pub span: Span,
}

/// Any member declaration the receiver can bucket.
#[derive(Debug, Clone)]
pub enum MemberDecl {
    Type(TypeDecl),
    Method(MethodDecl),
    Delegate(DelegateDecl),
}

impl MemberDecl {
    pub fn node(&self) -> NodeId {
        match self {
            MemberDecl::Type(d) => d.id,
            MemberDecl::Method(d) => d.id,
            MemberDecl::Delegate(d) => d.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: NodeId,
    pub name: Symbol,
    pub kind: TypeKind,
    pub access: Accessibility,
    pub is_partial: bool,
    pub is_sealed: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    /// `ref struct` declarations; never usable as a default type.
    pub is_ref_like: bool,
    pub is_new: bool,
    pub type_params: Vec<TypeParam>,
    pub constraint_clauses: Vec<ConstraintClause>,
    /// Base type followed by implemented interfaces, in source order.
    pub bases: Vec<TypeRef>,
    pub attributes: Vec<AttrUse>,
    pub members: Vec<MemberDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: Symbol,
    pub access: Accessibility,
    pub is_static: bool,
    pub is_partial: bool,
    pub is_extern: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub is_new: bool,
    pub is_unsafe: bool,
    pub type_params: Vec<TypeParam>,
    pub constraint_clauses: Vec<ConstraintClause>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Option<Block>,
    pub attributes: Vec<AttrUse>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DelegateDecl {
    pub id: NodeId,
    pub name: Symbol,
    pub access: Accessibility,
    pub is_unsafe: bool,
    pub type_params: Vec<TypeParam>,
    pub constraint_clauses: Vec<ConstraintClause>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub attributes: Vec<AttrUse>,
    pub span: Span,
}

/// Local function nested in a method body. Only its type-parameter list and
/// spans matter to analysis; the marker is categorically illegal here.
#[derive(Debug, Clone)]
pub struct LocalFunctionDecl {
    pub id: NodeId,
    pub name: Symbol,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Option<Block>,
    pub span: Span,
}

/// Method body.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    Local {
        name: Symbol,
        ty: Option<TypeRef>,
        init: Option<Expr>,
    },
    LocalFunction(LocalFunctionDecl),
}

/// Call-site argument with its ref kind.
#[derive(Debug, Clone)]
pub struct Arg {
    pub ref_kind: RefKind,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Symbol),
    Member {
        recv: Box<Expr>,
        name: Symbol,
    },
    Call {
        callee: Box<Expr>,
        type_args: Vec<TypeRef>,
        args: Vec<Arg>,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
    },
    Default(TypeRef),
    Lit(Lit),
}

#[derive(Debug, Clone)]
pub enum Lit {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
}
