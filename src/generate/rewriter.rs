// src/generate/rewriter.rs
//! Arity-reduction builders.
//!
//! One builder is constructed fresh per validated declaration and consumed
//! by a single `build` call; nothing survives between declarations. The
//! loop walks strip counts from most specific to least: substitute the
//! trailing parameter, prune its constraint clause, shrink the parameter
//! list, and emit when the arity is legal.

use rustc_hash::FxHashMap;

use crate::config::{MethodConvention, TypeConvention};
use crate::generate::render::{strip_tool_attributes, Renderer, SourceBuilder};
use crate::markers;
use crate::pipeline::records::{ValidatedDecl, ValidatedDelegate, ValidatedMethod, ValidatedType};
use crate::sema::{display_type, Compilation, Type, TypeDefId, TypeDefKind};
use crate::syntax::ast::*;
use crate::syntax::Span;

/// One generated source file: every legal overload of one declaration,
/// wrapped in its partial containing-type chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub hint_name: String,
    pub source: String,
}

/// Build the generated unit for a validated record.
pub fn build_declaration(
    compilation: &Compilation,
    record: &ValidatedDecl,
) -> Option<GeneratedUnit> {
    match record {
        ValidatedDecl::Method(record) => MethodOverloadBuilder::new(compilation, record)?.build(),
        ValidatedDecl::Type(record) => TypeOverloadBuilder::new(compilation, record)?.build(),
        ValidatedDecl::Delegate(record) => {
            DelegateOverloadBuilder::new(compilation, record)?.build()
        }
    }
}

struct MethodOverloadBuilder<'a> {
    compilation: &'a Compilation,
    record: &'a ValidatedMethod,
    working: MethodDecl,
    subst: FxHashMap<Symbol, String>,
}

impl<'a> MethodOverloadBuilder<'a> {
    fn new(compilation: &'a Compilation, record: &'a ValidatedMethod) -> Option<Self> {
        let decl = compilation.method_decl(record.node)?;
        let mut working = decl.clone();

        strip_marker_attributes(compilation, &mut working.type_params);
        strip_tool_attributes(compilation, &mut working.attributes);
        push_generated_marker(compilation, &mut working.attributes);

        let method = compilation.registry.get_method(record.method);
        if record.convention == MethodConvention::Call
            && working.body.is_some()
            && !working.is_abstract
        {
            let type_args: Vec<TypeRef> = decl
                .type_params
                .iter()
                .map(|p| TypeRef::named(p.name))
                .collect();
            let args: Vec<Arg> = decl
                .params
                .iter()
                .map(|p| Arg {
                    ref_kind: p.ref_kind,
                    expr: Expr::Ident(p.name),
                })
                .collect();
            let call = Expr::Call {
                callee: Box::new(Expr::Ident(decl.name)),
                type_args,
                args,
            };
            let stmt = if method.sig.ret == Type::Void {
                Stmt::Expr(call)
            } else {
                Stmt::Return(Some(call))
            };
            working.body = Some(Block {
                stmts: vec![stmt],
                span: Span::dummy(),
            });
        }

        Some(Self {
            compilation,
            record,
            working,
            subst: FxHashMap::default(),
        })
    }

    fn build(mut self) -> Option<GeneratedUnit> {
        let container = &self.record.container;
        let total = container.len();
        let max_strip = *self.record.strips.last()?;
        let originally_new = self.working.is_new;
        let mut declarations = Vec::new();

        for strip in 1..=max_strip {
            let data = &container.params()[total - strip];
            if let Some(ty) = &data.default_ty {
                if !ty.is_error() {
                    self.subst.insert(
                        data.name,
                        display_type(ty, &self.compilation.registry, &self.compilation.interner),
                    );
                }
            }
            let removed = data.name;
            self.working
                .constraint_clauses
                .retain(|clause| clause.param != removed);
            self.working.type_params.pop();

            if self.record.strips.contains(&strip) {
                self.working.is_new =
                    originally_new || self.record.new_arities.contains(&strip);
                let renderer = Renderer::new(self.compilation, &self.subst);
                let mut builder = SourceBuilder::new();
                renderer.method(&mut builder, &self.working);
                declarations.push(builder.build());
                self.working.is_new = originally_new;
            }
        }

        let method = self.compilation.registry.get_method(self.record.method);
        let namespace = self
            .compilation
            .registry
            .get_type(containing_root(self.compilation, method.containing))
            .namespace
            .map(|s| self.compilation.interner.resolve(s).to_string());
        let hint_name = format!(
            "{}.{}.g.cs",
            self.compilation
                .registry
                .full_name(method.containing, &self.compilation.interner),
            self.compilation.interner.resolve(method.name)
        );
        Some(GeneratedUnit {
            hint_name,
            source: wrap(
                self.compilation,
                namespace.as_deref(),
                Some(method.containing),
                &declarations,
            ),
        })
    }
}

struct TypeOverloadBuilder<'a> {
    compilation: &'a Compilation,
    record: &'a ValidatedType,
    working: TypeDecl,
    /// Closed generic form of the original, narrowed one argument per step.
    original_args: Vec<TypeRef>,
    subst: FxHashMap<Symbol, String>,
}

impl<'a> TypeOverloadBuilder<'a> {
    fn new(compilation: &'a Compilation, record: &'a ValidatedType) -> Option<Self> {
        let decl = compilation.type_decl(record.node)?;
        let mut working = decl.clone();

        strip_marker_attributes(compilation, &mut working.type_params);
        strip_tool_attributes(compilation, &mut working.attributes);
        push_generated_marker(compilation, &mut working.attributes);
        scrub_members(compilation, &mut working.members);

        let original_args = decl
            .type_params
            .iter()
            .map(|p| TypeRef::named(p.name))
            .collect();

        Some(Self {
            compilation,
            record,
            working,
            original_args,
            subst: FxHashMap::default(),
        })
    }

    fn build(mut self) -> Option<GeneratedUnit> {
        let container = &self.record.container;
        let total = container.len();
        let max_strip = *self.record.strips.last()?;
        let originally_new = self.working.is_new;
        let mut declarations = Vec::new();

        for strip in 1..=max_strip {
            let data = &container.params()[total - strip];
            if let Some(ty) = &data.default_ty {
                if !ty.is_error() {
                    self.subst.insert(
                        data.name,
                        display_type(ty, &self.compilation.registry, &self.compilation.interner),
                    );
                }
            }
            let removed = data.name;
            self.working
                .constraint_clauses
                .retain(|clause| clause.param != removed);
            self.working.type_params.pop();

            if self.record.strips.contains(&strip) {
                let apply_new =
                    originally_new || self.record.new_arities.contains(&strip);
                let renderer = Renderer::new(self.compilation, &self.subst);
                let mut builder = SourceBuilder::new();
                match self.record.convention {
                    TypeConvention::Inherit => {
                        let shell = TypeDecl {
                            id: self.working.id,
                            name: self.working.name,
                            kind: self.working.kind,
                            access: self.working.access,
                            is_partial: false,
                            is_sealed: self.working.is_sealed,
                            is_static: false,
                            is_abstract: self.working.is_abstract,
                            is_ref_like: false,
                            is_new: apply_new,
                            type_params: self.working.type_params.clone(),
                            constraint_clauses: self.working.constraint_clauses.clone(),
                            bases: vec![TypeRef::Named {
                                name: self.working.name,
                                args: self.original_args.clone(),
                                unbound: false,
                            }],
                            attributes: self.working.attributes.clone(),
                            members: Vec::new(),
                            span: Span::dummy(),
                        };
                        renderer.type_decl(&mut builder, &shell);
                    }
                    TypeConvention::Copy => {
                        self.working.is_new = apply_new;
                        self.working.is_partial = false;
                        renderer.type_decl(&mut builder, &self.working);
                        self.working.is_new = originally_new;
                    }
                }
                declarations.push(builder.build());
            }
        }

        let def = self.compilation.registry.get_type(self.record.def);
        let namespace = self
            .record
            .target_namespace
            .clone()
            .or_else(|| {
                def.namespace
                    .map(|s| self.compilation.interner.resolve(s).to_string())
            });
        let hint_name = format!(
            "{}.g.cs",
            self.compilation
                .registry
                .full_name(self.record.def, &self.compilation.interner)
        );
        Some(GeneratedUnit {
            hint_name,
            source: wrap(self.compilation, namespace.as_deref(), def.containing, &declarations),
        })
    }
}

struct DelegateOverloadBuilder<'a> {
    compilation: &'a Compilation,
    record: &'a ValidatedDelegate,
    working: DelegateDecl,
    subst: FxHashMap<Symbol, String>,
}

impl<'a> DelegateOverloadBuilder<'a> {
    fn new(compilation: &'a Compilation, record: &'a ValidatedDelegate) -> Option<Self> {
        let decl = compilation.delegate_decl(record.node)?;
        let mut working = decl.clone();
        strip_marker_attributes(compilation, &mut working.type_params);
        strip_tool_attributes(compilation, &mut working.attributes);
        push_generated_marker(compilation, &mut working.attributes);
        Some(Self {
            compilation,
            record,
            working,
            subst: FxHashMap::default(),
        })
    }

    fn build(mut self) -> Option<GeneratedUnit> {
        let container = &self.record.container;
        let total = container.len();
        let max_strip = *self.record.strips.last()?;
        let mut declarations = Vec::new();

        for strip in 1..=max_strip {
            let data = &container.params()[total - strip];
            if let Some(ty) = &data.default_ty {
                if !ty.is_error() {
                    self.subst.insert(
                        data.name,
                        display_type(ty, &self.compilation.registry, &self.compilation.interner),
                    );
                }
            }
            let removed = data.name;
            self.working
                .constraint_clauses
                .retain(|clause| clause.param != removed);
            self.working.type_params.pop();

            if self.record.strips.contains(&strip) {
                let renderer = Renderer::new(self.compilation, &self.subst);
                let mut builder = SourceBuilder::new();
                renderer.delegate(&mut builder, &self.working);
                declarations.push(builder.build());
            }
        }

        let def = self.compilation.registry.get_type(self.record.def);
        let namespace = self.record.target_namespace.clone().or_else(|| {
            def.namespace
                .map(|s| self.compilation.interner.resolve(s).to_string())
        });
        let hint_name = format!(
            "{}.g.cs",
            self.compilation
                .registry
                .full_name(self.record.def, &self.compilation.interner)
        );
        Some(GeneratedUnit {
            hint_name,
            source: wrap(self.compilation, namespace.as_deref(), def.containing, &declarations),
        })
    }
}

// ----- shared helpers -----

fn strip_marker_attributes(compilation: &Compilation, params: &mut [TypeParam]) {
    for param in params {
        param
            .attributes
            .retain(|attr| !markers::is_default_param(&compilation.interner, attr));
    }
}

fn push_generated_marker(compilation: &Compilation, attrs: &mut Vec<AttrUse>) {
    if let Some(name) = compilation.interner.lookup(markers::GENERATED_ATTRIBUTE) {
        attrs.push(AttrUse {
            name,
            args: Vec::new(),
            span: Span::dummy(),
        });
    }
}

fn scrub_members(compilation: &Compilation, members: &mut Vec<MemberDecl>) {
    for member in members {
        match member {
            MemberDecl::Method(decl) => {
                strip_tool_attributes(compilation, &mut decl.attributes);
                strip_marker_attributes(compilation, &mut decl.type_params);
            }
            MemberDecl::Delegate(decl) => {
                strip_tool_attributes(compilation, &mut decl.attributes);
                strip_marker_attributes(compilation, &mut decl.type_params);
            }
            MemberDecl::Type(decl) => {
                strip_tool_attributes(compilation, &mut decl.attributes);
                strip_marker_attributes(compilation, &mut decl.type_params);
                scrub_members(compilation, &mut decl.members);
            }
        }
    }
}

fn containing_root(compilation: &Compilation, def: TypeDefId) -> TypeDefId {
    let mut current = def;
    while let Some(containing) = compilation.registry.get_type(current).containing {
        current = containing;
    }
    current
}

/// Wrap rendered declarations in the banner, namespace, and partial
/// containing-type chain.
fn wrap(
    compilation: &Compilation,
    namespace: Option<&str>,
    containing: Option<TypeDefId>,
    declarations: &[String],
) -> String {
    let mut builder = SourceBuilder::new();
    builder.push_line("// <auto-generated />");
    builder.blank_line();

    let mut open = 0;
    if let Some(ns) = namespace {
        builder.push_line(&format!("namespace {ns}"));
        builder.push_line("{");
        builder.indent();
        open += 1;
    }

    let mut chain = compilation.containing_chain(containing);
    chain.reverse();
    for def in chain {
        let type_def = compilation.registry.get_type(def);
        let mut line = String::new();
        line.push_str(type_def.access.keyword());
        line.push(' ');
        if type_def.is_static {
            line.push_str("static ");
        }
        line.push_str("partial ");
        line.push_str(match type_def.kind {
            TypeDefKind::Class => "class",
            TypeDefKind::Struct => "struct",
            TypeDefKind::Interface => "interface",
            TypeDefKind::Delegate => "class",
        });
        line.push(' ');
        line.push_str(compilation.interner.resolve(type_def.name));
        if !type_def.type_params.is_empty() {
            let params: Vec<&str> = type_def
                .type_params
                .iter()
                .map(|p| compilation.interner.resolve(p.name))
                .collect();
            line.push('<');
            line.push_str(&params.join(", "));
            line.push('>');
        }
        builder.push_line(&line);
        builder.push_line("{");
        builder.indent();
        open += 1;
    }

    for (index, declaration) in declarations.iter().enumerate() {
        if index > 0 {
            builder.blank_line();
        }
        for line in declaration.lines() {
            if line.is_empty() {
                builder.blank_line();
            } else {
                builder.push_line(line);
            }
        }
    }

    for _ in 0..open {
        builder.dedent();
        builder.push_line("}");
    }
    builder.build()
}
