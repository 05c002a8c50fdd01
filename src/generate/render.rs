// src/generate/render.rs
//! Source-text rendering of declarations.
//!
//! The builder tracks indentation; the renderer prints declarations in the
//! host language's surface syntax, consulting a substitution map so that
//! identifiers of stripped type parameters come out as their default
//! types' keyword-or-name form.

use rustc_hash::FxHashMap;

use crate::markers;
use crate::sema::Compilation;
use crate::syntax::ast::*;

/// Incrementally constructs source text with indentation handling.
#[derive(Debug, Default, Clone)]
pub struct SourceBuilder {
    content: String,
    indent_level: usize,
}

const INDENT: &str = "    ";

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        self.push_indent();
        self.content.push_str(line);
        self.content.push('\n');
    }

    pub fn push(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn push_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.content.push_str(INDENT);
        }
    }

    pub fn blank_line(&mut self) {
        self.content.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn build(self) -> String {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Prints declarations, substituting stripped type parameters.
pub struct Renderer<'a> {
    compilation: &'a Compilation,
    subst: &'a FxHashMap<Symbol, String>,
}

impl<'a> Renderer<'a> {
    pub fn new(compilation: &'a Compilation, subst: &'a FxHashMap<Symbol, String>) -> Self {
        Self { compilation, subst }
    }

    fn resolve(&self, sym: Symbol) -> &str {
        self.compilation.interner.resolve(sym)
    }

    // ----- types -----

    pub fn type_ref(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Predef(p) => p.keyword().to_string(),
            TypeRef::Named {
                name,
                args,
                unbound,
            } => {
                if args.is_empty() && !unbound {
                    if let Some(replacement) = self.subst.get(name) {
                        return replacement.clone();
                    }
                    return self.resolve(*name).to_string();
                }
                let mut out = self.resolve(*name).to_string();
                out.push('<');
                if !unbound {
                    let rendered: Vec<String> =
                        args.iter().map(|a| self.type_ref(a)).collect();
                    out.push_str(&rendered.join(", "));
                }
                out.push('>');
                out
            }
            TypeRef::Array(elem) => format!("{}[]", self.type_ref(elem)),
            TypeRef::Pointer(elem) => format!("{}*", self.type_ref(elem)),
            TypeRef::FunctionPointer { params, ret } => {
                let mut parts: Vec<String> =
                    params.iter().map(|p| self.type_ref(p)).collect();
                parts.push(self.type_ref(ret));
                format!("delegate*<{}>", parts.join(", "))
            }
        }
    }

    fn type_param_list(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = params
            .iter()
            .map(|p| {
                let mut out = String::new();
                for attr in &p.attributes {
                    out.push_str(&self.attribute(attr));
                    out.push(' ');
                }
                out.push_str(self.resolve(p.name));
                out
            })
            .collect();
        format!("<{}>", rendered.join(", "))
    }

    fn where_clauses(&self, clauses: &[ConstraintClause]) -> Vec<String> {
        clauses
            .iter()
            .map(|clause| {
                let constraints: Vec<String> = clause
                    .constraints
                    .iter()
                    .map(|c| match c {
                        Constraint::ReferenceType => "class".to_string(),
                        Constraint::ValueType => "struct".to_string(),
                        Constraint::Unmanaged => "unmanaged".to_string(),
                        Constraint::Constructor => "new()".to_string(),
                        Constraint::Type(ty) => self.type_ref(ty),
                    })
                    .collect();
                format!(
                    "where {} : {}",
                    self.resolve(clause.param),
                    constraints.join(", ")
                )
            })
            .collect()
    }

    // ----- attributes -----

    pub fn attribute(&self, attr: &AttrUse) -> String {
        if attr.args.is_empty() {
            return format!("[{}]", self.resolve(attr.name));
        }
        let args: Vec<String> = attr
            .args
            .iter()
            .map(|arg| match arg.name {
                Some(name) => format!("{} = {}", self.resolve(name), self.attr_value(&arg.value)),
                None => self.attr_value(&arg.value),
            })
            .collect();
        format!("[{}({})]", self.resolve(attr.name), args.join(", "))
    }

    fn attr_value(&self, value: &AttrValue) -> String {
        match value {
            AttrValue::Bool(true) => "true".to_string(),
            AttrValue::Bool(false) => "false".to_string(),
            AttrValue::Int(value) => value.to_string(),
            AttrValue::Str(value) => format!("\"{}\"", value.escape_default()),
            AttrValue::TypeOf(ty) => format!("typeof({})", self.type_ref(ty)),
            AttrValue::EnumMember(sym) => self.resolve(*sym).to_string(),
        }
    }

    fn emit_attributes(&self, builder: &mut SourceBuilder, attrs: &[AttrUse]) {
        for attr in attrs {
            builder.push_line(&self.attribute(attr));
        }
    }

    // ----- declarations -----

    pub fn method(&self, builder: &mut SourceBuilder, decl: &MethodDecl) {
        self.emit_attributes(builder, &decl.attributes);

        let mut line = String::new();
        line.push_str(decl.access.keyword());
        line.push(' ');
        if decl.is_new {
            line.push_str("new ");
        }
        if decl.is_static {
            line.push_str("static ");
        }
        if decl.is_abstract {
            line.push_str("abstract ");
        } else if decl.is_virtual {
            line.push_str("virtual ");
        } else if decl.is_override {
            if decl.is_sealed {
                line.push_str("sealed ");
            }
            line.push_str("override ");
        }
        if decl.is_unsafe {
            line.push_str("unsafe ");
        }
        line.push_str(&self.type_ref(&decl.return_type));
        line.push(' ');
        line.push_str(self.resolve(decl.name));
        line.push_str(&self.type_param_list(&decl.type_params));
        line.push('(');
        line.push_str(&self.param_list(&decl.params));
        line.push(')');

        let clauses = self.where_clauses(&decl.constraint_clauses);
        match &decl.body {
            Some(body) => {
                builder.push_line(&line);
                for clause in &clauses {
                    builder.push_line(&format!("{INDENT}{clause}"));
                }
                self.block(builder, body);
            }
            None => {
                for clause in &clauses {
                    line.push(' ');
                    line.push_str(clause);
                }
                line.push(';');
                builder.push_line(&line);
            }
        }
    }

    pub fn delegate(&self, builder: &mut SourceBuilder, decl: &DelegateDecl) {
        self.emit_attributes(builder, &decl.attributes);

        let mut line = String::new();
        line.push_str(decl.access.keyword());
        line.push(' ');
        if decl.is_unsafe {
            line.push_str("unsafe ");
        }
        line.push_str("delegate ");
        line.push_str(&self.type_ref(&decl.return_type));
        line.push(' ');
        line.push_str(self.resolve(decl.name));
        line.push_str(&self.type_param_list(&decl.type_params));
        line.push('(');
        line.push_str(&self.param_list(&decl.params));
        line.push(')');
        for clause in self.where_clauses(&decl.constraint_clauses) {
            line.push(' ');
            line.push_str(&clause);
        }
        line.push(';');
        builder.push_line(&line);
    }

    pub fn type_decl(&self, builder: &mut SourceBuilder, decl: &TypeDecl) {
        self.emit_attributes(builder, &decl.attributes);

        let mut line = String::new();
        line.push_str(decl.access.keyword());
        line.push(' ');
        if decl.is_new {
            line.push_str("new ");
        }
        if decl.is_static {
            line.push_str("static ");
        }
        if decl.is_sealed {
            line.push_str("sealed ");
        }
        if decl.is_abstract {
            line.push_str("abstract ");
        }
        if decl.is_partial {
            line.push_str("partial ");
        }
        line.push_str(decl.kind.keyword());
        line.push(' ');
        line.push_str(self.resolve(decl.name));
        line.push_str(&self.type_param_list(&decl.type_params));
        if !decl.bases.is_empty() {
            let bases: Vec<String> = decl.bases.iter().map(|b| self.type_ref(b)).collect();
            line.push_str(" : ");
            line.push_str(&bases.join(", "));
        }

        let clauses = self.where_clauses(&decl.constraint_clauses);
        builder.push_line(&line);
        for clause in &clauses {
            builder.push_line(&format!("{INDENT}{clause}"));
        }
        builder.push_line("{");
        builder.indent();
        for (index, member) in decl.members.iter().enumerate() {
            if index > 0 {
                builder.blank_line();
            }
            match member {
                MemberDecl::Method(method) => self.method(builder, method),
                MemberDecl::Delegate(delegate) => self.delegate(builder, delegate),
                MemberDecl::Type(nested) => self.type_decl(builder, nested),
            }
        }
        builder.dedent();
        builder.push_line("}");
    }

    fn param_list(&self, params: &[Param]) -> String {
        let rendered: Vec<String> = params
            .iter()
            .map(|param| {
                let mut out = String::new();
                if let Some(keyword) = param.ref_kind.keyword() {
                    out.push_str(keyword);
                    out.push(' ');
                }
                out.push_str(&self.type_ref(&param.ty));
                out.push(' ');
                out.push_str(self.resolve(param.name));
                out
            })
            .collect();
        rendered.join(", ")
    }

    // ----- statements and expressions -----

    fn block(&self, builder: &mut SourceBuilder, block: &Block) {
        builder.push_line("{");
        builder.indent();
        for stmt in &block.stmts {
            self.stmt(builder, stmt);
        }
        builder.dedent();
        builder.push_line("}");
    }

    fn stmt(&self, builder: &mut SourceBuilder, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => builder.push_line(&format!("{};", self.expr(expr))),
            Stmt::Return(None) => builder.push_line("return;"),
            Stmt::Return(Some(expr)) => {
                builder.push_line(&format!("return {};", self.expr(expr)));
            }
            Stmt::Local { name, ty, init } => {
                let ty_text = match ty {
                    Some(ty) => self.type_ref(ty),
                    None => "var".to_string(),
                };
                match init {
                    Some(init) => builder.push_line(&format!(
                        "{} {} = {};",
                        ty_text,
                        self.resolve(*name),
                        self.expr(init)
                    )),
                    None => {
                        builder.push_line(&format!("{} {};", ty_text, self.resolve(*name)))
                    }
                }
            }
            Stmt::LocalFunction(local) => {
                let mut line = String::new();
                line.push_str(&self.type_ref(&local.return_type));
                line.push(' ');
                line.push_str(self.resolve(local.name));
                line.push_str(&self.type_param_list(&local.type_params));
                line.push('(');
                line.push_str(&self.param_list(&local.params));
                line.push(')');
                match &local.body {
                    Some(body) => {
                        builder.push_line(&line);
                        self.block(builder, body);
                    }
                    None => {
                        line.push(';');
                        builder.push_line(&line);
                    }
                }
            }
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(sym) => self
                .subst
                .get(sym)
                .cloned()
                .unwrap_or_else(|| self.resolve(*sym).to_string()),
            Expr::Member { recv, name } => {
                format!("{}.{}", self.expr(recv), self.resolve(*name))
            }
            Expr::Call {
                callee,
                type_args,
                args,
            } => {
                let mut out = self.expr(callee);
                if !type_args.is_empty() {
                    let rendered: Vec<String> =
                        type_args.iter().map(|t| self.type_ref(t)).collect();
                    out.push('<');
                    out.push_str(&rendered.join(", "));
                    out.push('>');
                }
                out.push('(');
                let rendered: Vec<String> = args
                    .iter()
                    .map(|arg| {
                        let mut text = String::new();
                        if let Some(keyword) = arg.ref_kind.keyword() {
                            text.push_str(keyword);
                            text.push(' ');
                        }
                        text.push_str(&self.expr(&arg.expr));
                        text
                    })
                    .collect();
                out.push_str(&rendered.join(", "));
                out.push(')');
                out
            }
            Expr::New { ty, args } => {
                let rendered: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("new {}({})", self.type_ref(ty), rendered.join(", "))
            }
            Expr::Default(ty) => format!("default({})", self.type_ref(ty)),
            Expr::Lit(lit) => match lit {
                Lit::Int(value) => value.to_string(),
                Lit::Str(value) => format!("\"{}\"", value.escape_default()),
                Lit::Bool(true) => "true".to_string(),
                Lit::Bool(false) => "false".to_string(),
                Lit::Null => "null".to_string(),
            },
        }
    }
}

/// Attributes the generator never copies onto its output.
pub fn strip_tool_attributes(compilation: &Compilation, attrs: &mut Vec<AttrUse>) {
    let interner = &compilation.interner;
    attrs.retain(|attr| {
        !markers::is_default_param(interner, attr)
            && !markers::is_configuration(interner, attr)
            && !markers::is_scoped_configuration(interner, attr)
    });
}
