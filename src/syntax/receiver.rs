// src/syntax/receiver.rs
//! Syntactic candidate collection.
//!
//! The receiver walks every unit once and buckets declarations by shape:
//! anything whose type-parameter list carries the default marker, plus
//! `override` methods (they may inherit markers from their base without
//! declaring any). No semantic reasoning happens here.

use smallvec::SmallVec;

use crate::markers;
use crate::syntax::ast::*;
use crate::syntax::{Interner, Span};

/// Local functions never generate; the receiver records just enough for the
/// analyzer to report the illegal marker placement.
#[derive(Debug, Clone)]
pub struct LocalFunctionCandidate {
    pub node: NodeId,
    pub name: Symbol,
    pub span: Span,
    /// Span of each marker attribute found on the local function's params.
    pub marker_spans: SmallVec<[Span; 1]>,
}

#[derive(Debug, Default)]
pub struct SyntaxReceiver {
    pub methods: Vec<NodeId>,
    pub types: Vec<NodeId>,
    pub delegates: Vec<NodeId>,
    pub local_functions: Vec<LocalFunctionCandidate>,
}

impl SyntaxReceiver {
    pub fn collect(units: &[CompilationUnit], interner: &Interner) -> Self {
        let mut receiver = Self::default();
        for unit in units {
            for item in &unit.items {
                receiver.visit_member(item, interner);
            }
        }
        receiver
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
            && self.types.is_empty()
            && self.delegates.is_empty()
            && self.local_functions.is_empty()
    }

    fn visit_member(&mut self, member: &MemberDecl, interner: &Interner) {
        match member {
            MemberDecl::Type(decl) => {
                if has_marker(&decl.type_params, interner) {
                    self.types.push(decl.id);
                }
                for nested in &decl.members {
                    self.visit_member(nested, interner);
                }
            }
            MemberDecl::Method(decl) => {
                if has_marker(&decl.type_params, interner) || decl.is_override {
                    self.methods.push(decl.id);
                }
                if let Some(body) = &decl.body {
                    self.visit_block(body, interner);
                }
            }
            MemberDecl::Delegate(decl) => {
                if has_marker(&decl.type_params, interner) {
                    self.delegates.push(decl.id);
                }
            }
        }
    }

    fn visit_block(&mut self, block: &Block, interner: &Interner) {
        for stmt in &block.stmts {
            if let Stmt::LocalFunction(local) = stmt {
                let mut marker_spans = SmallVec::new();
                for param in &local.type_params {
                    for attr in &param.attributes {
                        if markers::is_default_param(interner, attr) {
                            marker_spans.push(attr.span);
                        }
                    }
                }
                if !marker_spans.is_empty() {
                    self.local_functions.push(LocalFunctionCandidate {
                        node: local.id,
                        name: local.name,
                        span: local.span,
                        marker_spans,
                    });
                }
                if let Some(body) = &local.body {
                    self.visit_block(body, interner);
                }
            }
        }
    }
}

fn has_marker(params: &[TypeParam], interner: &Interner) -> bool {
    params.iter().any(|param| {
        param
            .attributes
            .iter()
            .any(|attr| markers::is_default_param(interner, attr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxFactory;

    #[test]
    fn buckets_marked_declarations_by_kind() {
        let mut f = SyntaxFactory::new();

        let int = f.int();
        let mut method = f.method("Test");
        method.type_params = vec![f.default_param("T", int.clone())];
        let method_id = method.id;

        let mut delegate = f.delegate("Action");
        delegate.type_params = vec![f.default_param("T", int.clone())];
        let delegate_id = delegate.id;

        let mut class = f.class("Container");
        class.type_params = vec![f.default_param("T", int)];
        let class_id = class.id;
        class.members = vec![MemberDecl::Method(method)];

        let unit = f.unit(vec![MemberDecl::Type(class), MemberDecl::Delegate(delegate)]);
        let receiver = SyntaxReceiver::collect(&[unit], &f.interner);

        assert_eq!(receiver.types, vec![class_id]);
        assert_eq!(receiver.methods, vec![method_id]);
        assert_eq!(receiver.delegates, vec![delegate_id]);
        assert!(receiver.local_functions.is_empty());
    }

    #[test]
    fn override_method_is_a_candidate_without_markers() {
        let mut f = SyntaxFactory::new();
        let mut method = f.method("Test");
        method.is_override = true;
        method.type_params = vec![f.type_param("T")];
        let method_id = method.id;

        let mut class = f.class("Derived");
        class.members = vec![MemberDecl::Method(method)];

        let unit = f.unit(vec![MemberDecl::Type(class)]);
        let receiver = SyntaxReceiver::collect(&[unit], &f.interner);

        assert_eq!(receiver.methods, vec![method_id]);
        assert!(receiver.types.is_empty());
    }

    #[test]
    fn marked_local_function_is_recorded() {
        let mut f = SyntaxFactory::new();
        let int = f.int();
        let mut local = f.local_function("Helper");
        local.type_params = vec![f.default_param("T", int)];
        let local_id = local.id;

        let mut method = f.method("Outer");
        method.body = Some(Block {
            stmts: vec![Stmt::LocalFunction(local)],
            span: Span::dummy(),
        });

        let mut class = f.class("Container");
        class.members = vec![MemberDecl::Method(method)];

        let unit = f.unit(vec![MemberDecl::Type(class)]);
        let receiver = SyntaxReceiver::collect(&[unit], &f.interner);

        assert_eq!(receiver.local_functions.len(), 1);
        assert_eq!(receiver.local_functions[0].node, local_id);
    }
}
