// src/pipeline/filter.rs
//! The validate-and-create façade.
//!
//! One lazy producer walks the receiver's buckets in declaration order and
//! yields a validated record per declaration that survives analysis.
//! Re-running the stream re-validates from scratch; restart by re-invoking,
//! not by resetting. Logging and caching are wrapping decorators, not
//! separate implementations.

use crate::analysis::{
    analyze_delegate, analyze_local_functions, analyze_method, analyze_type, AnalysisContext,
};
use crate::errors::DiagnosticSink;
use crate::pipeline::cache::SpanCache;
use crate::pipeline::records::ValidatedDecl;
use crate::syntax::ast::NodeId;
use crate::syntax::{Span, SyntaxReceiver};

#[derive(Debug, Clone, Copy)]
pub struct DeclFilter<'a> {
    ctx: AnalysisContext<'a>,
    receiver: &'a SyntaxReceiver,
}

impl<'a> DeclFilter<'a> {
    pub fn new(ctx: AnalysisContext<'a>, receiver: &'a SyntaxReceiver) -> Self {
        Self { ctx, receiver }
    }

    /// Lazy stream of validated records; findings go to `sink`.
    pub fn stream<'s>(&self, sink: &'s mut dyn DiagnosticSink) -> ValidationStream<'a, 's> {
        ValidationStream {
            ctx: self.ctx,
            receiver: self.receiver,
            sink,
            stage: Stage::Methods,
            index: 0,
        }
    }

    /// Eager convenience over [`DeclFilter::stream`].
    pub fn validate_all(&self, sink: &mut dyn DiagnosticSink) -> Vec<ValidatedDecl> {
        self.stream(sink).collect()
    }

    /// Cached variant for the live-analysis scenario: records keyed by
    /// declaration span are reused across passes. Declarations with empty
    /// spans always re-validate, and diagnostics of cached declarations
    /// are not re-reported.
    pub fn validate_all_cached(
        &self,
        cache: &mut SpanCache,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<ValidatedDecl> {
        let mut out = Vec::new();

        let buckets: [(&[NodeId], Kind); 3] = [
            (&self.receiver.methods, Kind::Method),
            (&self.receiver.types, Kind::Type),
            (&self.receiver.delegates, Kind::Delegate),
        ];
        for (nodes, kind) in buckets {
            for &node in nodes {
                if self.ctx.cancel.is_cancelled() {
                    return out;
                }
                let span = decl_span(&self.ctx, node);
                if let Some(span) = span.filter(|s| !s.is_empty()) {
                    if let Some(hit) = cache.get(span) {
                        tracing::debug!(start = span.start, "declaration served from cache");
                        out.push(hit.clone());
                        continue;
                    }
                }
                let record = match kind {
                    Kind::Method => {
                        analyze_method(node, &self.ctx, sink).map(ValidatedDecl::Method)
                    }
                    Kind::Type => analyze_type(node, &self.ctx, sink).map(ValidatedDecl::Type),
                    Kind::Delegate => {
                        analyze_delegate(node, &self.ctx, sink).map(ValidatedDecl::Delegate)
                    }
                };
                if let Some(record) = record {
                    if let Some(span) = span.filter(|s| !s.is_empty()) {
                        cache.insert(span, record.clone());
                    }
                    out.push(record);
                }
            }
        }
        analyze_local_functions(&self.receiver.local_functions, &self.ctx, sink);
        out
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Method,
    Type,
    Delegate,
}

fn decl_span(ctx: &AnalysisContext, node: NodeId) -> Option<Span> {
    let compilation = ctx.compilation;
    let site = compilation.site(node)?;
    let span = match compilation.member_at(site) {
        crate::syntax::ast::MemberDecl::Type(decl) => decl.span,
        crate::syntax::ast::MemberDecl::Method(decl) => decl.span,
        crate::syntax::ast::MemberDecl::Delegate(decl) => decl.span,
    };
    Some(span)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Methods,
    Types,
    Delegates,
    LocalFunctions,
    Done,
}

/// Finite, restartable-by-reinvocation sequence of validated records.
pub struct ValidationStream<'a, 's> {
    ctx: AnalysisContext<'a>,
    receiver: &'a SyntaxReceiver,
    sink: &'s mut dyn DiagnosticSink,
    stage: Stage,
    index: usize,
}

impl Iterator for ValidationStream<'_, '_> {
    type Item = ValidatedDecl;

    fn next(&mut self) -> Option<ValidatedDecl> {
        loop {
            if self.ctx.cancel.is_cancelled() {
                return None;
            }
            match self.stage {
                Stage::Methods => {
                    let Some(&node) = self.receiver.methods.get(self.index) else {
                        self.stage = Stage::Types;
                        self.index = 0;
                        continue;
                    };
                    self.index += 1;
                    if let Some(record) = analyze_method(node, &self.ctx, self.sink) {
                        return Some(ValidatedDecl::Method(record));
                    }
                }
                Stage::Types => {
                    let Some(&node) = self.receiver.types.get(self.index) else {
                        self.stage = Stage::Delegates;
                        self.index = 0;
                        continue;
                    };
                    self.index += 1;
                    if let Some(record) = analyze_type(node, &self.ctx, self.sink) {
                        return Some(ValidatedDecl::Type(record));
                    }
                }
                Stage::Delegates => {
                    let Some(&node) = self.receiver.delegates.get(self.index) else {
                        self.stage = Stage::LocalFunctions;
                        self.index = 0;
                        continue;
                    };
                    self.index += 1;
                    if let Some(record) = analyze_delegate(node, &self.ctx, self.sink) {
                        return Some(ValidatedDecl::Delegate(record));
                    }
                }
                Stage::LocalFunctions => {
                    analyze_local_functions(&self.receiver.local_functions, &self.ctx, self.sink);
                    self.stage = Stage::Done;
                }
                Stage::Done => return None,
            }
        }
    }
}

/// Logging decorator: one debug event per validated record.
pub struct Logged<I> {
    inner: I,
}

impl<I> Logged<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator<Item = ValidatedDecl>> Iterator for Logged<I> {
    type Item = ValidatedDecl;

    fn next(&mut self) -> Option<ValidatedDecl> {
        let item = self.inner.next();
        if let Some(record) = &item {
            tracing::debug!(
                node = record.node().0,
                arities = record.strip_count(),
                "validated declaration"
            );
        }
        item
    }
}
