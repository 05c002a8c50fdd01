// src/pipeline/cache.rs
//! Span-keyed record cache.
//!
//! A performance optimization for the IDE's live-analysis scenario: an
//! unchanged declaration keeps its source span between passes, so its
//! validated record can be reused without re-analysis. Purely an
//! optimization; the canonical pipeline recomputes every pass.

use rustc_hash::FxHashMap;

use crate::pipeline::records::ValidatedDecl;
use crate::syntax::Span;

#[derive(Debug, Default)]
pub struct SpanCache {
    map: FxHashMap<(usize, usize), ValidatedDecl>,
}

impl SpanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, span: Span) -> Option<&ValidatedDecl> {
        self.map.get(&(span.start, span.end))
    }

    pub fn insert(&mut self, span: Span, record: ValidatedDecl) {
        self.map.insert((span.start, span.end), record);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
