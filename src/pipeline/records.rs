// src/pipeline/records.rs
//! Immutable records produced by validation and consumed by generation.
//!
//! Each record carries everything the builder needs: the declaration node,
//! its resolved symbol, the reconciled type-parameter container, the legal
//! strip counts, and the collision-resolution outcome.

use rustc_hash::FxHashSet;

use crate::config::{MethodConvention, TypeConvention};
use crate::sema::{MethodId, TypeDefId, TypeParamContainer};
use crate::syntax::ast::NodeId;

#[derive(Debug, Clone)]
pub struct ValidatedMethod {
    pub node: NodeId,
    pub method: MethodId,
    /// Container after override reconciliation.
    pub container: TypeParamContainer,
    /// Legal strip counts, ascending; 1 drops one trailing parameter.
    pub strips: Vec<usize>,
    /// Strip counts whose collision is suppressed with `new`.
    pub new_arities: FxHashSet<usize>,
    pub convention: MethodConvention,
}

#[derive(Debug, Clone)]
pub struct ValidatedType {
    pub node: NodeId,
    pub def: TypeDefId,
    pub container: TypeParamContainer,
    pub strips: Vec<usize>,
    pub new_arities: FxHashSet<usize>,
    pub convention: TypeConvention,
    /// Validated namespace override for the generated siblings.
    pub target_namespace: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedDelegate {
    pub node: NodeId,
    pub def: TypeDefId,
    pub container: TypeParamContainer,
    pub strips: Vec<usize>,
    pub new_arities: FxHashSet<usize>,
    pub target_namespace: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ValidatedDecl {
    Method(ValidatedMethod),
    Type(ValidatedType),
    Delegate(ValidatedDelegate),
}

impl ValidatedDecl {
    pub fn node(&self) -> NodeId {
        match self {
            ValidatedDecl::Method(record) => record.node,
            ValidatedDecl::Type(record) => record.node,
            ValidatedDecl::Delegate(record) => record.node,
        }
    }

    pub fn strip_count(&self) -> usize {
        match self {
            ValidatedDecl::Method(record) => record.strips.len(),
            ValidatedDecl::Type(record) => record.strips.len(),
            ValidatedDecl::Delegate(record) => record.strips.len(),
        }
    }
}
