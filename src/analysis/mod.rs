// src/analysis/mod.rs
//! Validation of candidate declarations.
//!
//! One shared rule module covers the symbol-kind-agnostic checks; small
//! per-kind analyzers compose it with what only their kind needs (override
//! reconciliation for methods, convention choice for types, collision
//! search restricted to the right symbol kind).

pub mod collision;
pub mod delegates;
pub mod local_functions;
pub mod methods;
pub mod rules;
pub mod types;

#[cfg(test)]
mod tests;

use crate::config::GenConfig;
use crate::pipeline::CancellationToken;
use crate::sema::Compilation;

/// Everything an analyzer needs besides the declaration itself. Built once
/// per pass and shared by reference; nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub compilation: &'a Compilation,
    pub assembly_config: &'a GenConfig,
    pub cancel: &'a CancellationToken,
}

pub use delegates::analyze_delegate;
pub use local_functions::analyze_local_functions;
pub use methods::analyze_method;
pub use types::analyze_type;
