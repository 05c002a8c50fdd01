// src/sema/mod.rs
//! Semantic model: symbol registry, type representation, binding, and the
//! per-declaration type-parameter containers analysis consumes.

pub mod display;
pub mod generic;
pub mod model;
pub mod registry;
pub mod types;
pub mod well_known;

pub use display::display_type;
pub use generic::{TypeParamContainer, TypeParamData};
pub use model::{Compilation, DeclSite};
pub use registry::{
    MethodDef, MethodId, MethodSig, ParamSig, Registry, TypeDef, TypeDefId, TypeDefKind,
    TypeParamDef,
};
pub use types::{substitute, Type, TypeConstraint};
pub use well_known::WellKnown;
