// src/pipeline/mod.rs
//! Orchestration between the receiver and the generator: validate each
//! candidate, materialize immutable records, and hand them downstream as a
//! lazy stream with optional logging and caching decorators.

pub mod cache;
pub mod cancel;
pub mod filter;
pub mod records;

pub use cache::SpanCache;
pub use cancel::CancellationToken;
pub use filter::{DeclFilter, Logged, ValidationStream};
pub use records::{ValidatedDecl, ValidatedDelegate, ValidatedMethod, ValidatedType};
