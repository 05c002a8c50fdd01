// src/errors/gen.rs
//! The generator's diagnostic catalog (E3xxx/E4xxx/E5xxx, W3xxx).
//!
//! - E3xxx: structural marker placement
//! - E4xxx: ordering, default-type legality, constraints, accessibility
//! - E5xxx: collisions and override reconciliation
//! - W3xxx: non-fatal findings

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum GenError {
    #[error("defaulted type parameters are not valid on a local function")]
    #[diagnostic(
        code(E3001),
        help("move the defaulted parameter to a method, type or delegate declaration")
    )]
    MarkerOnLocalFunction {
        #[label("marker applied here")]
        span: SourceSpan,
    },

    #[error("defaulted type parameters are not valid on a {modifier} method")]
    #[diagnostic(code(E3002))]
    MarkerOnPartialOrExtern {
        modifier: &'static str,
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("containing type '{type_name}' must be partial")]
    #[diagnostic(code(E3003), help("add 'partial' to every enclosing type"))]
    ContainingTypeNotPartial {
        type_name: String,
        #[label("member declared here")]
        span: SourceSpan,
    },

    #[error("member is nested inside a type that declares defaulted parameters of its own")]
    #[diagnostic(code(E3004))]
    NestedInsideDefaultGenericType {
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("symbol was produced by the generator and cannot be processed again")]
    #[diagnostic(code(E3005))]
    AlreadyGenerated {
        #[label("generated marker present")]
        span: SourceSpan,
    },

    #[error("defaulted type parameters must be trailing")]
    #[diagnostic(
        code(E4001),
        help("every parameter following the first defaulted one needs a default of its own")
    )]
    DefaultParamNotTrailing {
        #[label("last defaulted parameter before the gap")]
        span: SourceSpan,
    },

    #[error("type '{ty}' cannot be used as a default: {reason}")]
    #[diagnostic(code(E4002))]
    InvalidDefaultType {
        ty: String,
        reason: &'static str,
        #[label("declared as default here")]
        span: SourceSpan,
    },

    #[error("default type '{ty}' is less accessible than '{member}'")]
    #[diagnostic(
        code(E4003),
        help("widen the type's accessibility or narrow the member's")
    )]
    DefaultTypeLessAccessible {
        ty: String,
        member: String,
        #[label("declared as default here")]
        span: SourceSpan,
    },

    #[error(
        "type '{ty}' cannot satisfy a constraint that names another type parameter"
    )]
    #[diagnostic(code(E4004))]
    ConstraintReferencesOtherParam {
        ty: String,
        #[label("declared as default here")]
        span: SourceSpan,
    },

    #[error("default type '{ty}' does not satisfy the '{constraint}' constraint")]
    #[diagnostic(code(E4005))]
    ConstraintNotSatisfied {
        ty: String,
        constraint: String,
        #[label("declared as default here")]
        span: SourceSpan,
    },

    #[error("member '{signature}' already exists in scope")]
    #[diagnostic(
        code(E5001),
        help("remove the conflicting member, or allow the 'new' modifier through configuration")
    )]
    GeneratedSignatureExists {
        signature: String,
        #[label("overload would be generated from here")]
        span: SourceSpan,
    },

    #[error("cannot override a generated method")]
    #[diagnostic(code(E5002))]
    OverrideOfGenerated {
        #[label("override declared here")]
        span: SourceSpan,
    },

    #[error(
        "default of '{param}' must match the base declaration: base declares '{base_ty}', found '{found_ty}'"
    )]
    #[diagnostic(code(E5003))]
    OverrideDefaultMismatch {
        param: String,
        base_ty: String,
        found_ty: String,
        #[label("diverging default")]
        span: SourceSpan,
    },

    #[error("parameter '{param}' adds a default its base declaration does not have")]
    #[diagnostic(code(E5004))]
    DefaultAddedInOverride {
        param: String,
        #[label("default added here")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum GenWarning {
    #[error("parameter '{param}' inherits a default from the base declaration")]
    #[diagnostic(
        code(W3001),
        severity(warning),
        help("restate the inherited default for readability")
    )]
    MarkerMissingOnOverride {
        param: String,
        #[label("inherits a default here")]
        span: SourceSpan,
    },

    #[error(
        "inherit convention cannot be applied to '{type_name}': the type is sealed or a value type"
    )]
    #[diagnostic(
        code(W3002),
        severity(warning),
        help("members will be copied instead")
    )]
    InheritConventionImpossible {
        type_name: String,
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("'{namespace}' is not a valid target namespace")]
    #[diagnostic(
        code(W3003),
        severity(warning),
        help("falling back to the member's own namespace")
    )]
    TargetNamespaceInvalid {
        namespace: String,
        #[label("configured here")]
        span: SourceSpan,
    },

    #[error("configuration attribute has no effect: no defaulted type parameters here")]
    #[diagnostic(code(W3004), severity(warning))]
    ConfigurationHasNoEffect {
        #[label("configured here")]
        span: SourceSpan,
    },
}
