// src/config.rs
//! Generation configuration.
//!
//! Configuration is plain data parsed from attributes: a member-level
//! attribute, a scoped variant on containing types, and an assembly-level
//! default supplied by the host. Resolution layers them innermost-wins:
//! assembly, then containing types outermost to innermost, then the member.

use crate::markers;
use crate::sema::{Compilation, TypeDefId};
use crate::syntax::ast::{AttrUse, AttrValue};
use crate::syntax::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodConvention {
    /// Generated overloads forward to the original method.
    #[default]
    Call,
    /// Generated overloads duplicate the original body.
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeConvention {
    /// Generated types inherit from the closed generic form.
    #[default]
    Inherit,
    /// Generated types duplicate the original's members.
    Copy,
}

#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Resolve collisions against inherited members with `new`.
    pub apply_new: bool,
    pub method_convention: MethodConvention,
    pub type_convention: TypeConvention,
    /// Namespace override for generated top-level declarations.
    pub target_namespace: Option<String>,
    /// Permit an override to declare a different default than its base.
    pub allow_override_divergence: bool,
    /// Permit an override to default a parameter its base leaves plain.
    pub allow_new_defaults_in_override: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            apply_new: true,
            method_convention: MethodConvention::default(),
            type_convention: TypeConvention::default(),
            target_namespace: None,
            allow_override_divergence: false,
            allow_new_defaults_in_override: false,
        }
    }
}

/// Member-resolved configuration plus the span of the member's own
/// configuration attribute (used for configuration-without-effect findings).
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: GenConfig,
    pub member_attr_span: Option<Span>,
}

/// Layer scoped configuration from the containing chain, then the member's
/// own attribute, over the assembly defaults.
pub fn resolve_config(
    compilation: &Compilation,
    member_attrs: &[AttrUse],
    containing: Option<TypeDefId>,
    assembly: &GenConfig,
) -> ResolvedConfig {
    let mut config = assembly.clone();

    let mut chain = compilation.containing_chain(containing);
    chain.reverse();
    for def in chain {
        let Some(node) = compilation.registry.get_type(def).node else {
            continue;
        };
        let Some(decl) = compilation.type_decl(node) else {
            continue;
        };
        if let Some(attr) = decl
            .attributes
            .iter()
            .find(|a| markers::is_scoped_configuration(&compilation.interner, a))
        {
            apply_overlay(&mut config, attr, compilation);
        }
    }

    let member_attr = member_attrs
        .iter()
        .find(|a| markers::is_configuration(&compilation.interner, a));
    if let Some(attr) = member_attr {
        apply_overlay(&mut config, attr, compilation);
    }

    ResolvedConfig {
        config,
        member_attr_span: member_attr.map(|a| a.span),
    }
}

fn apply_overlay(config: &mut GenConfig, attr: &AttrUse, compilation: &Compilation) {
    for arg in &attr.args {
        let Some(name) = arg.name else {
            continue;
        };
        match compilation.interner.resolve(name) {
            "ApplyNewModifierWhenPossible" => {
                if let AttrValue::Bool(value) = arg.value {
                    config.apply_new = value;
                }
            }
            "MethodConvention" => {
                if let Some(member) = enum_member(&arg.value, compilation) {
                    match member {
                        "Call" => config.method_convention = MethodConvention::Call,
                        "Copy" => config.method_convention = MethodConvention::Copy,
                        _ => {}
                    }
                }
            }
            "TypeConvention" => {
                if let Some(member) = enum_member(&arg.value, compilation) {
                    match member {
                        "Inherit" => config.type_convention = TypeConvention::Inherit,
                        "Copy" => config.type_convention = TypeConvention::Copy,
                        _ => {}
                    }
                }
            }
            "TargetNamespace" => {
                if let AttrValue::Str(value) = &arg.value {
                    config.target_namespace = Some(value.clone());
                }
            }
            "AllowOverrideDivergence" => {
                if let AttrValue::Bool(value) = arg.value {
                    config.allow_override_divergence = value;
                }
            }
            "AllowNewDefaultsInOverride" => {
                if let AttrValue::Bool(value) = arg.value {
                    config.allow_new_defaults_in_override = value;
                }
            }
            _ => {}
        }
    }
}

fn enum_member<'a>(value: &'a AttrValue, compilation: &'a Compilation) -> Option<&'a str> {
    match value {
        AttrValue::EnumMember(sym) => {
            let text = compilation.interner.resolve(*sym);
            Some(text.rsplit('.').next().unwrap_or(text))
        }
        AttrValue::Str(text) => Some(text.rsplit('.').next().unwrap_or(text)),
        _ => None,
    }
}

/// A usable target namespace: dotted identifier segments, and never the
/// generator's reserved namespace.
pub fn is_valid_target_namespace(namespace: &str) -> bool {
    if namespace == markers::RESERVED_NAMESPACE {
        return false;
    }
    !namespace.is_empty()
        && namespace.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() || first == '_' => {
                    chars.all(|c| c.is_alphanumeric() || c == '_')
                }
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_documented_policy() {
        let config = GenConfig::default();
        assert!(config.apply_new);
        assert_eq!(config.method_convention, MethodConvention::Call);
        assert_eq!(config.type_convention, TypeConvention::Inherit);
        assert!(!config.allow_override_divergence);
    }

    #[test]
    fn reserved_and_malformed_namespaces_are_rejected() {
        assert!(is_valid_target_namespace("App.Generated"));
        assert!(is_valid_target_namespace("_internal.v2"));
        assert!(!is_valid_target_namespace(markers::RESERVED_NAMESPACE));
        assert!(!is_valid_target_namespace(""));
        assert!(!is_valid_target_namespace("123.Abc"));
        assert!(!is_valid_target_namespace("A..B"));
        assert!(!is_valid_target_namespace("A.B-C"));
    }
}
