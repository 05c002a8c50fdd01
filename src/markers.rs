// src/markers.rs
//! Names of the attributes the generator recognizes.
//!
//! The attribute source text itself ships with the host integration; the
//! analysis core only needs to recognize usages by name, with or without
//! the conventional `Attribute` suffix.

use crate::syntax::ast::{AttrUse, Symbol};
use crate::syntax::Interner;

/// Marker placed on a generic type parameter to declare its default type.
pub const DEFAULT_PARAM_ATTRIBUTE: &str = "DefaultParam";

/// Per-member generation configuration.
pub const CONFIGURATION_ATTRIBUTE: &str = "DefaultParamConfiguration";

/// Type- or assembly-scoped configuration inherited by nested members.
pub const SCOPED_CONFIGURATION_ATTRIBUTE: &str = "DefaultParamScopedConfiguration";

/// Stamped on every generated declaration; its presence on user code marks
/// the symbol as off-limits for re-processing.
pub const GENERATED_ATTRIBUTE: &str = "DefgenGenerated";

/// Namespace reserved for generator-owned declarations. Never a valid
/// target-namespace override.
pub const RESERVED_NAMESPACE: &str = "Defgen.Generated";

fn matches_name(interner: &Interner, sym: Symbol, name: &str) -> bool {
    let text = interner.resolve(sym);
    text == name
        || text
            .strip_suffix("Attribute")
            .is_some_and(|stripped| stripped == name)
}

pub fn is_default_param(interner: &Interner, attr: &AttrUse) -> bool {
    matches_name(interner, attr.name, DEFAULT_PARAM_ATTRIBUTE)
}

pub fn is_configuration(interner: &Interner, attr: &AttrUse) -> bool {
    matches_name(interner, attr.name, CONFIGURATION_ATTRIBUTE)
}

pub fn is_scoped_configuration(interner: &Interner, attr: &AttrUse) -> bool {
    matches_name(interner, attr.name, SCOPED_CONFIGURATION_ATTRIBUTE)
}

pub fn is_generated(interner: &Interner, attr: &AttrUse) -> bool {
    matches_name(interner, attr.name, GENERATED_ATTRIBUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxFactory;

    #[test]
    fn attribute_suffix_is_recognized() {
        let mut f = SyntaxFactory::new();
        let bare = f.attr("DefaultParam", Vec::new());
        let suffixed = f.attr("DefaultParamAttribute", Vec::new());
        let other = f.attr("DefaultParamX", Vec::new());

        assert!(is_default_param(&f.interner, &bare));
        assert!(is_default_param(&f.interner, &suffixed));
        assert!(!is_default_param(&f.interner, &other));
    }
}
