// src/sema/generic.rs
//
// Per-declaration type-parameter model.
// This is what analysis and generation reason over: for each declared type
// parameter, whether the default marker is present and what concrete type
// it resolved to. Built once per declaration from syntax + semantic model;
// immutable afterwards.

use rustc_hash::FxHashMap;

use crate::sema::types::{Type, TypeConstraint};
use crate::syntax::ast::Symbol;
use crate::syntax::Span;

/// Facts about one declared type parameter.
#[derive(Debug, Clone)]
pub struct TypeParamData {
    pub name: Symbol,
    pub span: Span,
    /// Span of the default marker attribute, when present.
    pub marker_span: Option<Span>,
    /// Span of the marker's `typeof` argument, when present.
    pub marker_arg_span: Option<Span>,
    /// Resolved default type. `Some(Type::Error)` records a marker whose
    /// argument failed to bind; `None` records a marker with no argument.
    pub default_ty: Option<Type>,
    pub constraints: Vec<TypeConstraint>,
}

impl TypeParamData {
    pub fn plain(name: Symbol, span: Span) -> Self {
        Self {
            name,
            span,
            marker_span: None,
            marker_arg_span: None,
            default_ty: None,
            constraints: Vec::new(),
        }
    }

    pub fn has_marker(&self) -> bool {
        self.marker_span.is_some()
    }

    /// Marker present and the default resolved to a real type.
    pub fn is_default_applying(&self) -> bool {
        self.marker_span.is_some()
            && self
                .default_ty
                .as_ref()
                .is_some_and(|ty| !ty.is_error())
    }

    /// Span diagnostics should anchor at: the marker argument if present,
    /// then the marker itself, then the parameter identifier.
    pub fn blame_span(&self) -> Span {
        self.marker_arg_span
            .or(self.marker_span)
            .unwrap_or(self.span)
    }
}

/// Ordered type-parameter list of one declaration.
#[derive(Debug, Clone, Default)]
pub struct TypeParamContainer {
    params: Vec<TypeParamData>,
}

impl TypeParamContainer {
    pub fn new(params: Vec<TypeParamData>) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypeParamData> {
        self.params.get(index)
    }

    pub fn params(&self) -> &[TypeParamData] {
        &self.params
    }

    /// Index of the first parameter carrying the marker. Everything from
    /// here to the end is expected to be default-applying; the analyzer
    /// reports violations.
    pub fn first_marked_index(&self) -> Option<usize> {
        self.params.iter().position(TypeParamData::has_marker)
    }

    pub fn has_defaults(&self) -> bool {
        self.first_marked_index().is_some()
    }

    /// Count of parameters from the first marked index to the end.
    pub fn num_defaults(&self) -> usize {
        match self.first_marked_index() {
            Some(first) => self.params.len() - first,
            None => 0,
        }
    }

    pub fn num_plain(&self) -> usize {
        self.params.len() - self.num_defaults()
    }

    /// Reconcile an override's list with its base's. Both sides must have
    /// equal length; positions the override marks explicitly win, positions
    /// only the base marks inherit the base's default. Names, spans and
    /// constraints always come from the override side.
    pub fn combine(&self, base: &TypeParamContainer) -> TypeParamContainer {
        debug_assert_eq!(self.len(), base.len());
        let params = self
            .params
            .iter()
            .zip(base.params.iter())
            .map(|(ours, theirs)| {
                if ours.has_marker() || !theirs.has_marker() {
                    ours.clone()
                } else {
                    TypeParamData {
                        marker_span: theirs.marker_span,
                        marker_arg_span: theirs.marker_arg_span,
                        default_ty: theirs.default_ty.clone(),
                        ..ours.clone()
                    }
                }
            })
            .collect();
        TypeParamContainer::new(params)
    }

    /// Structural equivalence: same marker-ness and same resolved default
    /// at every position.
    pub fn equivalent(&self, other: &TypeParamContainer) -> bool {
        self.len() == other.len()
            && self.params.iter().zip(other.params.iter()).all(|(a, b)| {
                a.has_marker() == b.has_marker() && a.default_ty == b.default_ty
            })
    }

    /// Substitution map for stripping the trailing `strip` parameters.
    pub fn substitution(&self, strip: usize) -> FxHashMap<Symbol, Type> {
        let mut map = FxHashMap::default();
        let len = self.params.len();
        for param in &self.params[len - strip..] {
            if let Some(ty) = &param.default_ty {
                if !ty.is_error() {
                    map.insert(param.name, ty.clone());
                }
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::registry::TypeDefId;

    fn plain(n: u32) -> TypeParamData {
        TypeParamData::plain(Symbol(n), Span::dummy())
    }

    fn marked(n: u32, def: u32) -> TypeParamData {
        TypeParamData {
            marker_span: Some(Span::dummy()),
            default_ty: Some(Type::def(TypeDefId(def))),
            ..plain(n)
        }
    }

    #[test]
    fn empty_container_has_no_defaults() {
        let c = TypeParamContainer::default();
        assert_eq!(c.first_marked_index(), None);
        assert!(!c.has_defaults());
        assert_eq!(c.num_defaults(), 0);
    }

    #[test]
    fn first_index_and_counts_agree() {
        let c = TypeParamContainer::new(vec![plain(0), marked(1, 9), marked(2, 9)]);
        assert_eq!(c.first_marked_index(), Some(1));
        assert!(c.has_defaults());
        assert_eq!(c.num_defaults(), 2);
        assert_eq!(c.num_plain(), 1);
    }

    #[test]
    fn no_marker_means_all_counts_zero() {
        let c = TypeParamContainer::new(vec![plain(0), plain(1)]);
        assert_eq!(c.first_marked_index(), None);
        assert_eq!(c.num_defaults(), 0);
        assert_eq!(c.num_plain(), 2);
    }

    #[test]
    fn ordering_gap_still_counts_from_first_marked() {
        // plain parameter after a marked one: the analyzer reports this,
        // but the derived counts still measure from the first marked index.
        let c = TypeParamContainer::new(vec![marked(0, 9), plain(1)]);
        assert_eq!(c.first_marked_index(), Some(0));
        assert_eq!(c.num_defaults(), 2);
    }

    #[test]
    fn combine_prefers_explicit_override_marks() {
        let base = TypeParamContainer::new(vec![marked(0, 1), marked(1, 2)]);
        let derived = TypeParamContainer::new(vec![plain(10), marked(11, 5)]);

        let combined = derived.combine(&base);
        // Position 0 inherits the base default, keeps the override's name.
        assert_eq!(combined.get(0).unwrap().name, Symbol(10));
        assert_eq!(
            combined.get(0).unwrap().default_ty,
            Some(Type::def(TypeDefId(1)))
        );
        // Position 1 keeps the override's explicit default.
        assert_eq!(
            combined.get(1).unwrap().default_ty,
            Some(Type::def(TypeDefId(5)))
        );
    }

    #[test]
    fn equivalence_is_positionwise() {
        let a = TypeParamContainer::new(vec![plain(0), marked(1, 2)]);
        let b = TypeParamContainer::new(vec![plain(5), marked(6, 2)]);
        let c = TypeParamContainer::new(vec![plain(5), marked(6, 3)]);
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&c));
    }

    #[test]
    fn substitution_covers_stripped_tail_only() {
        let c = TypeParamContainer::new(vec![plain(0), marked(1, 2), marked(2, 3)]);
        let map = c.substitution(1);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&Symbol(2)));

        let map = c.substitution(2);
        assert_eq!(map.len(), 2);
    }
}
