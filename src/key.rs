//! Composite pool keys.
//!
//! A [`Key`] names a construction recipe: an identifier plus an ordered list
//! of construction parameters. The pool keeps one idle free-list per distinct
//! key, so two fetches share instances exactly when their keys compare equal.
//!
//! ## Arity
//!
//! ```text
//!   Key::default()                 arity = None     (the empty key)
//!   Key::new("conn")               arity = Some(0)
//!   Key::with_params("conn", [a])  arity = Some(1)
//!   Key::with_params("conn", [a,b])arity = Some(2)
//! ```
//!
//! ## Ordering
//!
//! Keys order lexicographically over `(arity, identifier, param[0], ...)`.
//! Each field is consulted only when every earlier field compared equal, so
//! the order is total and consistent with `Eq`. The empty key sorts before
//! every keyed value.
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::key::Key;
//!
//! let a: Key<&str, u16> = Key::with_params("db", [5432]);
//! let b: Key<&str, u16> = Key::with_params("db", [5433]);
//! assert!(a < b);
//! assert_eq!(a.arity(), Some(1));
//! assert_eq!(a.to_string(), "db(5432)");
//!
//! // Fewer parameters always sort first.
//! let bare: Key<&str, u16> = Key::new("zz");
//! assert!(bare < a);
//! ```

use std::cmp::Ordering;
use std::fmt;

/// Immutable composite key: identifier, construction parameters and arity.
///
/// `I` is the factory identifier type, `P` the parameter type. Heterogeneous
/// parameter lists are expressed with an enum for `P`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key<I, P = ()> {
    identifier: Option<I>,
    params: Vec<P>,
}

impl<I, P> Key<I, P> {
    /// Creates a key with an identifier and no parameters.
    #[inline]
    pub fn new(identifier: I) -> Self {
        Self {
            identifier: Some(identifier),
            params: Vec::new(),
        }
    }

    /// Creates a key with an identifier and positional parameters.
    pub fn with_params(identifier: I, params: impl IntoIterator<Item = P>) -> Self {
        Self {
            identifier: Some(identifier),
            params: params.into_iter().collect(),
        }
    }

    /// Returns the identifier, or `None` for the empty key.
    #[inline]
    pub fn identifier(&self) -> Option<&I> {
        self.identifier.as_ref()
    }

    /// Returns the significant parameters in positional order.
    #[inline]
    pub fn params(&self) -> &[P] {
        &self.params
    }

    /// Number of significant parameters, or `None` for the empty key.
    #[inline]
    pub fn arity(&self) -> Option<usize> {
        self.identifier.as_ref().map(|_| self.params.len())
    }

    /// Returns `true` for the empty (default) key.
    #[inline]
    pub fn is_empty_key(&self) -> bool {
        self.identifier.is_none()
    }
}

impl<I, P> Default for Key<I, P> {
    fn default() -> Self {
        Self {
            identifier: None,
            params: Vec::new(),
        }
    }
}

impl<I: Ord, P: Ord> Ord for Key<I, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arity()
            .cmp(&other.arity())
            .then_with(|| self.identifier.cmp(&other.identifier))
            .then_with(|| self.params.cmp(&other.params))
    }
}

impl<I: Ord, P: Ord> PartialOrd for Key<I, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: fmt::Display, P: fmt::Display> fmt::Display for Key<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = &self.identifier else {
            return f.write_str("<default>");
        };
        write!(f, "{id}")?;
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type K = Key<u32, i64>;

    #[test]
    fn default_key_has_no_arity() {
        let k = K::default();
        assert_eq!(k.arity(), None);
        assert!(k.is_empty_key());
        assert_eq!(k.identifier(), None);
        assert!(k.params().is_empty());
    }

    #[test]
    fn arity_counts_params() {
        assert_eq!(K::new(1).arity(), Some(0));
        assert_eq!(K::with_params(1, [1, 2, 3]).arity(), Some(3));
    }

    #[test]
    fn equality_requires_matching_arity() {
        assert_eq!(K::with_params(1, [7]), K::with_params(1, [7]));
        assert_ne!(K::new(1), K::with_params(1, [7]));
        assert_ne!(K::with_params(1, [7]), K::with_params(1, [8]));
        assert_ne!(K::with_params(1, [7]), K::with_params(2, [7]));
        assert_ne!(K::default(), K::new(0));
    }

    #[test]
    fn lower_arity_sorts_first() {
        assert!(K::default() < K::new(0));
        assert!(K::new(99) < K::with_params(0, [0]));
        assert!(K::with_params(99, [99]) < K::with_params(0, [0, 0]));
    }

    #[test]
    fn ordering_only_consults_later_fields_on_ties() {
        // id 1 < id 2 decides, even though param 5 > param 3.
        let a = K::with_params(1, [5]);
        let b = K::with_params(2, [3]);
        assert!(a < b);
        assert!(!(b < a));
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
    }

    #[test]
    fn params_compare_positionally() {
        assert!(K::with_params(1, [1, 9]) < K::with_params(1, [2, 0]));
        assert!(K::with_params(1, [1, 2]) < K::with_params(1, [1, 3]));
    }

    #[test]
    fn display_renders_identifier_and_params() {
        assert_eq!(Key::<&str, u8>::new("conn").to_string(), "conn");
        assert_eq!(
            Key::<&str, u8>::with_params("conn", [1, 2]).to_string(),
            "conn(1, 2)"
        );
        assert_eq!(Key::<&str, u8>::default().to_string(), "<default>");
    }
}
