//! Construction boundary of the pool.
//!
//! The pool never builds instances itself. On a miss that admission allows,
//! it calls [`Factory::create`] with the requested [`Key`]; the factory
//! interprets the identifier and parameters however it likes.
//!
//! Two implementations ship with the crate:
//!
//! - any `FnMut(&Key<I, P>) -> Result<T, ConstructionError>` closure;
//! - [`Registry`], an identifier → constructor table that can be edited at
//!   runtime (`register` / `unregister` / `registered_ids`).
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::factory::{Factory, Registry};
//! use poolkit::key::Key;
//!
//! let mut registry: Registry<&str, u32, String> = Registry::new();
//! assert!(registry.register("greeting", |params: &[u32]| {
//!     Ok(format!("hello x{}", params.len()))
//! }));
//! assert!(!registry.register("greeting", |_: &[u32]| Ok(String::new())));
//!
//! let made = registry.create(&Key::with_params("greeting", [1, 2])).unwrap();
//! assert_eq!(made, "hello x2");
//! assert!(registry.create(&Key::new("unknown")).is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConstructionError;
use crate::key::Key;

/// Builds instances for the pool.
pub trait Factory<I, P, T> {
    /// Constructs a fresh instance for `key`.
    fn create(&mut self, key: &Key<I, P>) -> Result<T, ConstructionError>;
}

impl<I, P, T, F> Factory<I, P, T> for F
where
    F: FnMut(&Key<I, P>) -> Result<T, ConstructionError>,
{
    fn create(&mut self, key: &Key<I, P>) -> Result<T, ConstructionError> {
        self(key)
    }
}

type Constructor<P, T> = Box<dyn Fn(&[P]) -> Result<T, ConstructionError> + Send>;

/// Identifier-indexed table of constructors.
pub struct Registry<I, P, T> {
    constructors: BTreeMap<I, Constructor<P, T>>,
}

impl<I: Ord, P, T> Registry<I, P, T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registers `ctor` under `id`.
    ///
    /// Returns `false` and keeps the existing constructor when `id` is
    /// already registered.
    pub fn register<F>(&mut self, id: I, ctor: F) -> bool
    where
        F: Fn(&[P]) -> Result<T, ConstructionError> + Send + 'static,
    {
        if self.constructors.contains_key(&id) {
            return false;
        }
        self.constructors.insert(id, Box::new(ctor));
        true
    }

    /// Removes the constructor for `id`. Returns `false` if none existed.
    pub fn unregister(&mut self, id: &I) -> bool {
        self.constructors.remove(id).is_some()
    }

    /// Registered identifiers in ascending order.
    pub fn registered_ids(&self) -> Vec<I>
    where
        I: Clone,
    {
        self.constructors.keys().cloned().collect()
    }

    /// Returns `true` if `id` has a constructor.
    pub fn is_registered(&self, id: &I) -> bool {
        self.constructors.contains_key(id)
    }
}

impl<I: Ord, P, T> Default for Registry<I, P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: fmt::Debug, P, T> fmt::Debug for Registry<I, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("ids", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<I: Ord + fmt::Debug, P, T> Factory<I, P, T> for Registry<I, P, T> {
    fn create(&mut self, key: &Key<I, P>) -> Result<T, ConstructionError> {
        let Some(id) = key.identifier() else {
            return Err(ConstructionError::new(
                "<default>",
                "the empty key names no constructor",
            ));
        };
        let ctor = self
            .constructors
            .get(id)
            .ok_or_else(|| ConstructionError::new(format!("{id:?}"), "identifier not registered"))?;
        ctor(key.params())
    }
}
