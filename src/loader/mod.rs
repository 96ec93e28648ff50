//! Module loading with dependency substitution.
//!
//! A [`ModuleLoader`] builds a module while overriding some of its named
//! dependencies. The binder factory resolves specifiers against its
//! [`CallerOrigin`] and lets a stub factory read the live registry before
//! delegating here.

mod resolve;
mod table;

use std::collections::BTreeMap;

use thiserror::Error;

pub use resolve::{CallerOrigin, ModuleId, ResolveError};
pub use table::{ModuleTable, ModuleTableError};

/// Replacement implementations keyed by dependency specifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Replacements<R> {
    entries: BTreeMap<String, R>,
}

impl<R> Default for Replacements<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R> Replacements<R> {
    /// Creates an empty replacement set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a replacement, builder style.
    #[must_use]
    pub fn with(mut self, dependency: impl Into<String>, replacement: R) -> Self {
        self.insert(dependency, replacement);
        self
    }

    /// Adds a replacement, returning any previous one for the dependency.
    pub fn insert(&mut self, dependency: impl Into<String>, replacement: R) -> Option<R> {
        self.entries.insert(dependency.into(), replacement)
    }

    /// Returns the replacement registered for `dependency`.
    #[must_use]
    pub fn get(&self, dependency: &str) -> Option<&R> {
        self.entries.get(dependency)
    }

    /// Removes and returns the replacement registered for `dependency`.
    pub fn take(&mut self, dependency: &str) -> Option<R> {
        self.entries.remove(dependency)
    }

    /// Lists replaced dependency specifiers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of replacements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is replaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R, K: Into<String>> FromIterator<(K, R)> for Replacements<R> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(dependency, replacement)| (dependency.into(), replacement))
                .collect(),
        }
    }
}

/// Loader that can substitute named dependencies of the module it loads.
pub trait ModuleLoader {
    /// Replacement implementation type accepted for dependencies.
    type Replacement;
    /// Loaded module type.
    type Module;
    /// Loader specific error type.
    type Error: std::error::Error + 'static;

    /// Loads the module identified by `id` with `replacements` applied.
    ///
    /// # Errors
    ///
    /// Returns the loader's own error when the module cannot be loaded.
    fn load(
        &self,
        id: &ModuleId,
        replacements: Replacements<Self::Replacement>,
    ) -> Result<Self::Module, Self::Error>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    type Replacement = L::Replacement;
    type Module = L::Module;
    type Error = L::Error;

    fn load(
        &self,
        id: &ModuleId,
        replacements: Replacements<Self::Replacement>,
    ) -> Result<Self::Module, Self::Error> {
        (**self).load(id, replacements)
    }
}

/// Errors raised by `load_with_stubs`.
#[derive(Debug, Error)]
pub enum LoadError<LoaderError>
where
    LoaderError: std::error::Error + 'static,
{
    /// Raised when the specifier cannot be resolved.
    #[error("module resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    /// Raised by the underlying loader.
    #[error("module load failed: {0}")]
    Loader(#[source] LoaderError),
}
