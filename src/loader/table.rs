//! In-process module table.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::{ModuleId, ModuleLoader, Replacements};

type Factory<M, R> = Box<dyn Fn(Replacements<R>) -> M>;

/// Loader backed by factories registered under module identifiers.
///
/// Every load invokes the factory again, so modules never share state unless
/// their factory does.
pub struct ModuleTable<M, R> {
    modules: BTreeMap<ModuleId, Factory<M, R>>,
}

impl<M, R> Default for ModuleTable<M, R> {
    fn default() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }
}

impl<M, R> ModuleTable<M, R> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`, replacing any previous definition.
    #[must_use]
    pub fn define(
        mut self,
        id: impl Into<ModuleId>,
        factory: impl Fn(Replacements<R>) -> M + 'static,
    ) -> Self {
        self.modules.insert(id.into(), Box::new(factory));
        self
    }

    /// Returns `true` when `id` is defined.
    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }
}

impl<M, R> fmt::Debug for ModuleTable<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleTable")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<M, R> ModuleLoader for ModuleTable<M, R> {
    type Replacement = R;
    type Module = M;
    type Error = ModuleTableError;

    fn load(&self, id: &ModuleId, replacements: Replacements<R>) -> Result<M, ModuleTableError> {
        let factory = self
            .modules
            .get(id)
            .ok_or_else(|| ModuleTableError::NotFound { id: id.clone() })?;
        let replaced: Vec<&str> = replacements.names().collect();
        debug!(module = %id, ?replaced, "loading module with replacements");
        Ok(factory(replacements))
    }
}

/// Errors raised by [`ModuleTable`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ModuleTableError {
    /// Raised when no module is defined under the identifier.
    #[error("cannot find module `{id}`")]
    NotFound {
        /// Identifier that was requested.
        id: ModuleId,
    },
}
