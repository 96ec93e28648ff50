//! Caller-relative module specifier resolution.

use std::env;
use std::fmt;
use std::panic::Location;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::warn;

/// Fully resolved module identifier.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModuleId(String);

impl ModuleId {
    /// Wraps an already-resolved identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Errors raised while resolving a specifier.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResolveError {
    /// Raised for an empty specifier.
    #[error("module specifier must not be empty")]
    Empty,
    /// Raised when `..` segments climb above the filesystem root.
    #[error("module specifier `{specifier}` escapes the root of {origin}")]
    EscapesRoot {
        /// Specifier as supplied.
        specifier: String,
        /// Origin file the specifier was resolved against.
        origin: String,
    },
}

/// Source location that relative specifiers resolve against.
///
/// Captured from the call site that created the binder factory so test files
/// can use paths relative to themselves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallerOrigin {
    file: Utf8PathBuf,
}

impl CallerOrigin {
    /// Captures the source file of the calling function.
    ///
    /// The compiler records paths relative to the directory cargo builds
    /// from, so relative paths are anchored on the current directory and
    /// identifiers resolved from a captured origin are absolute.
    #[track_caller]
    #[must_use]
    pub fn capture() -> Self {
        Self::from_file(absolutise(Location::caller().file()))
    }

    /// Uses `file` as the origin verbatim.
    ///
    /// A relative `file` yields relative identifiers for relative specifiers.
    #[must_use]
    pub fn from_file(file: impl Into<Utf8PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// Origin source file.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Resolves `specifier` to a module identifier.
    ///
    /// Specifiers starting with `./` or `../` are joined to the origin's
    /// directory. Absolute paths are normalised as-is. Anything else is a bare
    /// identifier and is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Empty`] for an empty specifier and
    /// [`ResolveError::EscapesRoot`] when `..` segments climb above the root
    /// of the joined path.
    pub fn resolve(&self, specifier: &str) -> Result<ModuleId, ResolveError> {
        if specifier.is_empty() {
            return Err(ResolveError::Empty);
        }
        let path = Utf8Path::new(specifier);
        if is_relative_specifier(specifier) {
            let base = self.file.parent().unwrap_or_else(|| Utf8Path::new(""));
            return self.normalise(specifier, &base.join(path));
        }
        if path.is_absolute() {
            return self.normalise(specifier, path);
        }
        Ok(ModuleId::new(specifier))
    }

    fn normalise(&self, specifier: &str, path: &Utf8Path) -> Result<ModuleId, ResolveError> {
        let mut prefix = String::new();
        let mut parts: Vec<&str> = Vec::new();
        for component in path.components() {
            match component {
                Utf8Component::Prefix(value) => prefix.push_str(value.as_str()),
                Utf8Component::RootDir => prefix.push('/'),
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(ResolveError::EscapesRoot {
                            specifier: specifier.to_owned(),
                            origin: self.file.to_string(),
                        });
                    }
                }
                Utf8Component::Normal(part) => parts.push(part),
            }
        }
        Ok(ModuleId::new(format!("{prefix}{}", parts.join("/"))))
    }
}

fn absolutise(file: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(file);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir().map(Utf8PathBuf::from_path_buf) {
        Ok(Ok(dir)) => dir.join(path),
        Ok(Err(dir)) => {
            warn!(dir = %dir.display(), "current directory is not UTF-8; origin stays relative");
            path.to_path_buf()
        }
        Err(err) => {
            warn!(error = %err, "cannot read current directory; origin stays relative");
            path.to_path_buf()
        }
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    matches!(specifier, "." | "..")
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with(".\\")
        || specifier.starts_with("..\\")
}
