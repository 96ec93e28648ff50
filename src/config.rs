//! Binder configuration.

/// Controls when a synchronous case's registry state is released.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CleanupPolicy {
    /// Clear on every exit path: success, returned failure, or panic.
    #[default]
    Always,
    /// Clear only after a body completes successfully. A failing or panicking
    /// synchronous body leaves its fixture installed until the next case
    /// overwrites it.
    OnSuccess,
}

/// Options shared by every binder produced from one factory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BinderConfig {
    /// Cleanup behaviour for failing cases.
    pub cleanup: CleanupPolicy,
}

impl BinderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cleanup policy.
    #[must_use]
    pub const fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub(crate) fn clears_on_failure(&self) -> bool {
        self.cleanup == CleanupPolicy::Always
    }
}
