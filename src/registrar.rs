//! Host test-registration capability.
//!
//! A [`Registrar`] is whatever actually records and runs test cases. The
//! binder wraps user bodies and hands the wrapped [`HostBody`] to it.

use std::fmt;

use thiserror::Error;

/// Outcome reported by a test body.
pub type TestResult = Result<(), TestFailure>;

/// Failure reported by a test body and forwarded untouched to the host.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct TestFailure {
    message: String,
}

impl TestFailure {
    /// Creates a failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Builds a failure from any error, keeping its display text.
    #[must_use]
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for TestFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TestFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<crate::fixture::FixtureError> for TestFailure {
    fn from(err: crate::fixture::FixtureError) -> Self {
        Self::from_error(&err)
    }
}

/// Single-use completion callback supplied by the host for async cases.
pub struct HostDone(Box<dyn FnOnce(TestResult)>);

impl HostDone {
    /// Wraps the host's completion callback.
    pub fn new(callback: impl FnOnce(TestResult) + 'static) -> Self {
        Self(Box::new(callback))
    }

    /// Reports the case outcome to the host.
    pub fn finish(self, result: TestResult) {
        (self.0)(result);
    }
}

impl fmt::Debug for HostDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostDone")
    }
}

/// Body handed to the host runner.
pub enum HostBody {
    /// Completes when the closure returns.
    Sync(Box<dyn Fn() -> TestResult>),
    /// Completes when the supplied [`HostDone`] is invoked.
    Async(Box<dyn Fn(HostDone)>),
}

impl HostBody {
    /// Returns `true` for bodies that report completion through [`HostDone`].
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for HostBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("HostBody::Sync"),
            Self::Async(_) => f.write_str("HostBody::Async"),
        }
    }
}

/// Case-registration interface of the host test runner.
pub trait Registrar {
    /// Registers a regular case.
    fn it(&self, name: &str, body: HostBody);

    /// Registers a case that takes part in the host's exclusive selection.
    fn only(&self, name: &str, body: HostBody);

    /// Registers a skipped case. Skipped cases carry no body.
    fn skip(&self, name: &str);
}

impl<R: Registrar + ?Sized> Registrar for &R {
    fn it(&self, name: &str, body: HostBody) {
        (**self).it(name, body);
    }

    fn only(&self, name: &str, body: HostBody) {
        (**self).only(name, body);
    }

    fn skip(&self, name: &str) {
        (**self).skip(name);
    }
}

impl<R: Registrar + ?Sized> Registrar for std::rc::Rc<R> {
    fn it(&self, name: &str, body: HostBody) {
        (**self).it(name, body);
    }

    fn only(&self, name: &str, body: HostBody) {
        (**self).only(name, body);
    }

    fn skip(&self, name: &str) {
        (**self).skip(name);
    }
}
