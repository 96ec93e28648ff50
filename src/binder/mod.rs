//! Test binder: wraps case bodies so each case sees its own fixture.
//!
//! [`Using`] is the binder factory. It owns the registry and the host
//! registrar, and produces one [`Binder`] per fixture. Every case registered
//! through a binder is wrapped so that:
//!
//! 1. the registry is populated with the binder's fixture,
//! 2. the user body runs,
//! 3. the registry is cleared when the body returns (synchronous bodies) or
//!    when its [`Done`] signal is invoked (asynchronous bodies).
//!
//! Skipped cases are passed to the host without any wrapping.

mod done;

use std::fmt;
use std::rc::Rc;

use tracing::debug;

pub use done::Done;

use crate::config::BinderConfig;
use crate::fixture::Fixture;
use crate::loader::{CallerOrigin, LoadError, ModuleLoader, Replacements};
use crate::registrar::{HostBody, HostDone, Registrar, TestResult};
use crate::registry::{Registry, ScratchData, StubData};

/// User-supplied case body.
///
/// The variant decides when the registry is cleared.
pub enum Body {
    /// Receives the scratch mapping; completes on return.
    Sync(Box<dyn Fn(&ScratchData) -> TestResult>),
    /// Receives a [`Done`] signal; completes when the signal is invoked.
    Async(Box<dyn Fn(Done)>),
}

impl Body {
    /// Wraps a body that completes when it returns.
    #[must_use]
    pub fn sync(body: impl Fn(&ScratchData) -> TestResult + 'static) -> Self {
        Self::Sync(Box::new(body))
    }

    /// Wraps a body that completes through its [`Done`] signal.
    #[must_use]
    pub fn with_done(body: impl Fn(Done) + 'static) -> Self {
        Self::Async(Box::new(body))
    }

    /// Returns `true` for bodies that take a completion signal.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Body::Sync"),
            Self::Async(_) => f.write_str("Body::Async"),
        }
    }
}

/// Binder factory bound to one host registrar and one registry.
pub struct Using<R> {
    registrar: Rc<R>,
    registry: Registry,
    origin: CallerOrigin,
    config: BinderConfig,
}

impl<R: Registrar> Using<R> {
    /// Creates a factory over `registrar`.
    ///
    /// The calling source file becomes the origin for relative specifiers
    /// passed to [`Using::load_with_stubs`].
    #[track_caller]
    pub fn new(registrar: R) -> Self {
        Self {
            registrar: Rc::new(registrar),
            registry: Registry::new(),
            origin: CallerOrigin::capture(),
            config: BinderConfig::default(),
        }
    }

    /// Replaces the resolution origin.
    #[must_use]
    pub fn with_origin(mut self, origin: CallerOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Replaces the binder configuration.
    #[must_use]
    pub fn config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a binder that installs `fixture` around each of its cases.
    #[must_use]
    pub fn with(&self, fixture: Fixture) -> Binder<R> {
        Binder {
            registrar: Rc::clone(&self.registrar),
            registry: self.registry.clone(),
            origin: self.origin.clone(),
            config: self.config.clone(),
            fixture: Rc::new(fixture),
        }
    }

    /// Live read-only view of the registry for hand-built stubs.
    #[must_use]
    pub fn stub_data(&self) -> StubData {
        self.registry.reader()
    }

    /// Resolution origin used for relative specifiers.
    #[must_use]
    pub const fn origin(&self) -> &CallerOrigin {
        &self.origin
    }

    /// Host registrar this factory registers cases with.
    #[must_use]
    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    /// Loads a module with stubbed dependencies.
    ///
    /// `specifier` is resolved against the factory's origin. `stubs` receives
    /// the live registry view, so replacements built here read whichever
    /// fixture is installed when they are eventually called.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Resolve`] when the specifier cannot be resolved
    /// and [`LoadError::Loader`] when the loader fails.
    pub fn load_with_stubs<L, F>(
        &self,
        loader: &L,
        specifier: &str,
        stubs: F,
    ) -> Result<L::Module, LoadError<L::Error>>
    where
        L: ModuleLoader,
        F: FnOnce(&StubData) -> Replacements<L::Replacement>,
    {
        load_with_stubs(&self.origin, &self.registry, loader, specifier, stubs)
    }
}

impl<R> fmt::Debug for Using<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Using")
            .field("origin", &self.origin)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Per-fixture binder exposing `it`, `it_only` and `it_skip`.
pub struct Binder<R> {
    registrar: Rc<R>,
    registry: Registry,
    origin: CallerOrigin,
    config: BinderConfig,
    fixture: Rc<Fixture>,
}

impl<R: Registrar> Binder<R> {
    /// Registers a regular case.
    pub fn it(&self, name: &str, body: Body) {
        debug!(case = name, async_body = body.is_async(), "registering case");
        self.registrar.it(name, self.wrap(name, body));
    }

    /// Registers a case through the host's exclusive `only` selection.
    pub fn it_only(&self, name: &str, body: Body) {
        debug!(case = name, async_body = body.is_async(), "registering exclusive case");
        self.registrar.only(name, self.wrap(name, body));
    }

    /// Registers a skipped case. The body is discarded unwrapped.
    pub fn it_skip(&self, name: &str, body: Body) {
        debug!(case = name, async_body = body.is_async(), "registering skipped case");
        drop(body);
        self.registrar.skip(name);
    }

    /// Fixture installed around this binder's cases.
    #[must_use]
    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    /// Loads a module with stubbed dependencies. See
    /// [`Using::load_with_stubs`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] on resolution or loader failure.
    pub fn load_with_stubs<L, F>(
        &self,
        loader: &L,
        specifier: &str,
        stubs: F,
    ) -> Result<L::Module, LoadError<L::Error>>
    where
        L: ModuleLoader,
        F: FnOnce(&StubData) -> Replacements<L::Replacement>,
    {
        load_with_stubs(&self.origin, &self.registry, loader, specifier, stubs)
    }

    fn wrap(&self, name: &str, body: Body) -> HostBody {
        let registry = self.registry.clone();
        let fixture = Rc::clone(&self.fixture);
        let clears_on_failure = self.config.clears_on_failure();
        match body {
            Body::Sync(run) => HostBody::Sync(Box::new(move || {
                let data = registry.populate(&fixture);
                let guard = ClearGuard::new(registry.clone(), clears_on_failure);
                let result = run(&data);
                guard.settle(result.is_ok());
                result
            })),
            Body::Async(run) => {
                let case = name.to_owned();
                HostBody::Async(Box::new(move |host: HostDone| {
                    let data = registry.populate(&fixture);
                    run(Done::new(
                        &case,
                        registry.clone(),
                        data,
                        host,
                        clears_on_failure,
                    ));
                }))
            }
        }
    }
}

impl<R> fmt::Debug for Binder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("fixture", &self.fixture)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Clears the registry when dropped while armed.
struct ClearGuard {
    registry: Registry,
    armed: bool,
}

impl ClearGuard {
    const fn new(registry: Registry, armed: bool) -> Self {
        Self { registry, armed }
    }

    fn settle(mut self, succeeded: bool) {
        self.armed |= succeeded;
    }
}

impl Drop for ClearGuard {
    fn drop(&mut self) {
        if self.armed {
            self.registry.clear();
        }
    }
}

fn load_with_stubs<L, F>(
    origin: &CallerOrigin,
    registry: &Registry,
    loader: &L,
    specifier: &str,
    stubs: F,
) -> Result<L::Module, LoadError<L::Error>>
where
    L: ModuleLoader,
    F: FnOnce(&StubData) -> Replacements<L::Replacement>,
{
    let id = origin.resolve(specifier)?;
    debug!(specifier, module = %id, origin = %origin.file(), "resolved module specifier");
    let replacements = stubs(&registry.reader());
    loader.load(&id, replacements).map_err(LoadError::Loader)
}
