//! Per-case stub data for test suites.
//!
//! A test declares fixture values for a single case; stubbed dependencies read
//! those values through a shared registry while that case runs. The registry
//! is populated right before the wrapped body executes and cleared when the
//! body returns or signals completion.
//!
//! The crate also resolves module specifiers relative to the test file and
//! loads modules with replacement dependencies that observe the live registry.

pub mod binder;
pub mod config;
pub mod fixture;
pub mod loader;
pub mod registrar;
pub mod registry;
pub mod test_support;

pub use binder::{Binder, Body, Done, Using};
pub use config::{BinderConfig, CleanupPolicy};
pub use fixture::{Fixture, FixtureError};
pub use loader::{
    CallerOrigin, LoadError, ModuleId, ModuleLoader, ModuleTable, ModuleTableError, Replacements,
    ResolveError,
};
pub use registrar::{HostBody, HostDone, Registrar, TestFailure, TestResult};
pub use registry::{Registry, ScratchData, StubData};
