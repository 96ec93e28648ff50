//! Completion signal handed to asynchronous case bodies.

use std::fmt;

use tracing::{debug, warn};

use crate::registrar::{HostDone, TestFailure, TestResult};
use crate::registry::{Registry, ScratchData};

struct Pending {
    case: String,
    registry: Registry,
    host: HostDone,
    clear_on_unwind: bool,
}

/// Single-use completion signal for an asynchronous case.
///
/// Invoking it clears the registry and then reports to the host runner. The
/// scratch mapping bound at construction stays reachable through
/// [`Done::data`], so the signal can be passed into nested callbacks.
pub struct Done {
    data: ScratchData,
    pending: Option<Pending>,
}

impl Done {
    pub(crate) fn new(
        case: &str,
        registry: Registry,
        data: ScratchData,
        host: HostDone,
        clear_on_unwind: bool,
    ) -> Self {
        Self {
            data,
            pending: Some(Pending {
                case: case.to_owned(),
                registry,
                host,
                clear_on_unwind,
            }),
        }
    }

    /// Scratch mapping that was current when the signal was built.
    #[must_use]
    pub const fn data(&self) -> &ScratchData {
        &self.data
    }

    /// Reports success.
    pub fn complete(self) {
        self.finish(Ok(()));
    }

    /// Reports a failure.
    pub fn fail(self, failure: impl Into<TestFailure>) {
        self.finish(Err(failure.into()));
    }

    /// Clears the registry and forwards `result` to the host runner.
    pub fn finish(mut self, result: TestResult) {
        if let Some(pending) = self.pending.take() {
            pending.registry.clear();
            debug!(case = %pending.case, passed = result.is_ok(), "async case signalled completion");
            pending.host.finish(result);
        }
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if std::thread::panicking() && pending.clear_on_unwind {
            pending.registry.clear();
            return;
        }
        warn!(
            case = %pending.case,
            "completion signal dropped without being invoked; registry stays populated"
        );
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("data", &self.data)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
