//! Test support utilities shared across unit and integration tests.
//!
//! [`RecordingRegistrar`] is a minimal host runner: it records registrations
//! and runs them one at a time, which is the serialisation the binder relies
//! on. [`TickQueue`] stands in for an event loop's deferred callbacks so stubs
//! can complete asynchronously.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::registrar::{HostBody, HostDone, Registrar, TestFailure, TestResult};

type Task = Box<dyn FnOnce()>;

/// FIFO queue of deferred callbacks.
#[derive(Clone, Default)]
pub struct TickQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TickQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run on a later tick.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Runs queued tasks, including ones they schedule, until none remain.
    /// Returns the number of tasks executed.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return executed;
            };
            task();
            executed += 1;
        }
    }

    fn discard(&self) {
        let dropped: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        drop(dropped);
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// How a case was registered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Registered through `it`.
    Normal,
    /// Registered through `only`.
    Only,
    /// Registered through `skip`.
    Skip,
}

/// Result of running one case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CaseOutcome {
    /// The body reported success.
    Passed,
    /// The body reported a failure.
    Failed(TestFailure),
    /// The body or one of its deferred callbacks panicked.
    Panicked(String),
    /// An async body never invoked its completion signal.
    Pending,
    /// The case was registered as skipped.
    Skipped,
}

/// Name and outcome of one case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseReport {
    /// Case name as registered.
    pub name: String,
    /// Outcome of the run.
    pub outcome: CaseOutcome,
}

struct RegisteredCase {
    name: String,
    selection: Selection,
    body: Option<Rc<HostBody>>,
}

/// Registrar that records cases and runs them serially on demand.
#[derive(Clone, Default)]
pub struct RecordingRegistrar {
    cases: Rc<RefCell<Vec<RegisteredCase>>>,
    ticks: TickQueue,
}

impl RecordingRegistrar {
    /// Creates a registrar with its own tick queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registrar that drains `ticks` after each async case.
    #[must_use]
    pub fn with_ticks(ticks: TickQueue) -> Self {
        Self {
            cases: Rc::default(),
            ticks,
        }
    }

    /// Tick queue drained while async cases run.
    #[must_use]
    pub const fn ticks(&self) -> &TickQueue {
        &self.ticks
    }

    /// Returns every registration in order.
    #[must_use]
    pub fn registered(&self) -> Vec<(String, Selection)> {
        self.cases
            .borrow()
            .iter()
            .map(|case| (case.name.clone(), case.selection))
            .collect()
    }

    /// Runs the recorded cases in registration order.
    ///
    /// When any case was registered through `only`, regular cases are left
    /// out. Skipped cases are always reported as [`CaseOutcome::Skipped`].
    #[must_use]
    pub fn run(&self) -> Vec<CaseReport> {
        let planned: Vec<(String, Selection, Option<Rc<HostBody>>)> = self
            .cases
            .borrow()
            .iter()
            .map(|case| (case.name.clone(), case.selection, case.body.clone()))
            .collect();
        let exclusive = planned
            .iter()
            .any(|(_, selection, _)| *selection == Selection::Only);

        let mut reports = Vec::new();
        for (name, selection, body) in planned {
            let outcome = match (selection, body) {
                (Selection::Skip, _) | (_, None) => CaseOutcome::Skipped,
                (Selection::Normal, Some(_)) if exclusive => continue,
                (_, Some(host_body)) => self.run_case(&host_body),
            };
            reports.push(CaseReport { name, outcome });
        }
        reports
    }

    fn run_case(&self, body: &HostBody) -> CaseOutcome {
        match body {
            HostBody::Sync(run) => match catch_unwind(AssertUnwindSafe(|| run())) {
                Ok(result) => outcome_of(result),
                Err(payload) => CaseOutcome::Panicked(panic_message(payload.as_ref())),
            },
            HostBody::Async(run) => {
                let slot: Rc<RefCell<Option<TestResult>>> = Rc::default();
                let reported = Rc::clone(&slot);
                let done = HostDone::new(move |result| {
                    let mut outcome = reported.borrow_mut();
                    if outcome.is_none() {
                        *outcome = Some(result);
                    }
                });
                let ran = catch_unwind(AssertUnwindSafe(|| {
                    run(done);
                    self.ticks.run_until_idle();
                }));
                if let Err(payload) = ran {
                    self.ticks.discard();
                    return CaseOutcome::Panicked(panic_message(payload.as_ref()));
                }
                let result = slot.borrow_mut().take();
                result.map_or(CaseOutcome::Pending, outcome_of)
            }
        }
    }

    fn record(&self, name: &str, selection: Selection, body: Option<HostBody>) {
        self.cases.borrow_mut().push(RegisteredCase {
            name: name.to_owned(),
            selection,
            body: body.map(Rc::new),
        });
    }
}

impl Registrar for RecordingRegistrar {
    fn it(&self, name: &str, body: HostBody) {
        self.record(name, Selection::Normal, Some(body));
    }

    fn only(&self, name: &str, body: HostBody) {
        self.record(name, Selection::Only, Some(body));
    }

    fn skip(&self, name: &str) {
        self.record(name, Selection::Skip, None);
    }
}

impl fmt::Debug for RecordingRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRegistrar")
            .field("cases", &self.registered())
            .field("ticks", &self.ticks)
            .finish()
    }
}

fn outcome_of(result: TestResult) -> CaseOutcome {
    match result {
        Ok(()) => CaseOutcome::Passed,
        Err(failure) => CaseOutcome::Failed(failure),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    String::from("non-string panic payload")
}
