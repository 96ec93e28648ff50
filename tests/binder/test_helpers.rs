//! Shared fixtures and helpers for binder BDD scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::fixture;
use stub_scope::test_support::{CaseReport, RecordingRegistrar};
use stub_scope::{Body, Fixture, StubData, Using};

#[derive(Clone)]
pub struct BinderWorld {
    pub registrar: RecordingRegistrar,
    pub using: Rc<Using<RecordingRegistrar>>,
    pub observed: Rc<RefCell<Vec<Vec<String>>>>,
    pub reports: Rc<RefCell<Vec<CaseReport>>>,
}

impl BinderWorld {
    pub fn reader(&self) -> StubData {
        self.using.stub_data()
    }

    pub fn fixture(field: &str, value: &str) -> Fixture {
        Fixture::new().with(field.trim(), value.trim())
    }

    pub fn recording_sync_body(&self) -> Body {
        let log = Rc::clone(&self.observed);
        let reader = self.reader();
        Body::sync(move |_| {
            log.borrow_mut().push(reader.field_names());
            Ok(())
        })
    }

    pub fn recording_async_body(&self) -> Body {
        let log = Rc::clone(&self.observed);
        let reader = self.reader();
        let ticks = self.registrar.ticks().clone();
        Body::with_done(move |done| {
            let log = Rc::clone(&log);
            let reader = reader.clone();
            ticks.defer(move || {
                log.borrow_mut().push(reader.field_names());
                done.complete();
            });
        })
    }
}

#[fixture]
pub fn binder_world() -> BinderWorld {
    let registrar = RecordingRegistrar::new();
    BinderWorld {
        using: Rc::new(Using::new(registrar.clone())),
        registrar,
        observed: Rc::default(),
        reports: Rc::default(),
    }
}
