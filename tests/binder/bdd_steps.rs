//! BDD step definitions for binder behaviour.

use rstest_bdd_macros::{given, then, when};
use stub_scope::test_support::CaseOutcome;

use super::test_helpers::BinderWorld;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a binder factory over a recording registrar")]
fn binder_factory(binder_world: &BinderWorld) -> Result<(), StepError> {
    if binder_world.reader().is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "fresh registry should be empty",
        )))
    }
}

#[when("a synchronous case is registered with \"{field}\" set to \"{value}\"")]
fn register_sync(binder_world: &BinderWorld, field: String, value: String) {
    binder_world
        .using
        .with(BinderWorld::fixture(&field, &value))
        .it("sync case", binder_world.recording_sync_body());
}

#[when("an asynchronous case is registered with \"{field}\" set to \"{value}\"")]
fn register_async(binder_world: &BinderWorld, field: String, value: String) {
    binder_world
        .using
        .with(BinderWorld::fixture(&field, &value))
        .it("async case", binder_world.recording_async_body());
}

#[when("a focused case is registered with \"{field}\" set to \"{value}\"")]
fn register_focused(binder_world: &BinderWorld, field: String, value: String) {
    binder_world
        .using
        .with(BinderWorld::fixture(&field, &value))
        .it_only("focused case", binder_world.recording_sync_body());
}

#[when("a focused asynchronous case is registered with \"{field}\" set to \"{value}\"")]
fn register_focused_async(binder_world: &BinderWorld, field: String, value: String) {
    binder_world
        .using
        .with(BinderWorld::fixture(&field, &value))
        .it_only("focused async case", binder_world.recording_async_body());
}

#[when("a skipped case is registered with \"{field}\" set to \"{value}\"")]
fn register_skipped(binder_world: &BinderWorld, field: String, value: String) {
    binder_world
        .using
        .with(BinderWorld::fixture(&field, &value))
        .it_skip("skipped case", binder_world.recording_sync_body());
}

#[when("the registered cases run")]
fn run_cases(binder_world: &BinderWorld) {
    let reports = binder_world.registrar.run();
    binder_world.reports.borrow_mut().extend(reports);
}

#[then("case \"{index}\" observed the fields \"{fields}\"")]
fn case_observed(binder_world: &BinderWorld, index: usize, fields: String) -> Result<(), StepError> {
    let expected: Vec<String> = fields.split(',').map(|f| f.trim().to_owned()).collect();
    let observed = binder_world.observed.borrow();
    match observed.get(index) {
        Some(actual) if *actual == expected => Ok(()),
        other => Err(StepError::Assertion(format!(
            "case {index}: expected {expected:?}, got {other:?}"
        ))),
    }
}

#[then("every case passed")]
fn every_case_passed(binder_world: &BinderWorld) -> Result<(), StepError> {
    let reports = binder_world.reports.borrow();
    if reports
        .iter()
        .all(|report| report.outcome == CaseOutcome::Passed)
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("unexpected outcomes: {reports:?}")))
    }
}

#[then("only {count:u32} case ran")]
fn only_count_ran(binder_world: &BinderWorld, count: u32) -> Result<(), StepError> {
    let ran = binder_world.observed.borrow().len();
    if ran == count as usize {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("expected {count} cases to run, got {ran}")))
    }
}

#[then("no case observed any fields")]
fn nothing_observed(binder_world: &BinderWorld) -> Result<(), StepError> {
    let observed = binder_world.observed.borrow();
    if observed.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("cases ran: {observed:?}")))
    }
}

#[then("the registry is empty")]
fn registry_empty(binder_world: &BinderWorld) -> Result<(), StepError> {
    let reader = binder_world.reader();
    if reader.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "registry still holds {:?}",
            reader.field_names()
        )))
    }
}
