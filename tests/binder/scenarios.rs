//! BDD scenarios for per-case stub data.

use rstest_bdd_macros::scenario;

use super::test_helpers::{BinderWorld, binder_world};

#[scenario(
    path = "tests/features/binder.feature",
    name = "A synchronous case sees only its own fixture"
)]
fn scenario_sync_case(binder_world: BinderWorld) {
    let _ = binder_world;
}

#[scenario(
    path = "tests/features/binder.feature",
    name = "An asynchronous case keeps its fixture until it signals done"
)]
fn scenario_async_case(binder_world: BinderWorld) {
    let _ = binder_world;
}

#[scenario(
    path = "tests/features/binder.feature",
    name = "Sequential cases never observe each other's fields"
)]
fn scenario_sequential_cases(binder_world: BinderWorld) {
    let _ = binder_world;
}

#[scenario(
    path = "tests/features/binder.feature",
    name = "A focused case still installs its fixture"
)]
fn scenario_focused_case(binder_world: BinderWorld) {
    let _ = binder_world;
}

#[scenario(path = "tests/features/binder.feature", name = "Skipped cases never run")]
fn scenario_skipped_case(binder_world: BinderWorld) {
    let _ = binder_world;
}

#[scenario(
    path = "tests/features/binder.feature",
    name = "A focused asynchronous case keeps its fixture until done"
)]
fn scenario_focused_async_case(binder_world: BinderWorld) {
    let _ = binder_world;
}
