//! Unit tests for the stub-data registry.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn registry() -> Registry {
    Registry::new()
}

#[rstest]
fn new_registry_is_empty(registry: Registry) {
    let reader = registry.reader();
    assert!(reader.is_empty());
    assert!(!registry.is_populated());
    assert!(reader.field_names().is_empty());
}

#[rstest]
fn populate_installs_fields_and_empty_data(registry: Registry) {
    let fixture = Fixture::new().with("x", json!([null, "A"])).with("y", 2);
    let data = registry.populate(&fixture);
    let reader = registry.reader();

    assert_eq!(reader.field_names(), vec!["data", "x", "y"]);
    assert_eq!(reader.get("x"), Some(json!([null, "A"])));
    assert_eq!(reader.get("data"), Some(json!({})));
    assert!(data.is_empty());
    assert!(
        reader
            .data()
            .is_some_and(|current| current.same_as(&data))
    );
}

#[rstest]
fn populate_replaces_previous_field_set(registry: Registry) {
    registry.populate(&Fixture::new().with("a", 1));
    registry.populate(&Fixture::new().with("b", 2));

    let reader = registry.reader();
    assert!(!reader.contains("a"));
    assert_eq!(reader.get("b"), Some(json!(2)));
}

#[rstest]
fn fixture_data_field_is_shadowed_by_scratch(registry: Registry) {
    let data = registry.populate(&Fixture::new().with("data", "fixture value"));
    assert_eq!(registry.reader().get("data"), Some(json!({})));
    assert!(data.is_empty());
}

#[rstest]
fn clear_removes_everything_and_is_idempotent(registry: Registry) {
    registry.populate(&Fixture::new().with("x", 1));
    registry.clear();
    registry.clear();

    let reader = registry.reader();
    assert!(reader.is_empty());
    assert!(reader.data().is_none());
    assert_eq!(reader.get("x"), None);
}

#[rstest]
fn each_population_creates_a_distinct_scratch_mapping(registry: Registry) {
    let fixture = Fixture::new();
    let first = registry.populate(&fixture);
    first.insert("count", 1);
    registry.clear();

    let second = registry.populate(&fixture);
    assert!(!first.same_as(&second));
    assert!(!second.contains_key("count"));
}

#[rstest]
fn reader_observes_live_state(registry: Registry) {
    let reader = registry.reader();
    assert_eq!(reader.get("mode"), None);

    registry.populate(&Fixture::new().with("mode", "fast"));
    assert_eq!(reader.get_as::<String>("mode"), Ok(Some(String::from("fast"))));

    registry.populate(&Fixture::new().with("mode", "slow"));
    assert_eq!(reader.get_as::<String>("mode"), Ok(Some(String::from("slow"))));
}

#[rstest]
fn typed_read_reports_decode_failures(registry: Registry) {
    registry.populate(&Fixture::new().with("count", "many"));
    let err = registry
        .reader()
        .get_as::<u32>("count")
        .expect_err("string should not decode as u32");
    assert!(matches!(err, FixtureError::Decode { field, .. } if field == "count"));
}

#[rstest]
fn scratch_mutations_are_visible_through_reader(registry: Registry) {
    let data = registry.populate(&Fixture::new());
    data.insert("seen", true);
    assert_eq!(registry.reader().get("data"), Some(json!({ "seen": true })));
    assert_eq!(data.get_as::<bool>("seen"), Ok(Some(true)));
    assert_eq!(data.remove("seen"), Some(json!(true)));
}
