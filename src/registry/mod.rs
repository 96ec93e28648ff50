//! Scoped stub-data registry.
//!
//! The registry is a single mutable slot shared between the binder (the only
//! writer) and any number of stub closures (readers). It is either empty or
//! holds exactly one fixture's fields plus a fresh scratch mapping.
//!
//! Handles are `Rc` based: the registry assumes the host runner executes one
//! case at a time on a single thread.

use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fixture::{DATA_FIELD, Fixture, FixtureError, decode_field};

#[derive(Debug, Default)]
struct Slot {
    fields: Map<String, Value>,
    data: Option<ScratchData>,
}

/// Per-run scratch mapping exposed to the test body as `data`.
///
/// Clones share identity: a mutation through one handle is visible through
/// every other handle of the same run.
#[derive(Clone, Debug, Default)]
pub struct ScratchData {
    entries: Rc<RefCell<Map<String, Value>>>,
}

impl ScratchData {
    /// Creates an empty scratch mapping with a new identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.borrow_mut().insert(key.into(), value.into())
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// Decodes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Decode`] when the stored value does not match `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FixtureError> {
        self.get(key)
            .map(|value| decode_field(key, value))
            .transpose()
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.borrow_mut().remove(key)
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Copies the current entries.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries.borrow().clone()
    }

    /// Returns `true` when both handles refer to the same mapping.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

/// Writer handle over the shared slot.
///
/// Owned by the binder factory and its binders. Stubs receive a [`StubData`]
/// reader instead.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    slot: Rc<RefCell<Slot>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole field set with `fixture` and installs a fresh
    /// scratch mapping, which is returned.
    ///
    /// A fixture field named `data` is shadowed by the scratch mapping.
    pub fn populate(&self, fixture: &Fixture) -> ScratchData {
        let mut slot = self.slot.borrow_mut();
        if slot.data.is_some() {
            warn!(
                stale_fields = slot.fields.len(),
                "populating a registry that was never cleared; discarding stale state"
            );
        }
        slot.fields = fixture
            .fields()
            .filter(|(field, _)| field.as_str() != DATA_FIELD)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        let data = ScratchData::new();
        slot.data = Some(data.clone());
        debug!(fields = slot.fields.len(), "registry populated");
        data
    }

    /// Removes every field, including the scratch mapping. Idempotent.
    pub fn clear(&self) {
        let mut slot = self.slot.borrow_mut();
        if slot.data.is_none() && slot.fields.is_empty() {
            return;
        }
        slot.fields.clear();
        slot.data = None;
        debug!("registry cleared");
    }

    /// Returns `true` while a case's fixture is installed.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.slot.borrow().data.is_some()
    }

    /// Returns a read-only view over the live slot.
    #[must_use]
    pub fn reader(&self) -> StubData {
        StubData {
            slot: Rc::clone(&self.slot),
        }
    }
}

/// Read-only view of the registry handed to stub factories.
///
/// The view is live: a stub built before any case runs observes whichever
/// fixture is installed at the moment it is called.
#[derive(Clone, Debug)]
pub struct StubData {
    slot: Rc<RefCell<Slot>>,
}

impl StubData {
    /// Returns a copy of the named field.
    ///
    /// `data` yields the scratch mapping's current contents as an object.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        let slot = self.slot.borrow();
        if field == DATA_FIELD {
            return slot
                .data
                .as_ref()
                .map(|data| Value::Object(data.snapshot()));
        }
        slot.fields.get(field).cloned()
    }

    /// Decodes the named field into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Decode`] when the stored value does not match `T`.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, FixtureError> {
        self.get(field)
            .map(|value| decode_field(field, value))
            .transpose()
    }

    /// Returns `true` when the named field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        let slot = self.slot.borrow();
        if field == DATA_FIELD {
            return slot.data.is_some();
        }
        slot.fields.contains_key(field)
    }

    /// Lists present field names, `data` included while populated.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        let slot = self.slot.borrow();
        let mut names: Vec<String> = slot.fields.keys().cloned().collect();
        if slot.data.is_some() {
            names.push(DATA_FIELD.to_owned());
        }
        names.sort();
        names
    }

    /// Returns the scratch mapping of the running case.
    #[must_use]
    pub fn data(&self) -> Option<ScratchData> {
        self.slot.borrow().data.clone()
    }

    /// Returns `true` when no case is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let slot = self.slot.borrow();
        slot.data.is_none() && slot.fields.is_empty()
    }
}

#[cfg(test)]
mod tests;
