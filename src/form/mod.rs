//! In-process model of the filter form: named select fields, their
//! options, and change notifications for the primary field.

pub mod readiness;
pub mod snapshot;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::resources::DependentSet;

pub use readiness::{InitError, ReadinessPolicy, fields_ready};
pub use snapshot::Snapshot;

pub const DEFAULT_PLACEHOLDER_LABEL: &str = "---------";

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The empty-value "no selection" option.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self::new(String::new(), label)
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub name: String,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub value: Option<String>,
}

impl Selector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            value: None,
        }
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = normalize_value(Some(value.into()));
        self
    }

    pub fn selected(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Empty strings mean "nothing selected".
pub fn normalize_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Names of the four fields the synchronizer binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub primary: String,
    pub attractions: String,
    pub restaurants: String,
    pub hotels: String,
    pub placeholder_label: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            primary: "destination_id".to_string(),
            attractions: "attraction_id".to_string(),
            restaurants: "restaurant_id".to_string(),
            hotels: "hotel_id".to_string(),
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_string(),
        }
    }
}

impl FieldNames {
    pub fn dependents(&self) -> DependentSet<String> {
        DependentSet::new(
            self.attractions.clone(),
            self.restaurants.clone(),
            self.hotels.clone(),
        )
    }

    pub fn placeholder(&self) -> SelectOption {
        SelectOption::placeholder(self.placeholder_label.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub value: Option<String>,
}

/// Shared handle to the form. Clones see the same fields.
#[derive(Clone)]
pub struct Form {
    fields: Arc<RwLock<IndexMap<String, Selector>>>,
    changes: broadcast::Sender<FieldChange>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &*self.read())
            .finish()
    }
}

impl Form {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            fields: Arc::new(RwLock::new(IndexMap::new())),
            changes,
        }
    }

    pub fn from_selectors(selectors: impl IntoIterator<Item = Selector>) -> Self {
        let form = Self::new();
        for selector in selectors {
            form.insert(selector);
        }
        form
    }

    /// The four default fields, each dependent holding only its placeholder.
    pub fn with_default_fields(names: &FieldNames) -> Self {
        let mut selectors = vec![Selector::new(names.primary.clone())];
        for (_, name) in names.dependents().iter() {
            selectors.push(Selector::new(name.clone()).with_options(vec![names.placeholder()]));
        }
        Self::from_selectors(selectors)
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Selector>> {
        self.fields.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Selector>> {
        self.fields.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renders a field, replacing any field with the same name.
    pub fn insert(&self, selector: Selector) {
        self.write().insert(selector.name.clone(), selector);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn selector(&self, name: &str) -> Option<Selector> {
        self.read().get(name).cloned()
    }

    pub fn options(&self, name: &str) -> Option<Vec<SelectOption>> {
        self.read().get(name).map(|s| s.options.clone())
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.read()
            .get(name)
            .and_then(|s| s.selected().map(str::to_string))
    }

    /// Replaces the option list wholesale. A selected value that no longer
    /// has a matching option is dropped.
    pub fn set_options(&self, name: &str, options: Vec<SelectOption>) -> bool {
        let mut fields = self.write();
        let Some(selector) = fields.get_mut(name) else {
            return false;
        };
        selector.options = options;
        let stale = selector
            .value
            .as_ref()
            .is_some_and(|v| !selector.options.iter().any(|o| &o.value == v));
        if stale {
            selector.value = None;
        }
        true
    }

    /// Replaces options and selection together, without notifying
    /// subscribers.
    pub fn reset(&self, name: &str, options: Vec<SelectOption>, value: Option<String>) -> bool {
        let mut fields = self.write();
        let Some(selector) = fields.get_mut(name) else {
            return false;
        };
        selector.options = options;
        selector.value = value;
        true
    }

    pub fn append_options(
        &self,
        name: &str,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> bool {
        let mut fields = self.write();
        let Some(selector) = fields.get_mut(name) else {
            return false;
        };
        selector.options.extend(options);
        true
    }

    /// User interaction: sets the field's value and notifies subscribers.
    pub fn select(&self, name: &str, value: Option<String>) -> bool {
        let value = normalize_value(value);
        {
            let mut fields = self.write();
            let Some(selector) = fields.get_mut(name) else {
                return false;
            };
            selector.value = value.clone();
        }
        // No subscribers is fine.
        let _ = self.changes.send(FieldChange {
            field: name.to_string(),
            value,
        });
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.changes.subscribe()
    }
}
