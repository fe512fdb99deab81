use std::sync::Arc;

use super::{Form, SelectOption};

/// Original option list and selection of one dependent field, captured
/// once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    field: String,
    options: Arc<[SelectOption]>,
    value: Option<String>,
}

impl Snapshot {
    /// Returns `None` when the field is not on the form.
    pub fn capture(form: &Form, field: &str) -> Option<Self> {
        let selector = form.selector(field)?;
        Some(Self {
            field: field.to_string(),
            options: selector.options.into(),
            value: selector.value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Puts the captured list and selection back in a single write.
    pub fn restore(&self, form: &Form) -> bool {
        form.reset(&self.field, self.options.to_vec(), self.value.clone())
    }

    pub fn matches(&self, form: &Form) -> bool {
        form.selector(&self.field).is_some_and(|current| {
            current.options.as_slice() == &*self.options && current.value == self.value
        })
    }
}
