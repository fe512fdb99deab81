//! Fields-ready signal: a bounded poll that resolves once the primary and
//! all dependent fields are on the form.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use super::{FieldNames, Form};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("Primary field '{name}' not found after {attempts} attempt(s)")]
    PrimaryFieldMissing { name: String, attempts: u32 },

    #[error("Dependent field '{name}' not found after {attempts} attempt(s)")]
    DependentFieldMissing { name: String, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            max_attempts: 20,
        }
    }
}

impl ReadinessPolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Always at least one look at the form.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Waits until every required field is present. Returns the number of
/// polls it took.
pub async fn fields_ready(
    form: &Form,
    names: &FieldNames,
    policy: &ReadinessPolicy,
) -> Result<u32, InitError> {
    let attempts = policy.attempts();

    for attempt in 1..=attempts {
        if missing_field(form, names).is_none() {
            return Ok(attempt);
        }
        if attempt < attempts {
            sleep(policy.poll_interval()).await;
        }
    }

    match missing_field(form, names) {
        None => Ok(attempts),
        Some(Missing::Primary(name)) => Err(InitError::PrimaryFieldMissing { name, attempts }),
        Some(Missing::Dependent(name)) => Err(InitError::DependentFieldMissing { name, attempts }),
    }
}

enum Missing {
    Primary(String),
    Dependent(String),
}

fn missing_field(form: &Form, names: &FieldNames) -> Option<Missing> {
    if !form.contains(&names.primary) {
        return Some(Missing::Primary(names.primary.clone()));
    }
    names
        .dependents()
        .iter()
        .find(|(_, name)| !form.contains(name))
        .map(|(_, name)| Missing::Dependent(name.clone()))
}
