//! Cascading selector synchronizer.
//!
//! Watches the primary (destination) field and keeps the three dependent
//! fields in step with it:
//!
//! 1. every change first clears the dependents to their placeholder;
//! 2. an empty scope restores the captured snapshots;
//! 3. a non-empty scope fetches the filtered resources and either applies
//!    them or, on any failure, restores the snapshots.
//!
//! Each change takes a sequence number. Only the change holding the latest
//! number may touch the dependents once its request resolves, so a slow
//! response to an old scope can never overwrite a newer one.

mod events;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

use crate::client::ResourceClient;
use crate::form::{
    FieldChange, FieldNames, Form, InitError, ReadinessPolicy, Snapshot, fields_ready,
    normalize_value,
};
use crate::resources::{Category, DependentSet, FilteredResources};

pub use events::{ChangeOutcome, RestoreReason, SyncEvent};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub fields: FieldNames,
    pub readiness: ReadinessPolicy,
    pub events: Option<mpsc::UnboundedSender<SyncEvent>>,
}

impl SyncOptions {
    pub fn new(fields: FieldNames, readiness: ReadinessPolicy) -> Self {
        Self {
            fields,
            readiness,
            events: None,
        }
    }

    pub fn with_events(mut self, sender: mpsc::UnboundedSender<SyncEvent>) -> Self {
        self.events = Some(sender);
        self
    }
}

#[derive(Clone)]
pub struct CascadingSynchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    form: Form,
    client: Arc<dyn ResourceClient>,
    fields: FieldNames,
    dependents: DependentSet<String>,
    snapshots: DependentSet<Snapshot>,
    latest: AtomicU64,
    // Serializes "claim sequence + clear" against "check sequence + apply".
    apply_lock: Mutex<()>,
    changes: Mutex<Option<broadcast::Receiver<FieldChange>>>,
    events: Option<mpsc::UnboundedSender<SyncEvent>>,
}

impl CascadingSynchronizer {
    /// Waits for the form fields, captures the dependent snapshots and
    /// starts listening for primary-field changes. Nothing on the form is
    /// touched when this fails.
    pub async fn initialize(
        form: Form,
        client: Arc<dyn ResourceClient>,
        options: SyncOptions,
    ) -> Result<Self, InitError> {
        let SyncOptions {
            fields,
            readiness,
            events,
        } = options;
        let emit = |event: SyncEvent| {
            if let Some(sender) = &events {
                let _ = sender.send(event);
            }
        };

        let attempts = match fields_ready(&form, &fields, &readiness).await {
            Ok(attempts) => attempts,
            Err(error) => {
                emit(SyncEvent::InitFailed(error.clone()));
                return Err(error);
            }
        };
        emit(SyncEvent::FieldsReady { attempts });

        let changes = form.subscribe();
        let dependents = fields.dependents();
        let snapshots = DependentSet::try_from_fn(|category| {
            let name = dependents.get(category);
            Snapshot::capture(&form, name).ok_or_else(|| InitError::DependentFieldMissing {
                name: name.clone(),
                attempts,
            })
        });
        let snapshots = match snapshots {
            Ok(snapshots) => snapshots,
            Err(error) => {
                emit(SyncEvent::InitFailed(error.clone()));
                return Err(error);
            }
        };
        emit(SyncEvent::SnapshotsCaptured {
            counts: snapshots.map(|_, s| s.len()),
        });

        Ok(Self {
            inner: Arc::new(Inner {
                form,
                client,
                fields,
                dependents,
                snapshots,
                latest: AtomicU64::new(0),
                apply_lock: Mutex::new(()),
                changes: Mutex::new(Some(changes)),
                events,
            }),
        })
    }

    pub fn form(&self) -> &Form {
        &self.inner.form
    }

    pub fn fields(&self) -> &FieldNames {
        &self.inner.fields
    }

    pub fn snapshot(&self, category: Category) -> &Snapshot {
        self.inner.snapshots.get(category)
    }

    /// Sequence number of the most recent change, 0 before any.
    pub fn latest_sequence(&self) -> u64 {
        self.inner.latest.load(Ordering::SeqCst)
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(sender) = &self.inner.events {
            let _ = sender.send(event);
        }
    }

    /// Synthetic trigger for a value that was already selected when the
    /// form loaded.
    pub async fn bootstrap(&self) -> Option<ChangeOutcome> {
        let value = self.inner.form.value(&self.inner.fields.primary)?;
        Some(self.handle_change(Some(value)).await)
    }

    /// Runs the change protocol for one scope value.
    pub async fn handle_change(&self, scope: Option<String>) -> ChangeOutcome {
        let scope = normalize_value(scope);
        let sequence = self.begin_change(scope.as_deref());
        self.finish_change(sequence, scope).await
    }

    /// First half of a change: claims the next sequence number and clears
    /// the dependents. Synchronous, so the order of calls is the order of
    /// sequence numbers.
    pub fn begin_change(&self, scope: Option<&str>) -> u64 {
        let sequence = {
            let _guard = self.lock_apply();
            let sequence = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
            self.clear_dependents();
            sequence
        };
        self.emit(SyncEvent::ChangeStarted {
            sequence,
            scope: normalize_value(scope.map(str::to_string)),
        });
        sequence
    }

    /// Second half of a change: restores or fetches, then lands the result
    /// only if `sequence` is still the latest.
    pub async fn finish_change(&self, sequence: u64, scope: Option<String>) -> ChangeOutcome {
        let Some(scope) = normalize_value(scope) else {
            let _guard = self.lock_apply();
            if let Some(outcome) = self.superseded(sequence) {
                return outcome;
            }
            self.restore_snapshots();
            self.emit(SyncEvent::Restored {
                sequence,
                reason: RestoreReason::ScopeCleared,
            });
            return ChangeOutcome::Restored;
        };

        self.emit(SyncEvent::RequestSent {
            sequence,
            url: self.inner.client.describe_request(&scope),
        });
        let result = self.inner.client.fetch_filtered(&scope).await;

        let _guard = self.lock_apply();
        if let Some(outcome) = self.superseded(sequence) {
            return outcome;
        }
        match result {
            Ok(resources) => {
                let counts = self.apply(&resources);
                self.emit(SyncEvent::OptionsApplied { sequence, counts });
                ChangeOutcome::Applied(counts)
            }
            Err(error) => {
                self.restore_snapshots();
                self.emit(SyncEvent::Restored {
                    sequence,
                    reason: RestoreReason::FetchFailed(error.user_message()),
                });
                ChangeOutcome::RestoredAfterFailure
            }
        }
    }

    /// Puts every dependent back to its captured options.
    pub fn restore_snapshots(&self) {
        for (_, snapshot) in self.inner.snapshots.iter() {
            snapshot.restore(&self.inner.form);
        }
    }

    /// Listens for primary-field changes until `shutdown` resolves. Each
    /// change runs as its own task, so requests may overlap; the sequence
    /// guard decides which one lands. In-flight changes are allowed to
    /// finish before this returns.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut changes = self.take_changes();
        let primary = self.inner.fields.primary.clone();
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        if let Some(value) = self.inner.form.value(&primary) {
            self.spawn_change(&mut tasks, Some(value));
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                change = changes.recv() => match change {
                    Ok(change) if change.field == primary => {
                        self.spawn_change(&mut tasks, change.value);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // Missed notifications; the current value is what matters.
                        let value = self.inner.form.value(&primary);
                        self.spawn_change(&mut tasks, value);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}
    }

    // The sequence is claimed here, in event order, not inside the task.
    fn spawn_change(&self, tasks: &mut JoinSet<ChangeOutcome>, value: Option<String>) {
        let scope = normalize_value(value);
        let sequence = self.begin_change(scope.as_deref());
        let this = self.clone();
        tasks.spawn(async move { this.finish_change(sequence, scope).await });
    }

    fn take_changes(&self) -> broadcast::Receiver<FieldChange> {
        self.inner
            .changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| self.inner.form.subscribe())
    }

    fn lock_apply(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .apply_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn superseded(&self, sequence: u64) -> Option<ChangeOutcome> {
        let latest = self.latest_sequence();
        if latest == sequence {
            return None;
        }
        self.emit(SyncEvent::Superseded { sequence, latest });
        Some(ChangeOutcome::Superseded)
    }

    fn clear_dependents(&self) {
        let placeholder = self.inner.fields.placeholder();
        for (_, name) in self.inner.dependents.iter() {
            self.inner.form.set_options(name, vec![placeholder.clone()]);
        }
    }

    fn apply(&self, resources: &FilteredResources) -> DependentSet<usize> {
        for (category, name) in self.inner.dependents.iter() {
            let options = resources.options(category);
            if !options.is_empty() {
                self.inner.form.append_options(name, options);
            }
        }
        resources.counts()
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod tests;
