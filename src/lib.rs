pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod form;
pub mod resources;
pub mod server;
pub mod synchronizer;

pub use catalog::{Catalog, CatalogEntry, Destination, ResourceStatus};
pub use client::{FetchError, HttpResourceClient, LocalCatalogClient, ResourceClient};
pub use config::{AppConfig, ConfigError};
pub use console::{Console, VerbosityLevel, console, init_console};
pub use form::{FieldNames, Form, InitError, ReadinessPolicy, SelectOption, Selector, Snapshot};
pub use resources::{Category, DependentSet, FilteredResources, ResourceId};
pub use synchronizer::{CascadingSynchronizer, ChangeOutcome, SyncEvent, SyncOptions};
