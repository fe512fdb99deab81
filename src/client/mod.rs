pub mod error;
pub mod http;
pub mod local;

use async_trait::async_trait;

use crate::resources::FilteredResources;

pub use error::{FetchError, FetchResult};
pub use http::{EndpointConfig, HttpResourceClient};
pub use local::LocalCatalogClient;

/// Source of filtered option lists for a scope value.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn fetch_filtered(&self, scope: &str) -> FetchResult<FilteredResources>;

    /// Human-readable location of the request for diagnostics.
    fn describe_request(&self, scope: &str) -> String;

    fn client_name(&self) -> &'static str;
}
