use async_trait::async_trait;
use std::sync::Arc;

use super::{FetchResult, ResourceClient};
use crate::catalog::Catalog;
use crate::resources::FilteredResources;

/// Answers filter requests from an in-process catalog, no network.
#[derive(Debug, Clone)]
pub struct LocalCatalogClient {
    catalog: Arc<Catalog>,
}

impl LocalCatalogClient {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ResourceClient for LocalCatalogClient {
    async fn fetch_filtered(&self, scope: &str) -> FetchResult<FilteredResources> {
        Ok(self.catalog.filter(Some(scope)))
    }

    fn describe_request(&self, scope: &str) -> String {
        format!("catalog[destination_id={}]", scope)
    }

    fn client_name(&self) -> &'static str {
        "catalog"
    }
}
