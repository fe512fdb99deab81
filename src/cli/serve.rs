use anyhow::Result;
use std::path::Path;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::console::console;
use crate::server::{self, shutdown_signal};

pub async fn handle_serve(
    config: &AppConfig,
    catalog_path: Option<&Path>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(port) = port {
        config.server.port = port;
    }

    let catalog = match catalog_path.or(config.server.catalog.as_deref()) {
        Some(path) => {
            let catalog = Catalog::load(path)?;
            console().verbose(&format!(
                "Loaded catalog {} ({} destinations)",
                path.display(),
                catalog.destinations.len()
            ));
            catalog
        }
        None => {
            console().warning("No catalog configured; the endpoint will answer with empty lists");
            Catalog::default()
        }
    };

    server::serve(&config, catalog, shutdown_signal()).await
}
