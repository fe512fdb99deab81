use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, sync::Arc};
use tokio::sync::mpsc;

use crate::catalog::Catalog;
use crate::client::{HttpResourceClient, LocalCatalogClient, ResourceClient};
use crate::config::AppConfig;
use crate::console::console;
use crate::form::{Form, SelectOption, Selector};
use crate::synchronizer::{CascadingSynchronizer, SyncOptions};

/// Form description read by `sync --form`.
///
/// ```toml
/// [[fields]]
/// name = "destination_id"
/// value = "5"
/// options = [{ value = "5", label = "Hangzhou" }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFile {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl FormFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse form file {}", path.display()))
    }

    pub fn into_form(self) -> Form {
        Form::from_selectors(self.fields.into_iter().map(|field| {
            let selector = Selector::new(field.name).with_options(field.options);
            match field.value {
                Some(value) => selector.with_value(value),
                None => selector,
            }
        }))
    }
}

pub async fn handle_sync(
    config: &AppConfig,
    form_path: Option<&Path>,
    catalog_path: Option<&Path>,
    scope: Option<String>,
) -> Result<()> {
    let form = match form_path {
        Some(path) => FormFile::load(path)?.into_form(),
        None => Form::with_default_fields(&config.fields),
    };

    let client: Arc<dyn ResourceClient> = match catalog_path {
        Some(path) => Arc::new(LocalCatalogClient::new(Arc::new(Catalog::load(path)?))),
        None => Arc::new(HttpResourceClient::new(config.endpoint.clone())?),
    };
    console().verbose(&format!("Using {} client", client.client_name()));

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            console().sync_event(&event);
        }
    });

    let options = SyncOptions::new(config.fields.clone(), config.readiness).with_events(events_tx);
    let synchronizer = CascadingSynchronizer::initialize(form.clone(), client, options)
        .await
        .context("Failed to bind the cascading filter")?;

    if let Some(outcome) = synchronizer.bootstrap().await {
        console().change_outcome(&outcome);
    }

    if let Some(scope) = scope {
        let primary = config.fields.primary.as_str();
        form.select(primary, Some(scope));
        let outcome = synchronizer.handle_change(form.value(primary)).await;
        console().change_outcome(&outcome);
    }

    drop(synchronizer);
    // Flush the remaining diagnostics before printing the result.
    let _ = printer.await;

    console().newline();
    for (_, name) in config.fields.dependents().iter() {
        let options = form.options(name).unwrap_or_default();
        console().selector(name, &options);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_form_file_builds_selectors() {
        let file: FormFile = toml::from_str(
            r#"
            [[fields]]
            name = "destination_id"
            value = "5"
            options = [{ value = "5", label = "Hangzhou" }]

            [[fields]]
            name = "hotel_id"
            options = [
                { value = "", label = "---------" },
                { value = "9", label = "Lakeside" },
            ]
            "#,
        )
        .unwrap();

        let form = file.into_form();

        assert_eq!(form.field_names(), vec!["destination_id", "hotel_id"]);
        assert_eq!(form.value("destination_id").as_deref(), Some("5"));
        assert_eq!(form.value("hotel_id"), None);
        assert_eq!(form.options("hotel_id").unwrap().len(), 2);
    }

    #[test]
    fn test_form_file_load_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("form.toml");
        fs::write(&path, "[[fields]]\nvalue = 3\n").unwrap();

        let err = FormFile::load(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse form file"));
    }

    #[tokio::test]
    async fn test_sync_against_local_catalog_succeeds() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog.toml");
        fs::write(
            &catalog,
            r#"
            [[destinations]]
            destination_id = "5"
            city_name = "Hangzhou"

            [[attractions]]
            id = 1
            name = "West Lake"
            city_name = "Hangzhou"
            "#,
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.readiness.poll_interval_ms = 1;

        handle_sync(&config, None, Some(&catalog), Some("5".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sync_fails_when_form_lacks_fields() {
        let dir = TempDir::new().unwrap();
        let form = dir.path().join("form.toml");
        fs::write(&form, "[[fields]]\nname = \"destination_id\"\n").unwrap();
        let catalog = dir.path().join("catalog.toml");
        fs::write(&catalog, "").unwrap();
        let mut config = AppConfig::default();
        config.readiness.poll_interval_ms = 1;
        config.readiness.max_attempts = 2;

        let err = handle_sync(&config, Some(&form), Some(&catalog), None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to bind"));
    }
}
