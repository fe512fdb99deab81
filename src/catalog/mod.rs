//! Server-side resource catalog and the rule that filters it by
//! destination: a destination resolves to a city, and only active
//! resources in that city are offered.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::resources::{
    AttractionRecord, FilteredResources, HotelRecord, ResourceId, RestaurantRecord,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    #[default]
    Active,
    Inactive,
    UnderConstruction,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub destination_id: String,
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ResourceId,
    pub name: String,
    pub city_name: String,
    #[serde(default)]
    pub status: ResourceStatus,
}

impl CatalogEntry {
    pub fn new(id: impl Into<ResourceId>, name: &str, city_name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            city_name: city_name.to_string(),
            status: ResourceStatus::Active,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    fn offered_in(&self, city_name: &str) -> bool {
        self.status == ResourceStatus::Active && self.city_name == city_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub attractions: Vec<CatalogEntry>,
    #[serde(default)]
    pub restaurants: Vec<CatalogEntry>,
    #[serde(default)]
    pub hotels: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse catalog file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn destination(&self, destination_id: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.destination_id == destination_id)
    }

    /// Resources offered for a destination. Missing or unknown
    /// destinations yield empty lists and no city.
    pub fn filter(&self, destination_id: Option<&str>) -> FilteredResources {
        let Some(destination) = destination_id
            .filter(|id| !id.is_empty())
            .and_then(|id| self.destination(id))
        else {
            return FilteredResources::default();
        };
        let city = destination.city_name.as_str();

        FilteredResources {
            city_name: Some(destination.city_name.clone()),
            attractions: self
                .attractions
                .iter()
                .filter(|e| e.offered_in(city))
                .map(|e| AttractionRecord {
                    attraction_id: e.id.clone(),
                    attraction_name: e.name.clone(),
                })
                .collect(),
            restaurants: self
                .restaurants
                .iter()
                .filter(|e| e.offered_in(city))
                .map(|e| RestaurantRecord {
                    restaurant_id: e.id.clone(),
                    restaurant_name: e.name.clone(),
                })
                .collect(),
            hotels: self
                .hotels
                .iter()
                .filter(|e| e.offered_in(city))
                .map(|e| HotelRecord {
                    hotel_id: e.id.clone(),
                    hotel_name: e.name.clone(),
                })
                .collect(),
        }
    }
}
