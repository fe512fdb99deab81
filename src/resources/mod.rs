//! Response schema of the filtered-resources endpoint.
//!
//! The schema is closed: the three categories below are the whole
//! contract, and a payload carrying anything else is rejected rather than
//! partially understood.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::form::SelectOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Attraction,
    Restaurant,
    Hotel,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Attraction, Category::Restaurant, Category::Hotel];

    /// Field name of the category's list in the response body.
    pub fn list_name(&self) -> &'static str {
        match self {
            Category::Attraction => "attractions",
            Category::Restaurant => "restaurants",
            Category::Hotel => "hotels",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_name())
    }
}

/// One value per dependent category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentSet<T> {
    pub attractions: T,
    pub restaurants: T,
    pub hotels: T,
}

impl<T> DependentSet<T> {
    pub fn new(attractions: T, restaurants: T, hotels: T) -> Self {
        Self {
            attractions,
            restaurants,
            hotels,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self::new(
            f(Category::Attraction),
            f(Category::Restaurant),
            f(Category::Hotel),
        )
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Category) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self::new(
            f(Category::Attraction)?,
            f(Category::Restaurant)?,
            f(Category::Hotel)?,
        ))
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Attraction => &self.attractions,
            Category::Restaurant => &self.restaurants,
            Category::Hotel => &self.hotels,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> DependentSet<U> {
        DependentSet::from_fn(|category| f(category, self.get(category)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |category| (category, self.get(category)))
    }
}

/// Database key of a resource: integer or string (UUIDs included).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Number(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Text(value.to_string())
    }
}

pub trait ResourceRecord {
    fn id(&self) -> &ResourceId;
    fn name(&self) -> &str;

    fn to_option(&self) -> SelectOption {
        SelectOption::new(self.id().to_string(), self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractionRecord {
    pub attraction_id: ResourceId,
    pub attraction_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub restaurant_id: ResourceId,
    pub restaurant_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub hotel_id: ResourceId,
    pub hotel_name: String,
}

impl ResourceRecord for AttractionRecord {
    fn id(&self) -> &ResourceId {
        &self.attraction_id
    }

    fn name(&self) -> &str {
        &self.attraction_name
    }
}

impl ResourceRecord for RestaurantRecord {
    fn id(&self) -> &ResourceId {
        &self.restaurant_id
    }

    fn name(&self) -> &str {
        &self.restaurant_name
    }
}

impl ResourceRecord for HotelRecord {
    fn id(&self) -> &ResourceId {
        &self.hotel_id
    }

    fn name(&self) -> &str {
        &self.hotel_name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilteredResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    pub attractions: Vec<AttractionRecord>,
    pub restaurants: Vec<RestaurantRecord>,
    pub hotels: Vec<HotelRecord>,
}

impl FilteredResources {
    /// Options for one category, in response order.
    pub fn options(&self, category: Category) -> Vec<SelectOption> {
        match category {
            Category::Attraction => to_options(&self.attractions),
            Category::Restaurant => to_options(&self.restaurants),
            Category::Hotel => to_options(&self.hotels),
        }
    }

    pub fn counts(&self) -> DependentSet<usize> {
        DependentSet::new(
            self.attractions.len(),
            self.restaurants.len(),
            self.hotels.len(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty() && self.restaurants.is_empty() && self.hotels.is_empty()
    }
}

fn to_options<R: ResourceRecord>(records: &[R]) -> Vec<SelectOption> {
    records.iter().map(ResourceRecord::to_option).collect()
}
