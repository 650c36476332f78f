//! Place search: data model, the [`SearchEngine`] boundary and the [`SearchController`] that
//! runs requests in the background.

use async_trait::async_trait;
use placefinder_types::GeoCoordinates;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

mod controller;
mod here;

pub use controller::SearchController;
pub use here::HereSearchEngine;

/// Postal address of a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    text: String,
}

impl Address {
    /// Creates an address from its single line representation.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Address as a single line of text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A place returned by a search engine.
///
/// Places are immutable once returned. Query suggestions (completions of the search text rather
/// than actual places) have no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    id: Option<String>,
    title: String,
    address: Option<Address>,
    coordinates: Option<GeoCoordinates>,
    result_type: Option<String>,
    distance: Option<f64>,
}

impl Place {
    /// Creates a place with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            address: None,
            coordinates: None,
            result_type: None,
            distance: None,
        }
    }

    /// Sets the engine id of the place.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the address.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Sets the coordinates.
    pub fn with_coordinates(mut self, coordinates: GeoCoordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Sets the result type reported by the engine, e.g. `street` or `place`.
    pub fn with_result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type = Some(result_type.into());
        self
    }

    /// Sets the distance from the search center in meters.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Opaque id assigned by the engine.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Address of the place.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Location of the place.
    pub fn coordinates(&self) -> Option<GeoCoordinates> {
        self.coordinates
    }

    /// Result type reported by the engine.
    pub fn result_type(&self) -> Option<&str> {
        self.result_type.as_deref()
    }

    /// Distance from the search center in meters.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }
}

/// Free text search around a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    /// Text typed by the user.
    pub text: String,
    /// Results close to this point are preferred.
    pub at: GeoCoordinates,
}

impl TextQuery {
    /// Creates a new query.
    pub fn new(text: impl Into<String>, at: GeoCoordinates) -> Self {
        Self {
            text: text.into(),
            at,
        }
    }

    /// Returns true if the text has nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Limits of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of returned places.
    pub max_items: usize,
    /// Preferred language of the results.
    pub language: Option<String>,
}

impl SearchOptions {
    /// Options with the given result limit and no language preference.
    pub fn with_max_items(max_items: usize) -> Self {
        Self {
            max_items,
            language: None,
        }
    }
}

/// Service that finds places.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Returns places (and query completions) matching the text of the query.
    async fn suggest(
        &self,
        query: &TextQuery,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError>;

    /// Returns places near the given point, closest first.
    async fn nearby(
        &self,
        coordinates: GeoCoordinates,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError>;
}
