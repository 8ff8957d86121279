//! Server-owned location records and dataset parsing.
//!
//! A [`Location`] is created by the server and read-only on the client. The
//! dataset parser is all-or-nothing: either every record in the attribute
//! parses and validates, or the caller gets an error and nothing else.

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::LOCATION_DOM_PREFIX;
use crate::geo::LatLng;

/// Raw location identifier. The server may send integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationId {
    Int(i64),
    Text(String),
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for LocationId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for LocationId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

/// A point of interest pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Reject coordinates the widget cannot place.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidCoordinates`] for non-finite or
    /// out-of-range coordinates.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.position().is_valid() {
            Ok(())
        } else {
            Err(DatasetError::InvalidCoordinates { id: self.id.clone(), lat: self.lat, lng: self.lng })
        }
    }
}

/// Element id of the page row representing `id`, e.g. `location-17`.
#[must_use]
pub fn location_dom_id(id: &LocationId) -> String {
    format!("{LOCATION_DOM_PREFIX}{id}")
}

/// Error returned when a location payload cannot be accepted.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("malformed location json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("location {id} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { id: LocationId, lat: f64, lng: f64 },
}

/// Parse a JSON-encoded array of locations, validating every entry.
///
/// # Errors
///
/// Fails on malformed JSON or on the first record with invalid coordinates;
/// no partial result is returned.
pub fn parse_dataset(raw: &str) -> Result<Vec<Location>, DatasetError> {
    let locations: Vec<Location> = serde_json::from_str(raw)?;
    validate_all(&locations)?;
    Ok(locations)
}

/// Decode locations from an already-parsed JSON value, all-or-nothing.
///
/// # Errors
///
/// Same failure modes as [`parse_dataset`].
pub fn locations_from_value(value: serde_json::Value) -> Result<Vec<Location>, DatasetError> {
    let locations: Vec<Location> = serde_json::from_value(value)?;
    validate_all(&locations)?;
    Ok(locations)
}

/// Decode and validate a single location.
///
/// # Errors
///
/// Same failure modes as [`parse_dataset`].
pub fn location_from_value(value: serde_json::Value) -> Result<Location, DatasetError> {
    let location: Location = serde_json::from_value(value)?;
    location.validate()?;
    Ok(location)
}

fn validate_all(locations: &[Location]) -> Result<(), DatasetError> {
    locations.iter().try_for_each(Location::validate)
}
