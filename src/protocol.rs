//! Event names, request builders, and payload parsing for the map channel.
//!
//! Outbound:
//! - `get-locations` with `{}`; reply `{ "locations": [Location] }`
//! - `marker-clicked` with the raw location id; reply `{ "location": Location }`
//!
//! Inbound, unsolicited:
//! - `add-marker` with one Location
//! - `highlight-marker` with one Location

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;

use frames::{Frame, Status};

use crate::location::{DatasetError, Location, LocationId, location_from_value, locations_from_value};

pub const EVENT_GET_LOCATIONS: &str = "get-locations";
pub const EVENT_MARKER_CLICKED: &str = "marker-clicked";
pub const EVENT_ADD_MARKER: &str = "add-marker";
pub const EVENT_HIGHLIGHT_MARKER: &str = "highlight-marker";

/// Error returned when a reply or command payload cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Location(#[from] DatasetError),
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
}

/// Server command applied to the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddMarker(Location),
    HighlightMarker(Location),
}

/// An inbound frame sorted by what the controller should do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound<'a> {
    Reply { request_id: &'a str, status: Status, data: &'a serde_json::Value },
    Command { event: &'a str, data: &'a serde_json::Value },
}

/// Replies carry the id of the request they answer; everything else is a
/// command.
#[must_use]
pub fn classify(frame: &Frame) -> Inbound<'_> {
    match (frame.parent_id.as_deref(), frame.status.is_reply()) {
        (Some(request_id), true) => Inbound::Reply { request_id, status: frame.status, data: &frame.data },
        _ => Inbound::Command { event: frame.event.as_str(), data: &frame.data },
    }
}

/// Decode a command payload.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownEvent`] for events that are not map
/// commands and [`ProtocolError::Location`] for unusable locations.
pub fn parse_command(event: &str, data: &serde_json::Value) -> Result<Command, ProtocolError> {
    match event {
        EVENT_ADD_MARKER => Ok(Command::AddMarker(location_from_value(data.clone())?)),
        EVENT_HIGHLIGHT_MARKER => Ok(Command::HighlightMarker(location_from_value(data.clone())?)),
        other => Err(ProtocolError::UnknownEvent(other.to_owned())),
    }
}

#[must_use]
pub fn get_locations_request(topic: Option<String>) -> Frame {
    Frame::request(topic, EVENT_GET_LOCATIONS, serde_json::json!({}))
}

/// The payload is the bare id, not wrapped in an object.
#[must_use]
pub fn marker_clicked_request(topic: Option<String>, id: &LocationId) -> Frame {
    let data = match id {
        LocationId::Int(id) => serde_json::Value::from(*id),
        LocationId::Text(id) => serde_json::Value::from(id.as_str()),
    };
    Frame::request(topic, EVENT_MARKER_CLICKED, data)
}

/// Decode a `get-locations` reply, all-or-nothing.
///
/// # Errors
///
/// Fails when `locations` is absent or any entry is unusable.
pub fn parse_locations_reply(data: &serde_json::Value) -> Result<Vec<Location>, ProtocolError> {
    let rows = data.get("locations").ok_or(ProtocolError::MissingField("locations"))?;
    Ok(locations_from_value(rows.clone())?)
}

/// Decode a `marker-clicked` reply.
///
/// # Errors
///
/// Fails when `location` is absent or unusable.
pub fn parse_location_reply(data: &serde_json::Value) -> Result<Location, ProtocolError> {
    let row = data.get("location").ok_or(ProtocolError::MissingField("location"))?;
    Ok(location_from_value(row.clone())?)
}

/// Server-provided message on an error reply, if any.
#[must_use]
pub fn error_message(data: &serde_json::Value) -> Option<&str> {
    data.get("message")
        .or_else(|| data.get("error"))
        .and_then(serde_json::Value::as_str)
}
