//! Per-mount configuration.
//!
//! The three hooks the page can attach (`MapDataset`, `MapPushEvents`,
//! `MapHandleEvents`) are presets of one [`SyncConfig`]. Element attributes
//! pick the preset and may override the view and the missing-marker policy.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use crate::consts::{
    ATTR_CENTER, ATTR_HIGHLIGHT_MISSING, ATTR_HOOK, ATTR_ZOOM, DATASET_CENTER, DEFAULT_ZOOM, MAX_ZOOM,
    PUSH_EVENTS_CENTER,
};
use crate::geo::{LatLng, MapView};
use crate::widget::TileLayerConfig;

/// Error returned for an attribute value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown hook `{0}`")]
    UnknownHook(String),
    #[error("invalid center `{0}`, expected \"lat,lng\"")]
    InvalidCenter(String),
    #[error("invalid zoom `{0}`, expected 0..=18")]
    InvalidZoom(String),
    #[error("invalid highlight policy `{0}`, expected \"ignore\" or \"add\"")]
    InvalidPolicy(String),
}

/// Where the first markers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialLocations {
    /// Start empty and wait for commands.
    None,
    /// Parse the element's `data-locations` attribute.
    Dataset,
    /// Ask the server with `get-locations`.
    Request,
}

/// What `highlight-marker` does for a location with no marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMarkerPolicy {
    /// Log and leave the map unchanged.
    #[default]
    Ignore,
    /// Add the marker, then highlight it.
    AddThenHighlight,
}

impl FromStr for MissingMarkerPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "ignore" => Ok(Self::Ignore),
            "add" => Ok(Self::AddThenHighlight),
            other => Err(ConfigError::InvalidPolicy(other.to_owned())),
        }
    }
}

/// Named hook presets as registered on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    MapDataset,
    MapPushEvents,
    MapHandleEvents,
}

impl FromStr for HookKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "MapDataset" => Ok(Self::MapDataset),
            "MapPushEvents" => Ok(Self::MapPushEvents),
            "MapHandleEvents" => Ok(Self::MapHandleEvents),
            other => Err(ConfigError::UnknownHook(other.to_owned())),
        }
    }
}

/// Behavior of one mounted map.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub view: MapView,
    pub tiles: TileLayerConfig,
    pub initial: InitialLocations,
    /// Apply inbound `add-marker` / `highlight-marker`.
    pub commands: bool,
    /// Send `marker-clicked` and scroll to the replied location.
    pub report_clicks: bool,
    pub missing_highlight: MissingMarkerPolicy,
}

impl SyncConfig {
    /// Server owns the dataset: fetch it on mount, then follow commands.
    #[must_use]
    pub fn server_push() -> Self {
        Self {
            view: MapView { center: PUSH_EVENTS_CENTER.into(), zoom: DEFAULT_ZOOM },
            tiles: TileLayerConfig::default(),
            initial: InitialLocations::Request,
            commands: true,
            report_clicks: false,
            missing_highlight: MissingMarkerPolicy::Ignore,
        }
    }

    /// Dataset rides in the page; the client reports clicks back.
    #[must_use]
    pub fn client_push() -> Self {
        Self {
            view: MapView { center: DATASET_CENTER.into(), zoom: DEFAULT_ZOOM },
            tiles: TileLayerConfig::default(),
            initial: InitialLocations::Dataset,
            commands: false,
            report_clicks: true,
            missing_highlight: MissingMarkerPolicy::Ignore,
        }
    }

    #[must_use]
    pub fn for_hook(kind: HookKind) -> Self {
        match kind {
            HookKind::MapDataset => Self::client_push(),
            HookKind::MapPushEvents => Self {
                initial: InitialLocations::Request,
                commands: false,
                report_clicks: true,
                ..Self::server_push()
            },
            HookKind::MapHandleEvents => Self {
                view: MapView { center: DATASET_CENTER.into(), zoom: DEFAULT_ZOOM },
                initial: InitialLocations::None,
                commands: true,
                report_clicks: false,
                ..Self::server_push()
            },
        }
    }

    /// Build the config from element attributes.
    ///
    /// `data-hook` selects the preset (default `MapDataset`); `data-center`,
    /// `data-zoom` and `data-highlight-missing` override it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any attribute present with an unusable value.
    pub fn from_attributes<F>(attribute: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = match attribute(ATTR_HOOK) {
            Some(raw) => raw.parse()?,
            None => HookKind::MapDataset,
        };
        let mut config = Self::for_hook(kind);

        if let Some(raw) = attribute(ATTR_CENTER) {
            config.view.center = parse_center(&raw)?;
        }
        if let Some(raw) = attribute(ATTR_ZOOM) {
            config.view.zoom = parse_zoom(&raw)?;
        }
        if let Some(raw) = attribute(ATTR_HIGHLIGHT_MISSING) {
            config.missing_highlight = raw.parse()?;
        }
        Ok(config)
    }
}

fn parse_center(raw: &str) -> Result<LatLng, ConfigError> {
    let invalid = || ConfigError::InvalidCenter(raw.to_owned());
    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
    let center = LatLng::new(lat, lng);
    if center.is_valid() { Ok(center) } else { Err(invalid()) }
}

fn parse_zoom(raw: &str) -> Result<u8, ConfigError> {
    match raw.trim().parse::<u8>() {
        Ok(zoom) if zoom <= MAX_ZOOM => Ok(zoom),
        _ => Err(ConfigError::InvalidZoom(raw.to_owned())),
    }
}
