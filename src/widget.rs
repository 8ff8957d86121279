//! The seam between the adapter and a concrete map widget.
//!
//! The widget is an opaque rendering capability: it places markers, opens
//! popups, and moves the viewport. Everything location-oriented lives in
//! [`crate::adapter::MapAdapter`]; implementations of these traits only
//! translate calls into the widget's native API (Leaflet in the browser, an
//! in-memory recorder in tests).

use crate::consts::{MAX_ZOOM, TILE_ATTRIBUTION, TILE_SIZE, TILE_URL_TEMPLATE, ZOOM_OFFSET};
use crate::geo::{Bounds, LatLng, MapView};

/// Error returned when the widget cannot attach to its container.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map container is not attached to the document")]
    ContainerMissing,
    #[error("map widget failed to bind: {0}")]
    Bind(String),
}

/// Callback invoked by the widget when a marker is clicked.
pub type ClickCallback = Box<dyn FnMut()>;

/// Tile source settings passed to the widget on bind.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerConfig {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
    pub tile_size: u32,
    pub zoom_offset: i8,
}

impl Default for TileLayerConfig {
    fn default() -> Self {
        Self {
            url_template: TILE_URL_TEMPLATE.to_owned(),
            attribution: TILE_ATTRIBUTION.to_owned(),
            max_zoom: MAX_ZOOM,
            tile_size: TILE_SIZE,
            zoom_offset: ZOOM_OFFSET,
        }
    }
}

/// Cheap, clonable handle to one rendered marker.
pub trait MarkerHandle: Clone + 'static {
    /// Current marker position.
    fn position(&self) -> LatLng;

    /// Open the marker's label popup.
    fn open_popup(&self);
}

/// A map-rendering widget bound to one container element.
pub trait MapWidget: Sized + 'static {
    /// What the widget binds to (a DOM element in the browser).
    type Container: ?Sized;
    type Marker: MarkerHandle;

    /// Create the widget inside `container` with the given view and tiles.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] when the widget cannot attach to `container`.
    fn bind(container: &Self::Container, view: MapView, tiles: &TileLayerConfig) -> Result<Self, MapError>;

    /// Place a marker with a popup label.
    fn add_marker(&mut self, at: LatLng, label: &str) -> Self::Marker;

    /// Register a click listener on `marker`. The widget owns the listener
    /// until the marker is removed or the widget is destroyed.
    fn on_marker_click(&mut self, marker: &Self::Marker, callback: ClickCallback);

    /// Remove a marker and detach its listeners.
    fn remove_marker(&mut self, marker: &Self::Marker);

    fn pan_to(&mut self, at: LatLng);

    fn fit_bounds(&mut self, bounds: Bounds);

    /// Tear the widget down. No callback fires afterwards.
    fn destroy(&mut self);
}
