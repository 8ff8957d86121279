//! Location-oriented wrapper around one map widget.
//!
//! The adapter keeps an id-indexed table of rendered markers, so finding the
//! marker for a location is a map lookup rather than a scan over widget
//! layers, and coordinates are never used as an identity key. The invariant
//! is one marker per [`LocationId`]: adding a location whose id is already
//! rendered replaces the previous marker.
//!
//! Marker clicks go through a shared handler slot read at click time, so the
//! handler can be installed after markers exist and is cut off on teardown
//! even if the widget still holds the listener closures.

#[cfg(test)]
#[path = "adapter_test.rs"]
mod adapter_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::geo::{Bounds, MapView};
use crate::location::{Location, LocationId};
use crate::widget::{MapError, MapWidget, MarkerHandle, TileLayerConfig};

/// Handler receiving the id of a clicked marker.
pub type MarkerClickHandler = Rc<dyn Fn(&LocationId)>;

type HandlerSlot = Rc<RefCell<Option<MarkerClickHandler>>>;

struct MarkerEntry<M> {
    marker: M,
    location: Location,
}

/// Owns one widget instance and its markers.
pub struct MapAdapter<W: MapWidget> {
    widget: W,
    markers: HashMap<LocationId, MarkerEntry<W::Marker>>,
    on_click: HandlerSlot,
}

impl<W: MapWidget> MapAdapter<W> {
    /// Bind a new widget to `container`.
    ///
    /// # Errors
    ///
    /// Propagates the widget's [`MapError`]; a map that cannot bind is fatal
    /// to the hosting mount.
    pub fn initialize(container: &W::Container, view: MapView, tiles: &TileLayerConfig) -> Result<Self, MapError> {
        let widget = W::bind(container, view, tiles)?;
        Ok(Self { widget, markers: HashMap::new(), on_click: Rc::new(RefCell::new(None)) })
    }

    /// Install the handler invoked with the location id of a clicked marker.
    pub fn set_click_handler(&mut self, handler: MarkerClickHandler) {
        *self.on_click.borrow_mut() = Some(handler);
    }

    /// Render `location` as a marker, replacing any marker with the same id.
    pub fn add_marker(&mut self, location: &Location) -> W::Marker {
        if let Some(previous) = self.markers.remove(&location.id) {
            log::debug!("add-marker: replacing marker for location {}", location.id);
            self.widget.remove_marker(&previous.marker);
        }

        let marker = self.widget.add_marker(location.position(), &location.name);
        let popup = marker.clone();
        let slot = Rc::clone(&self.on_click);
        let id = location.id.clone();
        self.widget.on_marker_click(
            &marker,
            Box::new(move || {
                popup.open_popup();
                // Clone out of the slot so the handler may touch the adapter.
                let handler = slot.borrow().clone();
                if let Some(handler) = handler {
                    handler(&id);
                }
            }),
        );

        self.markers
            .insert(location.id.clone(), MarkerEntry { marker: marker.clone(), location: location.clone() });
        marker
    }

    /// Remove the marker for `id`. Returns `false` if none was rendered.
    pub fn remove_marker(&mut self, id: &LocationId) -> bool {
        match self.markers.remove(id) {
            Some(entry) => {
                self.widget.remove_marker(&entry.marker);
                true
            }
            None => false,
        }
    }

    /// Remove every marker.
    pub fn clear(&mut self) {
        for (_, entry) in self.markers.drain() {
            self.widget.remove_marker(&entry.marker);
        }
    }

    /// Open the popup of the marker for `location` and pan to it.
    ///
    /// A location with no rendered marker is a lookup miss: it is logged and
    /// the view is left untouched.
    pub fn highlight_marker(&mut self, location: &Location) -> bool {
        let Some(entry) = self.markers.get(&location.id) else {
            log::warn!("highlight-marker: no marker for location {}", location.id);
            return false;
        };
        entry.marker.open_popup();
        let at = entry.marker.position();
        self.widget.pan_to(at);
        true
    }

    /// Fit the view to every rendered marker. No-op on an empty map.
    pub fn fit_markers(&mut self) -> bool {
        let Some(bounds) = self.bounds() else {
            log::debug!("fit-markers: no markers, view unchanged");
            return false;
        };
        self.widget.fit_bounds(bounds);
        true
    }

    /// Bounds covering every rendered marker.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::covering(self.markers.values().map(|entry| entry.marker.position()))
    }

    #[must_use]
    pub fn marker(&self, id: &LocationId) -> Option<&W::Marker> {
        self.markers.get(id).map(|entry| &entry.marker)
    }

    /// The location a marker was rendered from.
    #[cfg(test)]
    pub(crate) fn location(&self, id: &LocationId) -> Option<&Location> {
        self.markers.get(id).map(|entry| &entry.location)
    }

    #[must_use]
    pub fn contains(&self, id: &LocationId) -> bool {
        self.markers.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Cut off click delivery, remove every marker, and destroy the widget.
    pub fn teardown(mut self) {
        self.on_click.borrow_mut().take();
        self.clear();
        self.widget.destroy();
    }
}
