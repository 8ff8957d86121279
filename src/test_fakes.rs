//! In-memory widget, host, and log capture shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Once;

use frames::Frame;

use crate::geo::{Bounds, LatLng, MapView};
use crate::host::{ChannelError, HookHost};
use crate::location::Location;
use crate::widget::{ClickCallback, MapError, MapWidget, MarkerHandle, TileLayerConfig};

// =============================================================
// Widget
// =============================================================

/// Everything the fake widget was asked to do.
#[derive(Default)]
pub struct WidgetLog {
    pub view: Option<MapView>,
    pub tiles: Option<TileLayerConfig>,
    pub pans: Vec<LatLng>,
    pub fits: Vec<Bounds>,
    pub markers: Vec<FakeMarker>,
    pub removed: usize,
    pub destroyed: bool,
}

impl WidgetLog {
    /// Markers currently on the map.
    pub fn live_markers(&self) -> Vec<FakeMarker> {
        self.markers.iter().filter(|m| !m.state.removed.get()).cloned().collect()
    }

    pub fn marker_labelled(&self, label: &str) -> Option<FakeMarker> {
        self.live_markers().into_iter().find(|m| m.state.label == label)
    }
}

/// Stand-in DOM element. The shared log outlives the widget so tests can
/// inspect a map after teardown.
#[derive(Clone)]
pub struct FakeContainer {
    pub attached: bool,
    pub log: Rc<RefCell<WidgetLog>>,
}

impl FakeContainer {
    pub fn attached() -> Self {
        Self { attached: true, log: Rc::new(RefCell::new(WidgetLog::default())) }
    }

    pub fn detached() -> Self {
        Self { attached: false, ..Self::attached() }
    }

    pub fn log(&self) -> std::cell::Ref<'_, WidgetLog> {
        self.log.borrow()
    }
}

pub struct FakeMarkerState {
    pub position: LatLng,
    pub label: String,
    pub popup_opens: Cell<usize>,
    pub removed: Cell<bool>,
    click: RefCell<Option<ClickCallback>>,
}

#[derive(Clone)]
pub struct FakeMarker {
    pub state: Rc<FakeMarkerState>,
}

impl FakeMarker {
    pub fn popup_opens(&self) -> usize {
        self.state.popup_opens.get()
    }

    pub fn is_removed(&self) -> bool {
        self.state.removed.get()
    }

    /// Fire the click listener the way the browser would.
    pub fn click(&self) {
        let callback = self.state.click.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback();
            let mut slot = self.state.click.borrow_mut();
            if slot.is_none() && !self.state.removed.get() {
                *slot = Some(callback);
            }
        }
    }

    pub fn has_listener(&self) -> bool {
        self.state.click.borrow().is_some()
    }
}

impl MarkerHandle for FakeMarker {
    fn position(&self) -> LatLng {
        self.state.position
    }

    fn open_popup(&self) {
        self.state.popup_opens.set(self.state.popup_opens.get() + 1);
    }
}

pub struct FakeWidget {
    log: Rc<RefCell<WidgetLog>>,
}

impl MapWidget for FakeWidget {
    type Container = FakeContainer;
    type Marker = FakeMarker;

    fn bind(container: &FakeContainer, view: MapView, tiles: &TileLayerConfig) -> Result<Self, MapError> {
        if !container.attached {
            return Err(MapError::ContainerMissing);
        }
        {
            let mut log = container.log.borrow_mut();
            log.view = Some(view);
            log.tiles = Some(tiles.clone());
        }
        Ok(Self { log: Rc::clone(&container.log) })
    }

    fn add_marker(&mut self, at: LatLng, label: &str) -> FakeMarker {
        let marker = FakeMarker {
            state: Rc::new(FakeMarkerState {
                position: at,
                label: label.to_owned(),
                popup_opens: Cell::new(0),
                removed: Cell::new(false),
                click: RefCell::new(None),
            }),
        };
        self.log.borrow_mut().markers.push(marker.clone());
        marker
    }

    fn on_marker_click(&mut self, marker: &FakeMarker, callback: ClickCallback) {
        *marker.state.click.borrow_mut() = Some(callback);
    }

    fn remove_marker(&mut self, marker: &FakeMarker) {
        marker.state.removed.set(true);
        marker.state.click.borrow_mut().take();
        self.log.borrow_mut().removed += 1;
    }

    fn pan_to(&mut self, at: LatLng) {
        self.log.borrow_mut().pans.push(at);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.log.borrow_mut().fits.push(bounds);
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed = true;
    }
}

// =============================================================
// Host
// =============================================================

#[derive(Default)]
pub struct HostState {
    pub topic: Option<String>,
    pub attributes: HashMap<String, String>,
    pub pushed: RefCell<Vec<Frame>>,
    pub closed: Cell<bool>,
    pub dom_ids: RefCell<HashSet<String>>,
    pub scrolled: RefCell<Vec<String>>,
}

/// Recording host. Clones share state.
#[derive(Clone, Default)]
pub struct FakeHost {
    pub state: Rc<HostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::with_attributes(&[])
    }

    pub fn with_attributes(pairs: &[(&str, &str)]) -> Self {
        Self {
            state: Rc::new(HostState {
                topic: Some("map-1".to_owned()),
                attributes: pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
                ..HostState::default()
            }),
        }
    }

    /// Host whose element carries `locations` as its dataset attribute.
    pub fn with_dataset(locations: &[Location]) -> Self {
        let raw = serde_json::to_string(locations).unwrap_or_default();
        Self::with_attributes(&[("data-locations", raw.as_str())])
    }

    pub fn add_dom_id(&self, dom_id: &str) {
        self.state.dom_ids.borrow_mut().insert(dom_id.to_owned());
    }

    pub fn close(&self) {
        self.state.closed.set(true);
    }

    pub fn pushed(&self) -> Vec<Frame> {
        self.state.pushed.borrow().clone()
    }

    pub fn last_pushed(&self) -> Option<Frame> {
        self.state.pushed.borrow().last().cloned()
    }

    pub fn scrolled(&self) -> Vec<String> {
        self.state.scrolled.borrow().clone()
    }
}

impl HookHost for FakeHost {
    fn topic(&self) -> Option<String> {
        self.state.topic.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.attributes.get(name).cloned()
    }

    fn push(&self, frame: &Frame) -> Result<(), ChannelError> {
        if self.state.closed.get() {
            return Err(ChannelError::Closed);
        }
        self.state.pushed.borrow_mut().push(frame.clone());
        Ok(())
    }

    fn scroll_into_view(&self, dom_id: &str) -> bool {
        if self.state.dom_ids.borrow().contains(dom_id) {
            self.state.scrolled.borrow_mut().push(dom_id.to_owned());
            true
        } else {
            false
        }
    }
}

// =============================================================
// Fixtures
// =============================================================

pub fn location(id: i64, lat: f64, lng: f64, name: &str) -> Location {
    Location { id: id.into(), lat, lng, name: name.to_owned() }
}

// =============================================================
// Log capture
// =============================================================

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS.with(|records| records.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Start capturing log records for the current test thread.
pub fn capture_logs() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Warning-level messages logged on this thread since [`capture_logs`].
pub fn warnings() -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
