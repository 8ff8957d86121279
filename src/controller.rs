//! Sync controller: one per mounted map element.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller sits between the [`MapAdapter`] and the channel to the
//! server. It applies inbound commands and replies to the map, turns marker
//! clicks into `marker-clicked` requests, and keeps the correlation table of
//! requests awaiting a reply.
//!
//! LIFECYCLE
//! =========
//! `Unmounted -> Mounting -> Active -> Unmounted`. Mounting is all-or-nothing:
//! the dataset is parsed and validated before the widget is bound, so a bad
//! attribute never leaves a half-populated map behind. Unmounting discards
//! every pending request and tears the adapter down; frames arriving after
//! that are dropped.
//!
//! ERROR HANDLING
//! ==============
//! Binding, configuration, and dataset errors abort the mount and are
//! returned. Everything after mount (lookup misses, channel failures, error
//! replies, malformed payloads) is logged and leaves the map unchanged.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use frames::{Frame, Status};

use crate::adapter::{MapAdapter, MarkerClickHandler};
use crate::config::{ConfigError, InitialLocations, MissingMarkerPolicy, SyncConfig};
use crate::consts::ATTR_LOCATIONS;
use crate::host::HookHost;
use crate::location::{DatasetError, LocationId, location_dom_id, parse_dataset};
use crate::pending::PendingRequests;
use crate::protocol::{
    Command, Inbound, classify, error_message, get_locations_request, marker_clicked_request, parse_command,
    parse_location_reply, parse_locations_reply,
};
use crate::widget::{MapError, MapWidget};

/// Lifecycle state of a mounted element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MountState {
    #[default]
    Unmounted,
    /// Binding the widget and issuing the initial request.
    Mounting,
    /// Handling commands, replies, and clicks.
    Active,
}

/// What to do with the reply to an outstanding request.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyHandler {
    /// `get-locations`: add every returned location, then fit the view.
    LoadLocations,
    /// `marker-clicked`: scroll the page to the returned location.
    ScrollToLocation { clicked: LocationId },
}

/// Error returned when a mount cannot complete.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("hook is already mounted")]
    AlreadyMounted,
    #[error("missing `{0}` attribute")]
    MissingDataset(&'static str),
    #[error("invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("invalid hook configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
}

pub struct SyncController<W: MapWidget, H: HookHost> {
    host: H,
    config: SyncConfig,
    state: MountState,
    adapter: Option<MapAdapter<W>>,
    pending: PendingRequests<ReplyHandler>,
}

impl<W: MapWidget, H: HookHost> SyncController<W, H> {
    #[must_use]
    pub fn new(host: H, config: SyncConfig) -> Self {
        Self { host, config, state: MountState::Unmounted, adapter: None, pending: PendingRequests::new() }
    }

    // --- Lifecycle ---

    /// Bind the map inside `container` and load the initial markers.
    ///
    /// `on_click` is installed only when the config reports clicks.
    ///
    /// # Errors
    ///
    /// Returns [`MountError`] if the controller is already mounted, the
    /// dataset is missing or invalid, or the widget cannot bind. On error the
    /// controller is back in [`MountState::Unmounted`] with no map.
    pub fn mount(&mut self, container: &W::Container, on_click: Option<MarkerClickHandler>) -> Result<(), MountError> {
        if self.state != MountState::Unmounted {
            return Err(MountError::AlreadyMounted);
        }
        self.state = MountState::Mounting;

        let adapter = match self.build_adapter(container, on_click) {
            Ok(adapter) => adapter,
            Err(err) => {
                log::warn!("map mount aborted: {err}");
                self.state = MountState::Unmounted;
                return Err(err);
            }
        };
        log::info!("map mounted with {} marker(s)", adapter.len());
        self.adapter = Some(adapter);

        if self.config.initial == InitialLocations::Request {
            self.request_locations();
        }
        self.state = MountState::Active;
        Ok(())
    }

    fn build_adapter(
        &self,
        container: &W::Container,
        on_click: Option<MarkerClickHandler>,
    ) -> Result<MapAdapter<W>, MountError> {
        // Parse before binding so a bad dataset never reaches the widget.
        let dataset = match self.config.initial {
            InitialLocations::Dataset => {
                let raw = self
                    .host
                    .attribute(ATTR_LOCATIONS)
                    .ok_or(MountError::MissingDataset(ATTR_LOCATIONS))?;
                parse_dataset(&raw)?
            }
            InitialLocations::None | InitialLocations::Request => Vec::new(),
        };

        let mut adapter = MapAdapter::initialize(container, self.config.view, &self.config.tiles)?;
        if self.config.report_clicks {
            if let Some(handler) = on_click {
                adapter.set_click_handler(handler);
            }
        }
        if self.config.initial == InitialLocations::Dataset {
            for location in &dataset {
                adapter.add_marker(location);
            }
            adapter.fit_markers();
        }
        Ok(adapter)
    }

    /// Discard pending requests and tear the map down. Idempotent.
    pub fn unmount(&mut self) {
        if self.state == MountState::Unmounted {
            return;
        }
        let discarded = self.pending.clear();
        if discarded > 0 {
            log::debug!("map unmount discarded {discarded} pending request(s)");
        }
        if let Some(adapter) = self.adapter.take() {
            adapter.teardown();
        }
        self.state = MountState::Unmounted;
        log::info!("map unmounted");
    }

    // --- Inbound ---

    /// Apply one inbound frame, in delivery order.
    pub fn handle_frame(&mut self, frame: &Frame) {
        if self.state != MountState::Active {
            log::warn!("{}: map not active, frame dropped", frame.event);
            return;
        }
        match classify(frame) {
            Inbound::Reply { request_id, status, data } => self.handle_reply(request_id, status, data),
            Inbound::Command { event, data } => self.handle_command(event, data),
        }
    }

    fn handle_command(&mut self, event: &str, data: &serde_json::Value) {
        if !self.config.commands {
            log::debug!("{event}: commands disabled for this map, ignored");
            return;
        }
        match parse_command(event, data) {
            Ok(command) => {
                self.apply_command(command);
            }
            Err(err) => log::warn!("{event}: {err}"),
        }
    }

    /// Apply a decoded command. Returns `true` if a marker was highlighted.
    pub fn apply_command(&mut self, command: Command) -> bool {
        let policy = self.config.missing_highlight;
        let Some(adapter) = self.adapter.as_mut() else {
            log::warn!("map command received without a mounted map");
            return false;
        };
        match command {
            Command::AddMarker(location) => {
                adapter.add_marker(&location);
                adapter.highlight_marker(&location)
            }
            Command::HighlightMarker(location) => {
                if policy == MissingMarkerPolicy::AddThenHighlight && !adapter.contains(&location.id) {
                    adapter.add_marker(&location);
                }
                adapter.highlight_marker(&location)
            }
        }
    }

    fn handle_reply(&mut self, request_id: &str, status: Status, data: &serde_json::Value) {
        let Some(pending) = self.pending.take(request_id) else {
            log::debug!("reply for unknown request {request_id} ignored");
            return;
        };
        if status == Status::Error {
            let message = error_message(data).unwrap_or("request failed");
            log::warn!("{}: {message}", pending.event);
            return;
        }
        match pending.on_reply {
            ReplyHandler::LoadLocations => self.load_locations(data),
            ReplyHandler::ScrollToLocation { clicked } => self.scroll_to_reply(&clicked, data),
        }
    }

    fn load_locations(&mut self, data: &serde_json::Value) {
        let locations = match parse_locations_reply(data) {
            Ok(locations) => locations,
            Err(err) => {
                log::warn!("get-locations: {err}");
                return;
            }
        };
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        for location in &locations {
            adapter.add_marker(location);
        }
        adapter.fit_markers();
    }

    fn scroll_to_reply(&self, clicked: &LocationId, data: &serde_json::Value) {
        let location = match parse_location_reply(data) {
            Ok(location) => location,
            Err(err) => {
                log::warn!("marker-clicked: {err}");
                return;
            }
        };
        if &location.id != clicked {
            log::debug!("marker-clicked: clicked {clicked}, server answered {}", location.id);
        }
        let dom_id = location_dom_id(&location.id);
        if !self.host.scroll_into_view(&dom_id) {
            log::warn!("marker-clicked: no element #{dom_id} to scroll to");
        }
    }

    /// The channel dropped: nothing in flight will be answered.
    pub fn channel_closed(&mut self) {
        let discarded = self.pending.clear();
        if discarded > 0 {
            log::warn!("channel closed, discarded {discarded} pending request(s)");
        }
    }

    // --- Outbound ---

    /// Send `marker-clicked` for `id` when click reporting is on.
    pub fn on_marker_clicked(&mut self, id: &LocationId) -> bool {
        if self.state != MountState::Active || !self.config.report_clicks {
            log::debug!("marker {id} clicked, not reported");
            return false;
        }
        let frame = marker_clicked_request(self.host.topic(), id);
        self.send_request(&frame, ReplyHandler::ScrollToLocation { clicked: id.clone() })
    }

    /// Ask the server for the full location set.
    pub fn request_locations(&mut self) -> bool {
        let frame = get_locations_request(self.host.topic());
        self.send_request(&frame, ReplyHandler::LoadLocations)
    }

    fn send_request(&mut self, frame: &Frame, on_reply: ReplyHandler) -> bool {
        self.pending.register(&frame.id, &frame.event, on_reply);
        match self.host.push(frame) {
            Ok(()) => true,
            Err(err) => {
                self.pending.take(&frame.id);
                log::warn!("{}: send failed: {err}", frame.event);
                false
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> MountState {
        self.state
    }

    #[must_use]
    pub fn adapter(&self) -> Option<&MapAdapter<W>> {
        self.adapter.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, request_id: &str) -> bool {
        self.pending.contains(request_id)
    }
}

impl<W: MapWidget, H: HookHost> Drop for SyncController<W, H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
