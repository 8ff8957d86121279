//! Shared constants for the map hooks.

// ── View defaults ───────────────────────────────────────────────

/// Initial center for dataset maps (lat, lng).
pub const DATASET_CENTER: (f64, f64) = (58.6307, 25.3397);

/// Initial center for push-event maps (lat, lng).
pub const PUSH_EVENTS_CENTER: (f64, f64) = (58.668_252, 25.048_828);

/// Initial zoom level for every preset.
pub const DEFAULT_ZOOM: u8 = 7;

// ── Tiles ───────────────────────────────────────────────────────

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>";

/// Highest zoom the tile layer serves; also the upper bound for `data-zoom`.
pub const MAX_ZOOM: u8 = 18;

pub const TILE_SIZE: u32 = 512;

/// 512px tiles are served one zoom level down.
pub const ZOOM_OFFSET: i8 = -1;

// ── DOM contract ────────────────────────────────────────────────

/// Attribute carrying the JSON-encoded dataset for client-push maps.
pub const ATTR_LOCATIONS: &str = "data-locations";
pub const ATTR_HOOK: &str = "data-hook";
pub const ATTR_CENTER: &str = "data-center";
pub const ATTR_ZOOM: &str = "data-zoom";
pub const ATTR_HIGHLIGHT_MISSING: &str = "data-highlight-missing";

/// Prefix of the element id each location row carries on the page.
pub const LOCATION_DOM_PREFIX: &str = "location-";

// ── Socket ──────────────────────────────────────────────────────

pub const RECONNECT_BACKOFF_START_MS: u32 = 1000;
pub const RECONNECT_BACKOFF_MAX_MS: u32 = 10_000;

/// Socket path used when `init` is not given an explicit URL.
pub const SOCKET_PATH: &str = "/api/ws";
