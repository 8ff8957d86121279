//! Live map hooks for server-rendered pages.
//!
//! This crate is compiled to WebAssembly and runs in the browser. A page
//! element carrying a map hook gets an interactive Leaflet map whose markers
//! stay in sync with the server over one frame channel: the server pushes
//! `add-marker` / `highlight-marker` commands, and the client reports marker
//! clicks and asks for the initial location set with correlated requests.
//!
//! Everything except [`web`] is plain Rust and runs under `cargo test`; the
//! browser bindings sit behind the `hydrate` feature.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`hook`] | Mounted hook: lifecycle shell around the controller |
//! | [`controller`] | Sync protocol state machine, one per map element |
//! | [`adapter`] | Location-oriented wrapper over a map widget |
//! | [`widget`] | Widget and marker traits the adapter drives |
//! | [`host`] | Hosting page seam: attributes, channel, scrolling |
//! | [`protocol`] | Event names, request builders, payload parsing |
//! | [`pending`] | Correlation table for requests awaiting a reply |
//! | [`reconnect`] | Reconnect delay schedule for the frame socket |
//! | [`config`] | Hook presets and attribute overrides |
//! | [`location`] | Location records and dataset parsing |
//! | [`geo`] | Coordinates, bounds, and view state |
//! | [`consts`] | Shared constants (view defaults, tiles, DOM contract) |

pub mod adapter;
pub mod config;
pub mod consts;
pub mod controller;
pub mod geo;
pub mod hook;
pub mod host;
pub mod location;
pub mod pending;
pub mod protocol;
pub mod reconnect;
pub mod widget;

#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
mod test_fakes;
