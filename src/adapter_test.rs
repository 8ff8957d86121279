use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::geo::LatLng;
use crate::test_fakes::{FakeContainer, FakeWidget, capture_logs, location, warnings};

fn view() -> MapView {
    MapView { center: LatLng::new(58.6307, 25.3397), zoom: 7 }
}

fn mounted() -> (FakeContainer, MapAdapter<FakeWidget>) {
    let container = FakeContainer::attached();
    let adapter = MapAdapter::initialize(&container, view(), &TileLayerConfig::default()).expect("bind");
    (container, adapter)
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_binds_view_and_tiles() {
    let (container, adapter) = mounted();
    assert!(adapter.is_empty());
    let log = container.log();
    assert_eq!(log.view, Some(view()));
    assert_eq!(log.tiles, Some(TileLayerConfig::default()));
}

#[test]
fn initialize_fails_on_detached_container() {
    let container = FakeContainer::detached();
    let result = MapAdapter::<FakeWidget>::initialize(&container, view(), &TileLayerConfig::default());
    assert!(matches!(result, Err(MapError::ContainerMissing)));
    assert!(container.log().view.is_none());
}

// =============================================================
// add_marker
// =============================================================

#[test]
fn add_marker_renders_at_location_with_label() {
    let (container, mut adapter) = mounted();
    let marker = adapter.add_marker(&location(1, 58.63, 25.34, "Tartu"));
    assert_eq!(marker.position(), LatLng::new(58.63, 25.34));
    assert_eq!(marker.state.label, "Tartu");
    assert_eq!(adapter.len(), 1);
    assert_eq!(container.log().live_markers().len(), 1);
}

#[test]
fn distinct_ids_each_get_a_marker() {
    let (container, mut adapter) = mounted();
    for id in 1..=5_i32 {
        adapter.add_marker(&location(i64::from(id), 58.0 + 0.1 * f64::from(id), 25.0, "x"));
    }
    assert_eq!(adapter.len(), 5);
    assert_eq!(container.log().live_markers().len(), 5);
}

#[test]
fn duplicate_id_replaces_previous_marker() {
    let (container, mut adapter) = mounted();
    let first = adapter.add_marker(&location(7, 58.0, 25.0, "old"));
    adapter.add_marker(&location(7, 59.0, 24.0, "new"));

    assert_eq!(adapter.len(), 1);
    assert!(first.is_removed());
    let log = container.log();
    assert_eq!(log.live_markers().len(), 1);
    assert!(log.marker_labelled("new").is_some());
    assert_eq!(adapter.location(&LocationId::Int(7)).map(|l| l.name.as_str()), Some("new"));
}

#[test]
fn shared_coordinates_do_not_collide() {
    let (_container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.0, 25.0, "a"));
    adapter.add_marker(&location(2, 58.0, 25.0, "b"));
    assert_eq!(adapter.len(), 2);
}

// =============================================================
// highlight_marker
// =============================================================

#[test]
fn highlight_opens_popup_and_pans() {
    let (container, mut adapter) = mounted();
    let tartu = location(1, 58.38, 26.72, "Tartu");
    let marker = adapter.add_marker(&tartu);

    assert!(adapter.highlight_marker(&tartu));
    assert_eq!(marker.popup_opens(), 1);
    assert_eq!(container.log().pans, vec![LatLng::new(58.38, 26.72)]);
}

#[test]
fn highlight_uses_id_not_coordinates() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.38, 26.72, "Tartu"));
    // Same id, stale coordinates in the command: the rendered marker wins.
    assert!(adapter.highlight_marker(&location(1, 0.0, 0.0, "Tartu")));
    assert_eq!(container.log().pans, vec![LatLng::new(58.38, 26.72)]);
}

#[test]
fn highlight_miss_logs_once_and_leaves_view() {
    capture_logs();
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.0, 25.0, "a"));

    assert!(!adapter.highlight_marker(&location(99, 58.0, 25.0, "ghost")));

    let warned = warnings();
    assert_eq!(warned.len(), 1);
    assert!(warned[0].contains("99"));
    assert!(container.log().pans.is_empty());
}

#[test]
fn add_then_highlight_targets_new_marker() {
    let (container, mut adapter) = mounted();
    let parnu = location(3, 58.38, 24.5, "Pärnu");
    let marker = adapter.add_marker(&parnu);
    assert!(adapter.highlight_marker(&parnu));
    assert_eq!(marker.popup_opens(), 1);
    assert_eq!(container.log().pans.last(), Some(&LatLng::new(58.38, 24.5)));
}

// =============================================================
// fit_markers
// =============================================================

#[test]
fn fit_on_empty_map_is_noop() {
    let (container, mut adapter) = mounted();
    assert!(!adapter.fit_markers());
    assert!(container.log().fits.is_empty());
}

#[test]
fn fit_covers_every_marker() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.0, 24.0, "a"));
    adapter.add_marker(&location(2, 59.0, 27.0, "b"));
    adapter.add_marker(&location(3, 58.5, 25.0, "c"));

    assert!(adapter.fit_markers());
    let log = container.log();
    assert_eq!(log.fits.len(), 1);
    let bounds = log.fits[0];
    assert_eq!(bounds.south_west, LatLng::new(58.0, 24.0));
    assert_eq!(bounds.north_east, LatLng::new(59.0, 27.0));
}

#[test]
fn single_marker_fit_is_degenerate_bounds() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.63, 25.34, "A"));
    assert!(adapter.fit_markers());
    let bounds = container.log().fits[0];
    assert_eq!(bounds.south_west, bounds.north_east);
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn click_opens_popup_and_reports_id() {
    let (container, mut adapter) = mounted();
    let seen: Rc<RefCell<Vec<LocationId>>> = Rc::default();
    let sink = Rc::clone(&seen);
    adapter.set_click_handler(Rc::new(move |id: &LocationId| sink.borrow_mut().push(id.clone())));
    adapter.add_marker(&location(4, 58.0, 25.0, "Viljandi"));

    let marker = container.log().marker_labelled("Viljandi").expect("marker");
    marker.click();

    assert_eq!(marker.popup_opens(), 1);
    assert_eq!(*seen.borrow(), vec![LocationId::Int(4)]);
}

#[test]
fn handler_installed_after_marker_still_fires() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(4, 58.0, 25.0, "late"));
    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    adapter.set_click_handler(Rc::new(move |_: &LocationId| *sink.borrow_mut() += 1));

    container.log().marker_labelled("late").expect("marker").click();
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn click_without_handler_only_opens_popup() {
    let (container, mut adapter) = mounted();
    let marker = adapter.add_marker(&location(4, 58.0, 25.0, "quiet"));
    marker.click();
    assert_eq!(container.log().live_markers().len(), 1);
    assert_eq!(marker.popup_opens(), 1);
}

// =============================================================
// remove / clear / teardown
// =============================================================

#[test]
fn remove_marker_reports_presence() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.0, 25.0, "a"));
    assert!(adapter.remove_marker(&LocationId::Int(1)));
    assert!(!adapter.remove_marker(&LocationId::Int(1)));
    assert!(adapter.is_empty());
    assert_eq!(container.log().removed, 1);
}

#[test]
fn clear_removes_everything() {
    let (container, mut adapter) = mounted();
    adapter.add_marker(&location(1, 58.0, 25.0, "a"));
    adapter.add_marker(&location(2, 59.0, 25.0, "b"));
    adapter.clear();
    assert!(adapter.is_empty());
    assert!(container.log().live_markers().is_empty());
    assert!(adapter.bounds().is_none());
}

#[test]
fn teardown_destroys_widget_and_stops_clicks() {
    let (container, mut adapter) = mounted();
    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    adapter.set_click_handler(Rc::new(move |_: &LocationId| *sink.borrow_mut() += 1));
    let marker = adapter.add_marker(&location(1, 58.0, 25.0, "a"));

    adapter.teardown();

    let log = container.log();
    assert!(log.destroyed);
    assert!(log.live_markers().is_empty());
    assert!(!marker.has_listener());
    drop(log);
    marker.click();
    assert_eq!(*hits.borrow(), 0);
}
