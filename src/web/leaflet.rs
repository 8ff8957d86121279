//! Leaflet bindings implementing [`MapWidget`].
//!
//! Expects the global `L` from the Leaflet script tag. Coordinates cross the
//! boundary as `[lat, lng]` arrays, bounds as `[[s, w], [n, e]]`.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::geo::{Bounds, LatLng, MapView};
use crate::widget::{ClickCallback, MapError, MapWidget, MarkerHandle, TileLayerConfig};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Map)]
    type RawMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn new_map(container: &HtmlElement) -> Result<RawMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &RawMap, center: &JsValue, zoom: u8) -> RawMap;

    #[wasm_bindgen(method, js_name = panTo)]
    fn pan_to(this: &RawMap, at: &JsValue) -> RawMap;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &RawMap, bounds: &JsValue) -> RawMap;

    #[wasm_bindgen(method, js_name = remove)]
    fn remove_map(this: &RawMap) -> RawMap;

    type RawTileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn new_tile_layer(url_template: &str, options: &JsValue) -> RawTileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &RawTileLayer, map: &RawMap) -> RawTileLayer;

    #[wasm_bindgen(js_name = Marker)]
    type RawMarker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn new_marker(at: &JsValue) -> RawMarker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &RawMarker, map: &RawMap) -> RawMarker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &RawMarker, content: &str) -> RawMarker;

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &RawMarker) -> RawMarker;

    #[wasm_bindgen(method, js_name = getLatLng)]
    fn get_lat_lng(this: &RawMarker) -> RawLatLng;

    #[wasm_bindgen(method)]
    fn on(this: &RawMarker, event: &str, handler: &js_sys::Function) -> RawMarker;

    #[wasm_bindgen(method)]
    fn off(this: &RawMarker, event: &str, handler: &js_sys::Function) -> RawMarker;

    #[wasm_bindgen(method, js_name = remove)]
    fn remove_marker(this: &RawMarker) -> RawMarker;

    #[wasm_bindgen(js_name = LatLng)]
    type RawLatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &RawLatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &RawLatLng) -> f64;
}

fn lat_lng(at: LatLng) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(at.lat), &JsValue::from_f64(at.lng)).into()
}

fn bounds_value(bounds: Bounds) -> JsValue {
    js_sys::Array::of2(&lat_lng(bounds.south_west), &lat_lng(bounds.north_east)).into()
}

fn tile_options(tiles: &TileLayerConfig) -> Result<JsValue, MapError> {
    let options = serde_json::json!({
        "attribution": tiles.attribution,
        "maxZoom": tiles.max_zoom,
        "tileSize": tiles.tile_size,
        "zoomOffset": tiles.zoom_offset,
    });
    js_sys::JSON::parse(&options.to_string()).map_err(|err| MapError::Bind(format!("tile options: {err:?}")))
}

/// One Leaflet marker. `key` ties it to its click listener.
#[derive(Clone)]
pub struct LeafletMarker {
    raw: JsValue,
    key: u32,
}

impl LeafletMarker {
    fn raw(&self) -> &RawMarker {
        self.raw.unchecked_ref()
    }
}

impl MarkerHandle for LeafletMarker {
    fn position(&self) -> LatLng {
        let at = self.raw().get_lat_lng();
        LatLng::new(at.lat(), at.lng())
    }

    fn open_popup(&self) {
        self.raw().open_popup();
    }
}

/// A Leaflet map bound to one element.
pub struct LeafletWidget {
    map: RawMap,
    next_key: u32,
    listeners: HashMap<u32, Closure<dyn FnMut()>>,
    destroyed: bool,
}

impl MapWidget for LeafletWidget {
    type Container = HtmlElement;
    type Marker = LeafletMarker;

    fn bind(container: &HtmlElement, view: MapView, tiles: &TileLayerConfig) -> Result<Self, MapError> {
        if !container.is_connected() {
            return Err(MapError::ContainerMissing);
        }
        let options = tile_options(tiles)?;
        let map = new_map(container).map_err(|err| MapError::Bind(format!("{err:?}")))?;
        map.set_view(&lat_lng(view.center), view.zoom);
        new_tile_layer(&tiles.url_template, &options).add_to(&map);
        Ok(Self { map, next_key: 0, listeners: HashMap::new(), destroyed: false })
    }

    fn add_marker(&mut self, at: LatLng, label: &str) -> LeafletMarker {
        let raw = new_marker(&lat_lng(at));
        raw.add_to(&self.map).bind_popup(label);
        self.next_key = self.next_key.wrapping_add(1);
        LeafletMarker { raw: raw.into(), key: self.next_key }
    }

    fn on_marker_click(&mut self, marker: &LeafletMarker, callback: ClickCallback) {
        let closure = Closure::wrap(callback);
        marker.raw().on("click", closure.as_ref().unchecked_ref());
        if let Some(previous) = self.listeners.insert(marker.key, closure) {
            marker.raw().off("click", previous.as_ref().unchecked_ref());
        }
    }

    fn remove_marker(&mut self, marker: &LeafletMarker) {
        if let Some(closure) = self.listeners.remove(&marker.key) {
            marker.raw().off("click", closure.as_ref().unchecked_ref());
        }
        marker.raw().remove_marker();
    }

    fn pan_to(&mut self, at: LatLng) {
        self.map.pan_to(&lat_lng(at));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.map.fit_bounds(&bounds_value(bounds));
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        // Removing the map drops its layers, and with them every listener.
        self.map.remove_map();
        self.listeners.clear();
    }
}
