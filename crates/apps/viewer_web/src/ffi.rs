//! Bindings to the page-global `maplibregl` and `pmtiles` scripts.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_namespace = maplibregl)]
extern "C" {
    #[derive(Clone)]
    pub type Map;

    #[wasm_bindgen(constructor)]
    pub fn new(options: &JsValue) -> Map;

    #[wasm_bindgen(method, catch, js_name = addSource)]
    pub fn add_source(this: &Map, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getSource)]
    pub fn get_source(this: &Map, id: &str) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    pub fn add_layer(this: &Map, layer: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getLayer)]
    pub fn get_layer(this: &Map, id: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = setLayoutProperty)]
    pub fn set_layout_property(this: &Map, layer: &str, name: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = getLayoutProperty)]
    pub fn get_layout_property(this: &Map, layer: &str, name: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = easeTo)]
    pub fn ease_to(this: &Map, options: &JsValue);

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = getCenter)]
    pub fn get_center(this: &Map) -> JsValue;

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = getPitch)]
    pub fn get_pitch(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = getBearing)]
    pub fn get_bearing(this: &Map) -> f64;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_layer(this: &Map, event: &str, layer: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    pub fn remove(this: &Map);

    pub type Popup;

    #[wasm_bindgen(constructor)]
    pub fn new() -> Popup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &Popup, at: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setHTML)]
    pub fn set_html(this: &Popup, html: &str) -> Popup;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Popup, map: &Map) -> Popup;

    #[wasm_bindgen(js_name = addProtocol)]
    pub fn add_protocol(scheme: &str, handler: &JsValue);
}

#[wasm_bindgen(js_namespace = pmtiles)]
extern "C" {
    pub type Protocol;

    #[wasm_bindgen(constructor)]
    pub fn new() -> Protocol;

    /// Bound tile loader to hand to `addProtocol`.
    #[wasm_bindgen(method, getter)]
    pub fn tile(this: &Protocol) -> JsValue;

    pub type PMTiles;

    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> PMTiles;

    #[wasm_bindgen(method, js_name = getHeader)]
    pub fn get_header(this: &PMTiles) -> js_sys::Promise;
}
