use foundation::{LngLat, LngLatBounds};
use js_sys::Reflect;
use layers::{LayerId, LayerSpec, SourceSpec, Visibility};
use runtime::MapEvent;
use serde::Serialize;
use viewer::{CameraState, EaseOptions, EngineError, FitOptions, MapEngine};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::ffi;

pub(crate) type Listener = Closure<dyn FnMut(JsValue)>;

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let raw = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&raw)
}

fn to_backend<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, EngineError> {
    to_js(value).map_err(|e| EngineError::Backend(format!("{e:?}")))
}

fn get_f64(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key)).ok()?.as_f64()
}

fn lng_lat(obj: &JsValue) -> Option<LngLat> {
    Some(LngLat::new(get_f64(obj, "lng")?, get_f64(obj, "lat")?))
}

fn properties(obj: &JsValue) -> serde_json::Value {
    let props = Reflect::get(obj, &JsValue::from_str("properties")).unwrap_or(JsValue::NULL);
    let raw = js_sys::JSON::stringify(&props)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_default();
    serde_json::from_str(&raw).unwrap_or_default()
}

/// Translates a maplibre layer click event.
pub(crate) fn click_event(layer: &LayerId, event: &JsValue) -> Option<MapEvent> {
    let at = Reflect::get(event, &JsValue::from_str("lngLat")).unwrap_or(JsValue::UNDEFINED);
    let features: Vec<serde_json::Value> = Reflect::get(event, &JsValue::from_str("features"))
        .ok()
        .filter(|v| js_sys::Array::is_array(v))
        .map(|v| v.unchecked_into::<js_sys::Array>().iter().map(|f| properties(&f)).collect())
        .unwrap_or_default();
    MapEvent::click(layer.clone(), get_f64(&at, "lng"), get_f64(&at, "lat"), features)
}

/// [`MapEngine`] over a `maplibregl.Map`.
pub struct WebMap {
    map: ffi::Map,
    // Kept alive for as long as the map may call them.
    protocol: Option<ffi::Protocol>,
    listeners: Vec<Listener>,
    on_click: fn(MapEvent),
}

impl WebMap {
    pub fn new(map: ffi::Map, on_click: fn(MapEvent)) -> Self {
        Self {
            map,
            protocol: None,
            listeners: Vec::new(),
            on_click,
        }
    }

    pub fn map(&self) -> &ffi::Map {
        &self.map
    }

    pub fn keep_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }
}

impl MapEngine for WebMap {
    fn add_protocol(&mut self, scheme: &str) -> Result<(), EngineError> {
        let protocol = ffi::Protocol::new();
        ffi::add_protocol(scheme, &protocol.tile());
        self.protocol = Some(protocol);
        Ok(())
    }

    fn add_source(&mut self, id: &str, source: &SourceSpec) -> Result<(), EngineError> {
        if !self.map.get_source(id).is_undefined() {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        self.map
            .add_source(id, &to_backend(source)?)
            .map_err(|e| EngineError::Backend(format!("addSource {id}: {e:?}")))
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), EngineError> {
        if !self.map.get_layer(layer.id.as_str()).is_undefined() {
            return Err(EngineError::DuplicateLayer(layer.id.clone()));
        }
        self.map
            .add_layer(&to_backend(layer)?)
            .map_err(|e| EngineError::Backend(format!("addLayer {}: {e:?}", layer.id)))
    }

    fn set_visibility(
        &mut self,
        layer: &LayerId,
        visibility: Visibility,
    ) -> Result<(), EngineError> {
        if self.map.get_layer(layer.as_str()).is_undefined() {
            return Err(EngineError::UnknownLayer(layer.clone()));
        }
        self.map.set_layout_property(
            layer.as_str(),
            "visibility",
            &JsValue::from_str(visibility.as_str()),
        );
        Ok(())
    }

    fn visibility(&self, layer: &LayerId) -> Option<Visibility> {
        if self.map.get_layer(layer.as_str()).is_undefined() {
            return None;
        }
        // An unset layout property means the style default, which is visible.
        let value = self.map.get_layout_property(layer.as_str(), "visibility");
        Some(match value.as_string().as_deref() {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        })
    }

    fn subscribe_layer_click(&mut self, layer: &LayerId) -> Result<(), EngineError> {
        let on_click = self.on_click;
        let id = layer.clone();
        let listener = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if let Some(ev) = click_event(&id, &event) {
                on_click(ev);
            }
        });
        self.map
            .on_layer("click", layer.as_str(), listener.as_ref().unchecked_ref());
        self.listeners.push(listener);
        Ok(())
    }

    fn show_popup(&mut self, at: LngLat, html: &str) {
        let at: JsValue = js_sys::Array::of2(&at.lng.into(), &at.lat.into()).into();
        ffi::Popup::new()
            .set_lng_lat(&at)
            .set_html(html)
            .add_to(&self.map);
    }

    fn ease_to(&mut self, ease: EaseOptions) {
        match to_js(&ease) {
            Ok(opts) => self.map.ease_to(&opts),
            Err(e) => web_sys::console::warn_1(&e),
        }
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, fit: FitOptions) {
        match (to_js(&bounds.corners()), to_js(&fit)) {
            (Ok(b), Ok(opts)) => self.map.fit_bounds(&b, &opts),
            (Err(e), _) | (_, Err(e)) => web_sys::console::warn_1(&e),
        }
    }

    fn camera(&self) -> CameraState {
        CameraState {
            center: lng_lat(&self.map.get_center()).unwrap_or(LngLat::new(0.0, 0.0)),
            zoom: self.map.get_zoom(),
            pitch: self.map.get_pitch(),
            bearing: self.map.get_bearing(),
        }
    }
}
