//! The seam between the viewer and a map rendering engine.

use foundation::{LngLat, LngLatBounds};
use layers::{LayerId, LayerSpec, SourceSpec, StyleDocument, Visibility};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    DuplicateSource(String),
    DuplicateLayer(LayerId),
    UnknownSource(String),
    UnknownLayer(LayerId),
    /// Failure reported by the engine itself (e.g. a JS exception).
    Backend(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DuplicateSource(id) => write!(f, "source {id:?} already exists"),
            EngineError::DuplicateLayer(id) => write!(f, "layer {id:?} already exists"),
            EngineError::UnknownSource(id) => write!(f, "source {id:?} does not exist"),
            EngineError::UnknownLayer(id) => write!(f, "layer {id:?} does not exist"),
            EngineError::Backend(msg) => write!(f, "map engine error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Camera position as the engine reports it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CameraState {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

/// Eased camera transition. Unset fields keep their current value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct EaseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(rename = "duration")]
    pub duration_ms: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FitOptions {
    pub padding: u32,
    #[serde(rename = "duration")]
    pub duration_ms: u32,
}

/// Construction options for a map view; serializes to the engine's option
/// object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOptions {
    pub container: String,
    pub style: StyleDocument,
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    /// Mirror center/zoom/pitch/bearing into the URL fragment.
    pub hash: bool,
}

impl MapOptions {
    pub fn camera(&self) -> CameraState {
        CameraState {
            center: self.center,
            zoom: self.zoom,
            pitch: self.pitch,
            bearing: self.bearing,
        }
    }
}

/// Operations the viewer needs from a constructed map view.
///
/// Everything runs on one thread; implementations need not be `Send`.
pub trait MapEngine {
    /// Route `scheme://` URLs to the tile-archive protocol handler.
    fn add_protocol(&mut self, scheme: &str) -> Result<(), EngineError>;

    fn add_source(&mut self, id: &str, source: &SourceSpec) -> Result<(), EngineError>;

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), EngineError>;

    fn set_visibility(&mut self, layer: &LayerId, visibility: Visibility)
    -> Result<(), EngineError>;

    /// Current layout visibility, or `None` for a layer the map does not have.
    fn visibility(&self, layer: &LayerId) -> Option<Visibility>;

    /// Start delivering click events for `layer`.
    fn subscribe_layer_click(&mut self, layer: &LayerId) -> Result<(), EngineError>;

    /// Open a new popup. Earlier popups stay open.
    fn show_popup(&mut self, at: LngLat, html: &str);

    fn ease_to(&mut self, ease: EaseOptions);

    fn fit_bounds(&mut self, bounds: LngLatBounds, fit: FitOptions);

    fn camera(&self) -> CameraState;
}
