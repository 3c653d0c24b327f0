//! An in-memory [`MapEngine`].
//!
//! Applies every operation to a style document and a camera without drawing
//! anything. The CLI uses it to resolve the complete style for a deployment;
//! tests use it to observe what a session did.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use foundation::{LngLat, LngLatBounds};
use layers::{LayerId, LayerSpec, SourceSpec, StyleDocument, Visibility};

use crate::engine::{CameraState, EaseOptions, EngineError, FitOptions, MapEngine, MapOptions};

/// Pixel size of the world at zoom 0.
const WORLD_TILE_PX: f64 = 512.0;
const MAX_ZOOM: f64 = 22.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub at: LngLat,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    style: StyleDocument,
    camera: CameraState,
    viewport: (f64, f64),
    protocols: BTreeSet<String>,
    click_layers: BTreeSet<LayerId>,
    popups: Vec<Popup>,
    eases: Vec<EaseOptions>,
    fits: Vec<(LngLatBounds, FitOptions)>,
}

impl HeadlessMap {
    pub fn new(options: &MapOptions) -> Self {
        Self {
            style: options.style.clone(),
            camera: options.camera(),
            viewport: (1280.0, 720.0),
            protocols: BTreeSet::new(),
            click_layers: BTreeSet::new(),
            popups: Vec::new(),
            eases: Vec::new(),
            fits: Vec::new(),
        }
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = (width.max(1.0), height.max(1.0));
        self
    }

    pub fn style(&self) -> &StyleDocument {
        &self.style
    }

    /// The current style with the camera folded in as its default view.
    pub fn resolved_style(&self) -> StyleDocument {
        let mut style = self.style.clone();
        style.center = Some(self.camera.center);
        style.zoom = Some(self.camera.zoom);
        style.pitch = Some(self.camera.pitch);
        style.bearing = Some(self.camera.bearing);
        style
    }

    pub fn has_protocol(&self, scheme: &str) -> bool {
        self.protocols.contains(scheme)
    }

    pub fn click_layers(&self) -> &BTreeSet<LayerId> {
        &self.click_layers
    }

    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    pub fn eases(&self) -> &[EaseOptions] {
        &self.eases
    }

    pub fn fits(&self) -> &[(LngLatBounds, FitOptions)] {
        &self.fits
    }
}

impl MapEngine for HeadlessMap {
    fn add_protocol(&mut self, scheme: &str) -> Result<(), EngineError> {
        self.protocols.insert(scheme.to_string());
        Ok(())
    }

    fn add_source(&mut self, id: &str, source: &SourceSpec) -> Result<(), EngineError> {
        if self.style.sources.contains_key(id) {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        self.style.sources.insert(id.to_string(), source.clone());
        Ok(())
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), EngineError> {
        if self.style.layer(&layer.id).is_some() {
            return Err(EngineError::DuplicateLayer(layer.id.clone()));
        }
        if let Some(source) = layer.source() {
            if !self.style.sources.contains_key(source) {
                return Err(EngineError::UnknownSource(source.to_string()));
            }
        }
        self.style.layers.push(layer.clone());
        Ok(())
    }

    fn set_visibility(
        &mut self,
        layer: &LayerId,
        visibility: Visibility,
    ) -> Result<(), EngineError> {
        let spec = self
            .style
            .layer_mut(layer)
            .ok_or_else(|| EngineError::UnknownLayer(layer.clone()))?;
        spec.layout.visibility = visibility;
        Ok(())
    }

    fn visibility(&self, layer: &LayerId) -> Option<Visibility> {
        self.style.layer(layer).map(|l| l.layout.visibility)
    }

    fn subscribe_layer_click(&mut self, layer: &LayerId) -> Result<(), EngineError> {
        self.click_layers.insert(layer.clone());
        Ok(())
    }

    fn show_popup(&mut self, at: LngLat, html: &str) {
        self.popups.push(Popup {
            at,
            html: html.to_string(),
        });
    }

    // Transitions complete instantly; the log keeps what was requested.
    fn ease_to(&mut self, ease: EaseOptions) {
        if let Some(pitch) = ease.pitch {
            self.camera.pitch = pitch;
        }
        self.eases.push(ease);
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, fit: FitOptions) {
        let (center, zoom) = fit_camera(bounds, self.viewport, fit.padding as f64);
        self.camera.center = center;
        self.camera.zoom = zoom;
        self.fits.push((bounds, fit));
    }

    fn camera(&self) -> CameraState {
        self.camera
    }
}

fn mercator_x(lng: f64) -> f64 {
    (lng + 180.0) / 360.0
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.to_radians();
    (1.0 - (PI / 4.0 + phi / 2.0).tan().ln() / PI) / 2.0
}

fn mercator_y_to_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Center and zoom that show `bounds` inside `viewport` minus `padding`.
fn fit_camera(bounds: LngLatBounds, viewport: (f64, f64), padding: f64) -> (LngLat, f64) {
    let x0 = mercator_x(bounds.sw.lng);
    let mut x1 = mercator_x(bounds.ne.lng);
    if x1 < x0 {
        x1 += 1.0;
    }
    let y_north = mercator_y(bounds.ne.lat);
    let y_south = mercator_y(bounds.sw.lat);

    let center = LngLat::new(bounds.center().lng, mercator_y_to_lat((y_north + y_south) / 2.0));

    let avail_w = (viewport.0 - 2.0 * padding).max(1.0);
    let avail_h = (viewport.1 - 2.0 * padding).max(1.0);
    let span_w = (x1 - x0) * WORLD_TILE_PX;
    let span_h = (y_south - y_north) * WORLD_TILE_PX;

    let scale = match (span_w > 0.0, span_h > 0.0) {
        (false, false) => return (center, MAX_ZOOM),
        (true, false) => avail_w / span_w,
        (false, true) => avail_h / span_h,
        (true, true) => (avail_w / span_w).min(avail_h / span_h),
    };
    (center, scale.log2().clamp(0.0, MAX_ZOOM))
}
