//! Deployment catalog for the solar roof viewer.
//!
//! One [`ViewerConfig`] describes a whole deployment: which archive to show,
//! how to color it, where the camera starts and which basemaps and toggles
//! exist. Deployments that used to be separate copies of the viewer are
//! entries in [`presets`].

use std::collections::BTreeSet;
use std::path::Path;

use foundation::{Color, LngLat};
use layers::raster::RasterBasemap;
use layers::symbology::ColorRamp;
use layers::vector::{EXTRUSION_LAYER_ID, FILL_LAYER_ID, SolarLayers};
use layers::LayerId;
use serde::{Deserialize, Serialize};
use streaming::ArchiveUrl;
use tracing::debug;

mod presets;
pub use presets::{preset, preset_names, presets};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read failed: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse failed: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "config invalid: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Path or URL the archive reader resolves, without the `pmtiles://` prefix.
    pub path: String,
    #[serde(default = "default_source_id")]
    pub source_id: String,
    #[serde(default = "default_source_layer")]
    pub source_layer: String,
}

fn default_source_id() -> String {
    "solar".to_string()
}

fn default_source_layer() -> String {
    "solar_buildings".to_string()
}

impl ArchiveConfig {
    pub fn url(&self) -> ArchiveUrl {
        ArchiveUrl::new(&self.path)
    }
}

/// Feature property names the viewer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyKeys {
    pub id: String,
    pub height: String,
    pub irradiance: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            height: "height".to_string(),
            irradiance: "global_roof_mean".to_string(),
        }
    }
}

/// Popup row labels, in the same order as [`PropertyKeys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupLabels {
    pub id: String,
    pub height: String,
    pub irradiance: String,
}

impl Default for PopupLabels {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            height: "高さ [m]".to_string(),
            irradiance: "年間累積日射量 [Wh/m²·year]".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub center: LngLat,
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub bearing: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Pitch in degrees applied while the 3D layer is on.
    pub pitch_3d: f64,
    pub ease_duration_ms: u32,
    /// Padding in pixels around the archive bounds when fitting.
    pub fit_padding: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            pitch_3d: 60.0,
            ease_duration_ms: 500,
            fit_padding: 24,
        }
    }
}

/// A checkbox bound to one layer's visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// DOM element id.
    pub id: String,
    pub layer: LayerId,
    /// Also animate the camera pitch with this checkbox.
    #[serde(default)]
    pub couples_pitch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub name: String,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub properties: PropertyKeys,
    pub palette: ColorRamp,
    pub background: Color,
    pub initial_view: InitialView,
    #[serde(default = "default_true")]
    pub hash: bool,
    pub fill_opacity: f64,
    pub extrusion_opacity: f64,
    #[serde(default)]
    pub basemaps: Vec<RasterBasemap>,
    #[serde(default)]
    pub controls: Vec<ControlConfig>,
    #[serde(default)]
    pub popup: PopupLabels,
    #[serde(default)]
    pub camera: CameraSettings,
}

fn default_true() -> bool {
    true
}

const BACKGROUND_LAYER_ID: &str = "bg";

impl ViewerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_json_str(&raw)?;
        debug!("loaded viewer config {:?} from {}", config.name, path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn solar_layers(&self) -> SolarLayers {
        SolarLayers {
            source_id: self.archive.source_id.clone(),
            source_layer: self.archive.source_layer.clone(),
            url: self.archive.url().to_string(),
            height_property: self.properties.height.clone(),
            irradiance_property: self.properties.irradiance.clone(),
            ramp: self.palette.clone(),
            fill_opacity: self.fill_opacity,
            extrusion_opacity: self.extrusion_opacity,
        }
    }

    /// Every layer id the registered style will contain, in draw order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        let mut ids = vec![LayerId::new(BACKGROUND_LAYER_ID)];
        ids.extend(self.basemaps.iter().map(|b| b.layer_id()));
        ids.push(LayerId::new(FILL_LAYER_ID));
        ids.push(LayerId::new(EXTRUSION_LAYER_ID));
        ids
    }

    pub fn control(&self, id: &str) -> Option<&ControlConfig> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.archive.path.trim().is_empty() {
            return invalid("archive.path is empty".to_string());
        }
        if !self.initial_view.center.is_valid() {
            return invalid(format!("initial_view.center {:?} out of range", self.initial_view.center));
        }
        if !(0.0..=24.0).contains(&self.initial_view.zoom) {
            return invalid(format!("initial_view.zoom {} not in [0, 24]", self.initial_view.zoom));
        }
        for (what, pitch) in [
            ("initial_view.pitch", self.initial_view.pitch),
            ("camera.pitch_3d", self.camera.pitch_3d),
        ] {
            if !(0.0..=85.0).contains(&pitch) {
                return invalid(format!("{what} {pitch} not in [0, 85]"));
            }
        }

        let mut opacities = vec![
            ("fill_opacity".to_string(), self.fill_opacity),
            ("extrusion_opacity".to_string(), self.extrusion_opacity),
        ];
        opacities.extend(
            self.basemaps
                .iter()
                .map(|b| (format!("basemaps[{}].opacity", b.id), b.opacity)),
        );
        for (what, v) in opacities {
            if !(0.0..=1.0).contains(&v) {
                return invalid(format!("{what} {v} not in [0, 1]"));
            }
        }

        for b in &self.basemaps {
            if b.tiles.is_empty() {
                return invalid(format!("basemap {:?} has no tile urls", b.id));
            }
        }

        let mut seen = BTreeSet::new();
        for id in self.layer_ids() {
            if !seen.insert(id.clone()) {
                return invalid(format!("duplicate layer id {id}"));
            }
        }
        if self.basemaps.iter().any(|b| b.id == self.archive.source_id) {
            return invalid(format!("duplicate source id {}", self.archive.source_id));
        }

        let mut control_ids = BTreeSet::new();
        for c in &self.controls {
            if !control_ids.insert(c.id.as_str()) {
                return invalid(format!("duplicate control id {}", c.id));
            }
            if !seen.contains(&c.layer) || c.layer.as_str() == BACKGROUND_LAYER_ID {
                return invalid(format!("control {} targets unknown layer {}", c.id, c.layer));
            }
        }
        Ok(())
    }
}
