//! MapLibre style document model.
//!
//! Only the subset this viewer emits is modelled; everything serializes to the
//! exact JSON shape `maplibregl.Map` accepts for `style`, `addSource` and
//! `addLayer`.

use std::collections::BTreeMap;

use foundation::{Color, LngLat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layer::{LayerId, Visibility};

pub const STYLE_VERSION: u8 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub version: u8,
    /// Default camera, used by engines when the map options carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LngLat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    pub sources: BTreeMap<String, SourceSpec>,
    pub layers: Vec<LayerSpec>,
}

impl StyleDocument {
    /// Base style with a single background layer and no sources.
    pub fn with_background(color: Color) -> Self {
        Self {
            version: STYLE_VERSION,
            center: None,
            zoom: None,
            pitch: None,
            bearing: None,
            sources: BTreeMap::new(),
            layers: vec![LayerSpec::background("bg", color)],
        }
    }

    pub fn layer(&self, id: &LayerId) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    Raster {
        tiles: Vec<String>,
        #[serde(rename = "tileSize")]
        tile_size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maxzoom: Option<u8>,
    },
    Vector {
        url: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: LayerId,
    #[serde(flatten)]
    pub kind: LayerKind,
    #[serde(default)]
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerKind {
    Background {
        paint: BackgroundPaint,
    },
    Raster {
        source: String,
        paint: RasterPaint,
    },
    Fill {
        source: String,
        #[serde(rename = "source-layer")]
        source_layer: String,
        paint: FillPaint,
    },
    FillExtrusion {
        source: String,
        #[serde(rename = "source-layer")]
        source_layer: String,
        paint: FillExtrusionPaint,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackgroundPaint {
    pub background_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RasterPaint {
    pub raster_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FillPaint {
    pub fill_color: Value,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FillExtrusionPaint {
    pub fill_extrusion_color: Value,
    pub fill_extrusion_opacity: f64,
    pub fill_extrusion_height: Value,
    pub fill_extrusion_base: f64,
}

impl LayerSpec {
    pub fn background(id: &str, color: Color) -> Self {
        Self {
            id: LayerId::new(id),
            kind: LayerKind::Background {
                paint: BackgroundPaint {
                    background_color: color,
                },
            },
            layout: Layout::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.layout.visibility = visibility;
        self
    }

    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            LayerKind::Background { .. } => None,
            LayerKind::Raster { source, .. }
            | LayerKind::Fill { source, .. }
            | LayerKind::FillExtrusion { source, .. } => Some(source),
        }
    }
}
