use serde_json::Value;

use crate::layer::{LayerId, Visibility};
use crate::style::{FillExtrusionPaint, FillPaint, LayerKind, LayerSpec, Layout, SourceSpec};
use crate::symbology::{ColorRamp, numeric_property};

pub const FILL_LAYER_ID: &str = "solar-2d-fill";
pub const EXTRUSION_LAYER_ID: &str = "solar-3d-extrusion";

/// The building solar dataset drawn as a 2D fill and a 3D extrusion.
///
/// Both layers read the same vector source and sub-layer and share the
/// irradiance ramp. The extrusion starts hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarLayers {
    pub source_id: String,
    pub source_layer: String,
    /// Archive-backed URL, e.g. `pmtiles://./tiles/x.pmtiles`.
    pub url: String,
    pub height_property: String,
    pub irradiance_property: String,
    pub ramp: ColorRamp,
    pub fill_opacity: f64,
    pub extrusion_opacity: f64,
}

impl SolarLayers {
    pub fn source(&self) -> SourceSpec {
        SourceSpec::Vector {
            url: self.url.clone(),
        }
    }

    fn color(&self) -> Value {
        self.ramp.to_expression(&self.irradiance_property)
    }

    pub fn fill_layer(&self) -> LayerSpec {
        LayerSpec {
            id: LayerId::new(FILL_LAYER_ID),
            kind: LayerKind::Fill {
                source: self.source_id.clone(),
                source_layer: self.source_layer.clone(),
                paint: FillPaint {
                    fill_color: self.color(),
                    fill_opacity: self.fill_opacity,
                },
            },
            layout: Layout::default(),
        }
    }

    pub fn extrusion_layer(&self) -> LayerSpec {
        LayerSpec {
            id: LayerId::new(EXTRUSION_LAYER_ID),
            kind: LayerKind::FillExtrusion {
                source: self.source_id.clone(),
                source_layer: self.source_layer.clone(),
                paint: FillExtrusionPaint {
                    fill_extrusion_color: self.color(),
                    fill_extrusion_opacity: self.extrusion_opacity,
                    fill_extrusion_height: numeric_property(&self.height_property),
                    fill_extrusion_base: 0.0,
                },
            },
            layout: Layout {
                visibility: Visibility::None,
            },
        }
    }

    /// Layers that respond to feature clicks.
    pub fn clickable_layers(&self) -> [LayerId; 2] {
        [LayerId::new(FILL_LAYER_ID), LayerId::new(EXTRUSION_LAYER_ID)]
    }
}
