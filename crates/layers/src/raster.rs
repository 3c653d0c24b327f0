use serde::{Deserialize, Serialize};

use crate::layer::{LayerId, Visibility};
use crate::style::{LayerKind, LayerSpec, Layout, RasterPaint, SourceSpec};

/// A raster tile basemap: one source plus the single layer drawing it.
///
/// The source and layer share `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterBasemap {
    pub id: String,
    pub tiles: Vec<String>,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub max_zoom: Option<u8>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_tile_size() -> u32 {
    256
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl RasterBasemap {
    pub fn layer_id(&self) -> LayerId {
        LayerId::new(&self.id)
    }

    pub fn source(&self) -> SourceSpec {
        SourceSpec::Raster {
            tiles: self.tiles.clone(),
            tile_size: self.tile_size,
            attribution: self.attribution.clone(),
            maxzoom: self.max_zoom,
        }
    }

    pub fn layer(&self) -> LayerSpec {
        LayerSpec {
            id: self.layer_id(),
            kind: LayerKind::Raster {
                source: self.id.clone(),
                paint: RasterPaint {
                    raster_opacity: self.opacity,
                },
            },
            layout: Layout {
                visibility: Visibility::from_checked(self.visible),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RasterBasemap;
    use crate::layer::Visibility;
    use crate::style::{LayerKind, SourceSpec};

    #[test]
    fn hidden_basemap_starts_with_visibility_none() {
        let photo: RasterBasemap = serde_json::from_value(serde_json::json!({
            "id": "photo",
            "tiles": ["https://cyberjapandata.gsi.go.jp/xyz/seamlessphoto/{z}/{x}/{y}.jpg"],
            "visible": false
        }))
        .unwrap();
        assert_eq!(photo.tile_size, 256);
        assert_eq!(photo.layer().layout.visibility, Visibility::None);
        assert!(matches!(photo.layer().kind, LayerKind::Raster { ref source, .. } if source == "photo"));
        assert!(matches!(photo.source(), SourceSpec::Raster { maxzoom: None, .. }));
    }
}
