use catalog::ViewerConfig;
use layers::LayerId;
use tracing::debug;

use crate::engine::{EngineError, MapEngine};

/// Adds basemaps, the archive-backed vector source and the 2D/3D solar
/// layers, then subscribes clicks on the solar layers.
///
/// Returns the ids of the layers added, in draw order. Calling this twice on
/// the same engine fails with a duplicate-id error.
pub fn register_layers<E: MapEngine>(
    engine: &mut E,
    config: &ViewerConfig,
) -> Result<Vec<LayerId>, EngineError> {
    let mut added = Vec::new();

    for basemap in &config.basemaps {
        engine.add_source(&basemap.id, &basemap.source())?;
        let layer = basemap.layer();
        engine.add_layer(&layer)?;
        debug!("raster basemap {} added ({:?})", basemap.id, layer.layout.visibility);
        added.push(layer.id);
    }

    let solar = config.solar_layers();
    engine.add_source(&solar.source_id, &solar.source())?;
    debug!("vector source {} -> {}", solar.source_id, solar.url);

    for layer in [solar.fill_layer(), solar.extrusion_layer()] {
        engine.add_layer(&layer)?;
        debug!("solar layer {} added", layer.id);
        added.push(layer.id);
    }

    for layer in solar.clickable_layers() {
        engine.subscribe_layer_click(&layer)?;
    }

    Ok(added)
}
