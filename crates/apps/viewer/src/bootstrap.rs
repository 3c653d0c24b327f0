use catalog::ViewerConfig;
use layers::StyleDocument;
use streaming::PMTILES_SCHEME;

use crate::engine::{EngineError, MapEngine, MapOptions};

pub const DEFAULT_CONTAINER: &str = "map";

/// Options for constructing the map view: a background-only style, the
/// configured initial camera and URL-hash persistence.
pub fn map_options(config: &ViewerConfig, container: &str) -> MapOptions {
    let view = config.initial_view;
    MapOptions {
        container: container.to_string(),
        style: StyleDocument::with_background(config.background),
        center: view.center,
        zoom: view.zoom,
        pitch: view.pitch,
        bearing: view.bearing,
        hash: config.hash,
    }
}

/// Engine-side setup that must happen before any archive-backed source is
/// added.
pub fn install<E: MapEngine>(engine: &mut E) -> Result<(), EngineError> {
    engine.add_protocol(PMTILES_SCHEME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_initial_view() {
        let config = catalog::preset("shinagawa").unwrap();
        let opts = map_options(&config, DEFAULT_CONTAINER);
        assert_eq!(opts.center, config.initial_view.center);
        assert_eq!(opts.zoom, 12.0);
        assert_eq!(opts.pitch, 0.0);
        assert!(opts.hash);
        assert!(opts.style.sources.is_empty());
        assert_eq!(opts.style.layers.len(), 1);

        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(v["center"], serde_json::json!([139.73, 35.62]));
        assert_eq!(v["container"], "map");
    }
}
