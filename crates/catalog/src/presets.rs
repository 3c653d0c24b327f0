use foundation::{Color, LngLat};
use layers::LayerId;
use layers::raster::RasterBasemap;
use layers::symbology::{Breakpoint, ColorRamp};
use layers::vector::{EXTRUSION_LAYER_ID, FILL_LAYER_ID};

use crate::{
    ArchiveConfig, CameraSettings, ControlConfig, InitialView, PopupLabels, PropertyKeys,
    ViewerConfig,
};

const SHINAGAWA_ARCHIVE: &str = "./tiles/solar_buildings_roofonly_shinagawa.pmtiles";

pub fn preset_names() -> Vec<&'static str> {
    vec!["shinagawa", "shinagawa-aerial"]
}

pub fn preset(name: &str) -> Option<ViewerConfig> {
    match name {
        "shinagawa" => Some(shinagawa()),
        "shinagawa-aerial" => Some(shinagawa_aerial()),
        _ => None,
    }
}

pub fn presets() -> Vec<ViewerConfig> {
    preset_names().into_iter().filter_map(preset).collect()
}

fn ramp(stops: &[(f64, Color)]) -> ColorRamp {
    let stops = stops
        .iter()
        .map(|&(value, color)| Breakpoint::new(value, color))
        .collect();
    // Preset tables are ascending and non-empty.
    match ColorRamp::new(stops) {
        Ok(r) => r,
        Err(e) => unreachable!("preset ramp: {e}"),
    }
}

fn osm(opacity: f64) -> RasterBasemap {
    RasterBasemap {
        id: "osm".to_string(),
        tiles: vec!["https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()],
        tile_size: 256,
        attribution: Some("© OpenStreetMap contributors".to_string()),
        max_zoom: Some(19),
        opacity,
        visible: true,
    }
}

fn control(id: &str, layer: &str, couples_pitch: bool) -> ControlConfig {
    ControlConfig {
        id: id.to_string(),
        layer: LayerId::new(layer),
        couples_pitch,
    }
}

fn base_controls() -> Vec<ControlConfig> {
    vec![
        control("chk2d", FILL_LAYER_ID, false),
        control("chk3d", EXTRUSION_LAYER_ID, true),
        control("chkOSM", "osm", false),
    ]
}

fn shinagawa() -> ViewerConfig {
    ViewerConfig {
        name: "shinagawa".to_string(),
        archive: ArchiveConfig {
            path: SHINAGAWA_ARCHIVE.to_string(),
            source_id: "solar".to_string(),
            source_layer: "solar_buildings".to_string(),
        },
        properties: PropertyKeys::default(),
        palette: ramp(&[
            (0.0, Color::rgb(0x0d, 0x0d, 0x0d)),
            (300_000.0, Color::rgb(0x4b, 0x00, 0x82)),
            (800_000.0, Color::rgb(0x80, 0x00, 0x80)),
            (1_000_000.0, Color::rgb(0xff, 0x8c, 0x00)),
            (1_400_000.0, Color::rgb(0xff, 0xe0, 0x66)),
        ]),
        background: Color::rgb(0xee, 0xf2, 0xf7),
        initial_view: InitialView {
            center: LngLat::new(139.73, 35.62),
            zoom: 12.0,
            pitch: 0.0,
            bearing: 0.0,
        },
        hash: true,
        fill_opacity: 0.75,
        extrusion_opacity: 0.95,
        basemaps: vec![osm(0.55)],
        controls: base_controls(),
        popup: PopupLabels::default(),
        camera: CameraSettings::default(),
    }
}

/// Same archive, tighter thresholds and an optional aerial photo layer.
///
/// An example deployment showing how a second page variant is expressed as
/// configuration. Its thresholds, camera and opacities are illustrative and
/// do not come from a published page.
fn shinagawa_aerial() -> ViewerConfig {
    let mut controls = base_controls();
    controls.push(control("chkPhoto", "photo", false));
    ViewerConfig {
        name: "shinagawa-aerial".to_string(),
        palette: ramp(&[
            (0.0, Color::rgb(0x0d, 0x0d, 0x0d)),
            (500_000.0, Color::rgb(0x4b, 0x00, 0x82)),
            (900_000.0, Color::rgb(0x80, 0x00, 0x80)),
            (1_100_000.0, Color::rgb(0xff, 0x8c, 0x00)),
            (1_300_000.0, Color::rgb(0xff, 0xe0, 0x66)),
        ]),
        initial_view: InitialView {
            center: LngLat::new(139.74, 35.61),
            zoom: 13.5,
            pitch: 0.0,
            bearing: 0.0,
        },
        fill_opacity: 0.85,
        extrusion_opacity: 0.9,
        basemaps: vec![
            osm(0.6),
            RasterBasemap {
                id: "photo".to_string(),
                tiles: vec![
                    "https://cyberjapandata.gsi.go.jp/xyz/seamlessphoto/{z}/{x}/{y}.jpg"
                        .to_string(),
                ],
                tile_size: 256,
                attribution: Some("地理院タイル（シームレス空中写真）".to_string()),
                max_zoom: Some(18),
                opacity: 1.0,
                visible: false,
            },
        ],
        controls,
        ..shinagawa()
    }
}
