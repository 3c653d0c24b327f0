use std::cell::Cell;

use catalog::ViewerConfig;
use foundation::{LngLat, LngLatBounds};
use futures_util::future::LocalBoxFuture;
use layers::vector::{EXTRUSION_LAYER_ID, FILL_LAYER_ID};
use layers::{LayerId, Visibility};
use pretty_assertions::assert_eq;
use runtime::{Feature, Lifecycle, MapEvent};
use serde_json::json;
use streaming::{ArchiveError, ArchiveHeader, ArchiveSource};
use tokio::sync::oneshot;
use viewer::bootstrap::{self, DEFAULT_CONTAINER};
use viewer::{AutofitOutcome, HeadlessMap, MapEngine, Viewer, ViewerError, read_fit_bounds};

fn config() -> ViewerConfig {
    catalog::preset("shinagawa").unwrap()
}

fn session(config: ViewerConfig) -> Viewer<HeadlessMap> {
    let options = bootstrap::map_options(&config, DEFAULT_CONTAINER);
    Viewer::new(HeadlessMap::new(&options).with_viewport(1024.0, 768.0), config).unwrap()
}

fn ready_session() -> Viewer<HeadlessMap> {
    let mut v = session(config());
    v.dispatch(MapEvent::Ready).unwrap();
    v
}

fn click(layer: &str, features: Vec<Feature>) -> MapEvent {
    MapEvent::Click {
        layer: LayerId::new(layer),
        at: LngLat::new(139.73, 35.62),
        features,
    }
}

fn toggle(control: &str, checked: bool) -> MapEvent {
    MapEvent::ControlChanged {
        control: control.to_string(),
        checked,
    }
}

fn visibility(v: &Viewer<HeadlessMap>, layer: &str) -> Option<Visibility> {
    v.engine().visibility(&LayerId::new(layer))
}

struct FixedHeader(Result<ArchiveHeader, ArchiveError>);

impl ArchiveSource for FixedHeader {
    fn describe(&self) -> String {
        "fixed".to_string()
    }

    fn header(&self) -> LocalBoxFuture<'_, Result<ArchiveHeader, ArchiveError>> {
        let res = self.0.clone();
        Box::pin(async move { res })
    }
}

/// Header read that waits until the test releases it.
struct GatedHeader {
    gate: Cell<Option<oneshot::Receiver<ArchiveHeader>>>,
}

impl ArchiveSource for GatedHeader {
    fn describe(&self) -> String {
        "gated".to_string()
    }

    fn header(&self) -> LocalBoxFuture<'_, Result<ArchiveHeader, ArchiveError>> {
        let rx = self.gate.take();
        Box::pin(async move {
            let rx = rx.ok_or_else(|| ArchiveError::Io("already read".into()))?;
            rx.await.map_err(|e| ArchiveError::Io(e.to_string()))
        })
    }
}

fn shinagawa_bounds() -> LngLatBounds {
    LngLatBounds::from_wsen([139.70, 35.58, 139.78, 35.64]).unwrap()
}

#[test]
fn bootstrap_installs_protocol_and_keeps_base_style() {
    let v = session(config());
    assert!(v.engine().has_protocol("pmtiles"));
    assert_eq!(v.engine().style().layers.len(), 1);
    assert_eq!(v.lifecycle(), Lifecycle::Constructed);
}

#[test]
fn ready_registers_sources_and_layers_in_order() {
    let v = ready_session();
    let ids: Vec<&str> = v.layers().iter().map(|l| l.as_str()).collect();
    assert_eq!(ids, vec!["osm", FILL_LAYER_ID, EXTRUSION_LAYER_ID]);

    let style = serde_json::to_value(v.engine().style()).unwrap();
    assert_eq!(
        style["sources"]["solar"],
        json!({"type": "vector", "url": "pmtiles://./tiles/solar_buildings_roofonly_shinagawa.pmtiles"})
    );
    assert_eq!(style["sources"]["osm"]["maxzoom"], 19);
    assert_eq!(visibility(&v, "osm"), Some(Visibility::Visible));
    assert_eq!(visibility(&v, FILL_LAYER_ID), Some(Visibility::Visible));
    assert_eq!(visibility(&v, EXTRUSION_LAYER_ID), Some(Visibility::None));

    let clickable: Vec<&str> = v.engine().click_layers().iter().map(|l| l.as_str()).collect();
    assert_eq!(clickable, vec![FILL_LAYER_ID, EXTRUSION_LAYER_ID]);
}

#[test]
fn aerial_preset_adds_hidden_photo_layer() {
    let mut v = session(catalog::preset("shinagawa-aerial").unwrap());
    v.dispatch(MapEvent::Ready).unwrap();
    assert_eq!(visibility(&v, "photo"), Some(Visibility::None));
    v.dispatch(toggle("chkPhoto", true)).unwrap();
    assert_eq!(visibility(&v, "photo"), Some(Visibility::Visible));
}

#[test]
fn second_ready_is_rejected() {
    let mut v = ready_session();
    assert_eq!(v.dispatch(MapEvent::Ready), Err(ViewerError::AlreadyRegistered));
    assert_eq!(v.layers().len(), 3);
}

#[test]
fn registering_twice_on_one_engine_is_a_duplicate_error() {
    let v = ready_session();
    let config = v.config().clone();
    let mut engine = v.into_engine();
    let err = viewer::registration::register_layers(&mut engine, &config).unwrap_err();
    assert!(matches!(err, viewer::EngineError::DuplicateSource(_)));
}

#[test]
fn toggle_round_trip_restores_visibility() {
    let mut v = ready_session();
    for (control, layer) in [("chk2d", FILL_LAYER_ID), ("chkOSM", "osm"), ("chk3d", EXTRUSION_LAYER_ID)] {
        let before = visibility(&v, layer);
        let flipped = before != Some(Visibility::Visible);
        v.dispatch(toggle(control, flipped)).unwrap();
        v.dispatch(toggle(control, !flipped)).unwrap();
        assert_eq!(visibility(&v, layer), before, "{control}");
    }
}

#[test]
fn repeated_toggle_is_idempotent() {
    let mut v = ready_session();
    v.dispatch(toggle("chk2d", false)).unwrap();
    let once = v.engine().style().clone();
    v.dispatch(toggle("chk2d", false)).unwrap();
    assert_eq!(v.engine().style(), &once);
}

#[test]
fn three_d_toggle_drives_visibility_and_pitch() {
    let mut v = ready_session();

    v.dispatch(toggle("chk3d", true)).unwrap();
    assert_eq!(visibility(&v, EXTRUSION_LAYER_ID), Some(Visibility::Visible));
    let ease = *v.engine().eases().last().unwrap();
    assert_eq!(ease.pitch, Some(60.0));
    assert_eq!(ease.duration_ms, 500);
    assert_eq!(v.engine().camera().pitch, 60.0);

    v.dispatch(toggle("chk3d", false)).unwrap();
    assert_eq!(visibility(&v, EXTRUSION_LAYER_ID), Some(Visibility::None));
    assert_eq!(v.engine().eases().last().unwrap().pitch, Some(0.0));
    assert_eq!(v.engine().camera().pitch, 0.0);
}

#[test]
fn plain_toggles_leave_pitch_alone() {
    let mut v = ready_session();
    v.dispatch(toggle("chk2d", false)).unwrap();
    v.dispatch(toggle("chkOSM", false)).unwrap();
    assert!(v.engine().eases().is_empty());
}

#[test]
fn unknown_control_is_ignored() {
    let mut v = ready_session();
    let before = v.engine().style().clone();
    v.dispatch(toggle("chkNope", true)).unwrap();
    assert_eq!(v.engine().style(), &before);
}

#[test]
fn click_without_feature_opens_no_popup() {
    let mut v = ready_session();
    v.dispatch(click(FILL_LAYER_ID, vec![])).unwrap();
    assert_eq!(v.engine().popups().len(), 0);
}

#[test]
fn click_on_basemap_opens_no_popup() {
    let mut v = ready_session();
    let tile = Feature::from_value(json!({"id": "tile"}));
    v.dispatch(click("osm", vec![tile])).unwrap();
    assert_eq!(v.engine().popups().len(), 0);

    let building = Feature::from_value(json!({"id": "B7"}));
    v.dispatch(click(FILL_LAYER_ID, vec![building])).unwrap();
    assert_eq!(v.engine().popups().len(), 1);
}

#[test]
fn click_shows_topmost_feature_properties() {
    let mut v = ready_session();
    let top = Feature::from_value(json!({"id": "A1", "height": 12.5, "global_roof_mean": 950000}));
    let below = Feature::from_value(json!({"id": "Z9"}));
    v.dispatch(click(FILL_LAYER_ID, vec![top, below])).unwrap();

    let popups = v.engine().popups();
    assert_eq!(popups.len(), 1);
    let html = &popups[0].html;
    assert!(html.contains("A1"));
    assert!(html.contains("12.5"));
    assert!(html.contains("950000"));
    assert!(!html.contains("Z9"));
    assert_eq!(popups[0].at, LngLat::new(139.73, 35.62));
}

#[test]
fn click_missing_height_shows_placeholder() {
    let mut v = ready_session();
    let f = Feature::from_value(json!({"id": "A2", "global_roof_mean": 1}));
    v.dispatch(click(EXTRUSION_LAYER_ID, vec![f])).unwrap();
    let html = &v.engine().popups()[0].html;
    assert!(html.contains(": -</div>"));
}

#[test]
fn each_click_opens_another_popup() {
    let mut v = ready_session();
    for _ in 0..3 {
        let f = Feature::from_value(json!({"id": "A1"}));
        v.dispatch(click(FILL_LAYER_ID, vec![f])).unwrap();
    }
    assert_eq!(v.engine().popups().len(), 3);
}

#[tokio::test]
async fn autofit_fits_declared_bounds_instantly() {
    let mut v = ready_session();
    let header = ArchiveHeader {
        bounds: Some(shinagawa_bounds()),
        ..ArchiveHeader::default()
    };
    let outcome = v.autofit(&FixedHeader(Ok(header))).await.unwrap();
    assert_eq!(outcome, AutofitOutcome::Fitted(shinagawa_bounds()));

    let (bounds, fit) = v.engine().fits()[0];
    assert_eq!(bounds, shinagawa_bounds());
    assert_eq!(fit.padding, 24);
    assert_eq!(fit.duration_ms, 0);
    assert!((v.engine().camera().center.lng - 139.74).abs() < 1e-9);
}

#[tokio::test]
async fn autofit_failure_keeps_initial_view() {
    let mut v = ready_session();
    let initial = v.engine().camera();
    let outcome = v
        .autofit(&FixedHeader(Err(ArchiveError::Io("connection refused".into()))))
        .await
        .unwrap();
    assert!(matches!(outcome, AutofitOutcome::Failed(_)));
    assert_eq!(v.engine().camera(), initial);
    assert!(v.engine().fits().is_empty());
}

#[tokio::test]
async fn autofit_without_bounds_keeps_initial_view() {
    let mut v = ready_session();
    let initial = v.engine().camera();
    let outcome = v.autofit(&FixedHeader(Ok(ArchiveHeader::default()))).await.unwrap();
    assert_eq!(outcome, AutofitOutcome::NoBounds);
    assert_eq!(v.engine().camera(), initial);
}

#[tokio::test]
async fn autofit_before_ready_is_refused() {
    let mut v = session(config());
    let res = v.autofit(&FixedHeader(Ok(ArchiveHeader::default()))).await;
    assert_eq!(res, Err(ViewerError::NotReady));
}

#[tokio::test]
async fn dispose_cancels_in_flight_header_read() {
    let mut v = ready_session();
    let initial = v.engine().camera();
    let (tx, rx) = oneshot::channel();
    let source = GatedHeader {
        gate: Cell::new(Some(rx)),
    };

    let (ticket, registration) = v.begin_autofit().unwrap();
    let read = read_fit_bounds(&source, registration);
    assert!(v.is_autofit_running());
    v.dispose();

    // The header arrives after teardown; the read is already aborted.
    let _ = tx.send(ArchiveHeader {
        bounds: Some(shinagawa_bounds()),
        ..ArchiveHeader::default()
    });
    let outcome = read.await;
    assert_eq!(outcome, AutofitOutcome::Cancelled);
    assert!(!v.finish_autofit(ticket, &outcome));
    assert_eq!(v.engine().camera(), initial);
}

#[tokio::test]
async fn late_completion_after_dispose_is_dropped() {
    let mut v = ready_session();
    let initial = v.engine().camera();
    let (ticket, _registration) = v.begin_autofit().unwrap();
    v.dispose();
    let applied = v.finish_autofit(ticket, &AutofitOutcome::Fitted(shinagawa_bounds()));
    assert!(!applied);
    assert_eq!(v.engine().camera(), initial);
}

#[test]
fn events_after_dispose_are_ignored() {
    let mut v = ready_session();
    v.dispose();
    v.dispatch(toggle("chk2d", false)).unwrap();
    v.dispatch(click(FILL_LAYER_ID, vec![Feature::default()])).unwrap();
    assert_eq!(visibility(&v, FILL_LAYER_ID), Some(Visibility::Visible));
    assert!(v.engine().popups().is_empty());
}

#[test]
fn palette_matches_fill_expression_stops() {
    let config = config();
    let v = ready_session();
    let style = serde_json::to_value(v.engine().style()).unwrap();
    let fill = style["layers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["id"] == FILL_LAYER_ID)
        .unwrap();
    let expr = fill["paint"]["fill-color"].as_array().unwrap();
    // interpolate, [linear], input, then value/color pairs.
    for (pair, stop) in expr[3..].chunks(2).zip(config.palette.stops()) {
        assert_eq!(pair[0].as_f64(), Some(stop.value));
        assert_eq!(pair[1].as_str(), Some(stop.color.to_hex().as_str()));
        assert_eq!(config.palette.color_at(stop.value), stop.color);
    }
    assert_eq!(config.palette.evaluate(None), config.palette.color_at(0.0));
}
