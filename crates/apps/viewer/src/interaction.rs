//! Click-to-popup and checkbox toggle handlers.

use catalog::{PopupLabels, PropertyKeys, ViewerConfig};
use foundation::LngLat;
use layers::Visibility;
use runtime::Feature;
use serde_json::Value;
use tracing::debug;

use crate::engine::{EaseOptions, EngineError, MapEngine};

const MISSING: &str = "-";

/// What a control change did to the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ToggleEffect {
    pub visibility: Visibility,
    pub pitch: Option<f64>,
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Popup body for one feature. Absent properties show as `-`.
pub fn popup_html(feature: &Feature, keys: &PropertyKeys, labels: &PopupLabels) -> String {
    let rows = [
        (&labels.id, &keys.id),
        (&labels.height, &keys.height),
        (&labels.irradiance, &keys.irradiance),
    ];
    let mut html = String::from(r#"<div style="font:13px system-ui;line-height:1.4">"#);
    for (label, key) in rows {
        let value = display_value(feature.property(key));
        html.push_str(&format!(
            "<div><b>{}</b>: {}</div>",
            escape_html(label),
            escape_html(&value)
        ));
    }
    html.push_str("</div>");
    html
}

/// Opens a popup for the topmost feature. Returns `false` when nothing was
/// under the pointer.
pub fn show_feature_popup<E: MapEngine>(
    engine: &mut E,
    config: &ViewerConfig,
    at: LngLat,
    features: &[Feature],
) -> bool {
    let Some(top) = features.first() else {
        return false;
    };
    let html = popup_html(top, &config.properties, &config.popup);
    engine.show_popup(at, &html);
    true
}

/// Applies a checkbox state: layer visibility, and for pitch-coupled
/// controls an eased pitch change.
///
/// Returns `Ok(None)` for controls the config does not know.
pub fn apply_toggle<E: MapEngine>(
    engine: &mut E,
    config: &ViewerConfig,
    control_id: &str,
    checked: bool,
) -> Result<Option<ToggleEffect>, EngineError> {
    let Some(control) = config.control(control_id) else {
        debug!("ignoring change on unbound control {control_id}");
        return Ok(None);
    };

    let visibility = Visibility::from_checked(checked);
    engine.set_visibility(&control.layer, visibility)?;

    let pitch = control.couples_pitch.then(|| {
        let pitch = if checked { config.camera.pitch_3d } else { 0.0 };
        engine.ease_to(EaseOptions {
            pitch: Some(pitch),
            duration_ms: config.camera.ease_duration_ms,
        });
        pitch
    });

    debug!("{control_id} -> {} {}", control.layer, visibility.as_str());
    Ok(Some(ToggleEffect { visibility, pitch }))
}
