use foundation::LngLatBounds;
use futures_util::future::LocalBoxFuture;
use js_sys::Reflect;
use streaming::{ArchiveError, ArchiveHeader, ArchiveSource};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::ffi;

/// Archive header read through the page's `pmtiles.PMTiles` reader.
pub struct JsArchive {
    location: String,
}

impl JsArchive {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    async fn read_header(&self) -> Result<ArchiveHeader, ArchiveError> {
        let header = JsFuture::from(ffi::PMTiles::new(&self.location).get_header())
            .await
            .map_err(|e| ArchiveError::Io(format!("{e:?}")))?;
        if header.is_null() || header.is_undefined() {
            return Err(ArchiveError::Malformed("empty header".to_string()));
        }
        web_sys::console::log_2(&JsValue::from_str("pmtiles header:"), &header);
        let num = |key: &str| {
            Reflect::get(&header, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_f64())
        };
        let zoom = |key: &str| num(key).map(|z| z.clamp(0.0, 255.0) as u8);

        Ok(ArchiveHeader {
            bounds: header_bounds(&header, &num)?,
            min_zoom: zoom("minZoom"),
            max_zoom: zoom("maxZoom"),
            center: match (num("centerLon"), num("centerLat")) {
                (Some(lng), Some(lat)) => Some(foundation::LngLat::new(lng, lat)),
                _ => None,
            }
            .filter(|c| c.is_valid()),
            center_zoom: zoom("centerZoom"),
        })
    }
}

/// `minLon/minLat/maxLon/maxLat`, falling back to a `bounds` array.
fn header_bounds(
    header: &JsValue,
    num: &dyn Fn(&str) -> Option<f64>,
) -> Result<Option<LngLatBounds>, ArchiveError> {
    let fields = match (num("minLon"), num("minLat"), num("maxLon"), num("maxLat")) {
        (Some(w), Some(s), Some(e), Some(n)) => Some([w, s, e, n]),
        _ => None,
    };
    let array = Reflect::get(header, &JsValue::from_str("bounds"))
        .ok()
        .filter(|raw| js_sys::Array::is_array(raw))
        .map(|raw| {
            raw.unchecked_into::<js_sys::Array>()
                .iter()
                .filter_map(|v| v.as_f64())
                .collect()
        });
    ArchiveHeader::bounds_from(fields, array)
}

impl ArchiveSource for JsArchive {
    fn describe(&self) -> String {
        self.location.clone()
    }

    fn header(&self) -> LocalBoxFuture<'_, Result<ArchiveHeader, ArchiveError>> {
        Box::pin(self.read_header())
    }
}
