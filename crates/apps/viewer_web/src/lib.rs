use console_error_panic_hook::set_once;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use catalog::ViewerConfig;
use runtime::MapEvent;
use viewer::bootstrap::{self, DEFAULT_CONTAINER};
use viewer::{AutofitOutcome, Viewer, read_fit_bounds};

mod archive;
mod engine;
mod ffi;

use archive::JsArchive;
use engine::{Listener, WebMap};

struct Session {
    generation: u64,
    viewer: Viewer<WebMap>,
    checkboxes: Vec<(web_sys::HtmlInputElement, Listener)>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    static GENERATION: RefCell<u64> = const { RefCell::new(0) };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

/// Runs `f` on the live session, if any. Re-entrant calls are dropped.
fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    SESSION.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            warn("viewer busy; event dropped");
            return None;
        };
        slot.as_mut().map(f)
    })
}

fn dispatch(event: MapEvent) {
    let kind = event.kind();
    let res = with_session(|s| s.viewer.dispatch(event));
    if let Some(Err(err)) = res {
        warn(&format!("{kind} handler failed: {err}"));
    }
}

fn on_ready() {
    dispatch(MapEvent::Ready);
    spawn_autofit();
}

/// Reads the archive header off the event loop and fits the camera when it
/// arrives, unless the session was stopped or replaced meanwhile.
fn spawn_autofit() {
    let begun = with_session(|s| {
        let location = s.viewer.config().archive.path.clone();
        s.viewer
            .begin_autofit()
            .map(|(ticket, registration)| (s.generation, ticket, registration, location))
    });
    let Some(Ok((generation, ticket, registration, location))) = begun else {
        return;
    };

    spawn_local(async move {
        let source = JsArchive::new(location);
        let outcome = read_fit_bounds(&source, registration).await;
        match &outcome {
            AutofitOutcome::Fitted(bounds) => log(&format!("fitting to {:?}", bounds.to_wsen())),
            AutofitOutcome::NoBounds => log("archive declares no bounds; keeping initial view"),
            AutofitOutcome::Failed(err) => warn(&format!("getHeader failed: {err}")),
            AutofitOutcome::Cancelled => return,
        }
        with_session(|s| {
            if s.generation == generation {
                s.viewer.finish_autofit(ticket, &outcome);
            }
        });
    });
}

fn bind_checkbox(
    document: &web_sys::Document,
    id: &str,
) -> Result<Option<(web_sys::HtmlInputElement, Listener)>, JsValue> {
    let Some(element) = document.get_element_by_id(id) else {
        log(&format!("checkbox #{id} not found; toggle disabled"));
        return Ok(None);
    };
    let input: web_sys::HtmlInputElement = element.dyn_into()?;
    let control = id.to_string();
    let target = input.clone();
    let listener: Listener = Closure::new(move |_event: JsValue| {
        dispatch(MapEvent::ControlChanged {
            control: control.clone(),
            checked: target.checked(),
        });
    });
    input.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())?;
    Ok(Some((input, listener)))
}

#[wasm_bindgen(start)]
pub fn start_hook() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the map inside `container` and starts a session.
///
/// `config_json` is a `ViewerConfig`; an empty string selects the built-in
/// `shinagawa` deployment. A running session is stopped first.
#[wasm_bindgen]
pub fn start(config_json: &str, container: Option<String>) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        catalog::preset("shinagawa").ok_or_else(|| JsValue::from_str("missing preset"))?
    } else {
        ViewerConfig::from_json_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    stop();

    let container = container.unwrap_or_else(|| DEFAULT_CONTAINER.to_string());
    let options = bootstrap::map_options(&config, &container);
    let map = ffi::Map::new(&engine::to_js(&options)?);
    let mut web_map = WebMap::new(map.clone(), dispatch);

    let load: Listener = Closure::new(move |_event: JsValue| on_ready());
    map.on("load", load.as_ref().unchecked_ref());
    web_map.keep_listener(load);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let mut checkboxes = Vec::new();
    for control in &config.controls {
        checkboxes.extend(bind_checkbox(&document, &control.id)?);
    }

    let name = config.name.clone();
    let viewer = Viewer::new(web_map, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let generation = GENERATION.with(|g| {
        let mut g = g.borrow_mut();
        *g += 1;
        *g
    });
    SESSION.with(|cell| {
        *cell.borrow_mut() = Some(Session {
            generation,
            viewer,
            checkboxes,
        });
    });
    log(&format!("solar viewer {name} started"));
    Ok(())
}

/// Disposes the running session: aborts a pending header read and removes
/// the map.
#[wasm_bindgen]
pub fn stop() {
    let session = SESSION.with(|cell| cell.try_borrow_mut().ok().and_then(|mut s| s.take()));
    if let Some(mut session) = session {
        session.viewer.dispose();
        for (input, listener) in &session.checkboxes {
            if let Err(err) = input
                .remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
            {
                warn(&format!("removing #{} change listener failed: {err:?}", input.id()));
            }
        }
        session.viewer.engine().map().remove();
    }
}
