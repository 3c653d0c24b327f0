//! Solar roof viewer: wires a tile archive of building irradiance estimates
//! into a map engine.
//!
//! [`Viewer`] is the session context. Engine adapters construct the map from
//! [`bootstrap::map_options`], wrap it in a [`MapEngine`] and feed the session
//! [`runtime::MapEvent`]s.

pub mod autofit;
pub mod bootstrap;
pub mod engine;
pub mod headless;
pub mod interaction;
pub mod registration;
pub mod viewer;

pub use autofit::{AutofitOutcome, read_fit_bounds};
pub use engine::*;
pub use headless::HeadlessMap;
pub use viewer::{Viewer, ViewerError};
