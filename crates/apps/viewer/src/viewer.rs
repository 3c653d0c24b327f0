use catalog::ViewerConfig;
use futures_util::future::AbortRegistration;
use layers::LayerId;
use runtime::{InvalidTransition, Lifecycle, MapEvent, TaskSlot, TaskTicket};
use streaming::ArchiveSource;
use tracing::{debug, info};

use crate::autofit::{AutofitOutcome, read_fit_bounds};
use crate::bootstrap;
use crate::engine::{EngineError, FitOptions, MapEngine};
use crate::interaction;
use crate::registration;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    Engine(EngineError),
    Lifecycle(InvalidTransition),
    /// The map signalled ready twice; layers are registered only once.
    AlreadyRegistered,
    /// Autofit requested before the map signalled ready.
    NotReady,
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Engine(e) => write!(f, "{e}"),
            ViewerError::Lifecycle(e) => write!(f, "{e}"),
            ViewerError::AlreadyRegistered => write!(f, "layers are already registered"),
            ViewerError::NotReady => write!(f, "map is not ready yet"),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<EngineError> for ViewerError {
    fn from(e: EngineError) -> Self {
        ViewerError::Engine(e)
    }
}

impl From<InvalidTransition> for ViewerError {
    fn from(e: InvalidTransition) -> Self {
        ViewerError::Lifecycle(e)
    }
}

/// The long-lived session context: one map engine, one configuration.
///
/// Engine adapters feed it [`MapEvent`]s; it owns lifecycle and the in-flight
/// autofit so teardown can cancel it.
pub struct Viewer<E: MapEngine> {
    engine: E,
    config: ViewerConfig,
    lifecycle: Lifecycle,
    autofit: TaskSlot,
    layers: Vec<LayerId>,
}

impl<E: MapEngine> Viewer<E> {
    /// Takes a freshly constructed engine (built from
    /// [`bootstrap::map_options`]) and installs the archive protocol.
    pub fn new(mut engine: E, config: ViewerConfig) -> Result<Self, ViewerError> {
        bootstrap::install(&mut engine)?;
        Ok(Self {
            engine,
            config,
            lifecycle: Lifecycle::default(),
            autofit: TaskSlot::new(),
            layers: Vec::new(),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Layers added at registration, in draw order.
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub fn dispatch(&mut self, event: MapEvent) -> Result<(), ViewerError> {
        if self.lifecycle.is_disposed() {
            debug!("dropping {} event after dispose", event.kind());
            return Ok(());
        }
        match event {
            MapEvent::Ready => self.on_ready(),
            MapEvent::Click { layer, at, features } => {
                if !self.lifecycle.is_ready() {
                    return Ok(());
                }
                if !self.config.solar_layers().clickable_layers().contains(&layer) {
                    debug!("ignoring click on non-data layer {layer}");
                    return Ok(());
                }
                let shown =
                    interaction::show_feature_popup(&mut self.engine, &self.config, at, &features);
                debug!("click on {layer}: popup {}", if shown { "shown" } else { "skipped" });
                Ok(())
            }
            MapEvent::ControlChanged { control, checked } => {
                interaction::apply_toggle(&mut self.engine, &self.config, &control, checked)?;
                Ok(())
            }
        }
    }

    fn on_ready(&mut self) -> Result<(), ViewerError> {
        if self.lifecycle.is_ready() {
            return Err(ViewerError::AlreadyRegistered);
        }
        self.lifecycle.mark_ready()?;
        self.layers = registration::register_layers(&mut self.engine, &self.config)?;
        info!(
            "{}: registered {} layers from {}",
            self.config.name,
            self.layers.len(),
            self.config.archive.url()
        );
        Ok(())
    }

    /// Starts an autofit; any earlier one is aborted.
    ///
    /// Wrap the header read with the returned registration (see
    /// [`read_fit_bounds`]) and hand its outcome to [`Viewer::finish_autofit`].
    pub fn begin_autofit(&mut self) -> Result<(TaskTicket, AbortRegistration), ViewerError> {
        if !self.lifecycle.is_ready() {
            return Err(ViewerError::NotReady);
        }
        Ok(self.autofit.launch())
    }

    /// Applies a finished autofit. Returns whether the camera moved.
    ///
    /// Outcomes for a superseded ticket or a disposed session are dropped.
    pub fn finish_autofit(&mut self, ticket: TaskTicket, outcome: &AutofitOutcome) -> bool {
        if !self.autofit.complete(ticket) || self.lifecycle.is_disposed() {
            return false;
        }
        let Some(bounds) = outcome.bounds() else {
            return false;
        };
        self.engine.fit_bounds(
            bounds,
            FitOptions {
                padding: self.config.camera.fit_padding,
                duration_ms: 0,
            },
        );
        true
    }

    /// Begin, read and finish an autofit while holding the viewer.
    ///
    /// Suited to callers that own the viewer outright (CLI, tests). Event-loop
    /// adapters should use [`Viewer::begin_autofit`] and
    /// [`Viewer::finish_autofit`] so events keep flowing during the read.
    pub async fn autofit<A: ArchiveSource + ?Sized>(
        &mut self,
        source: &A,
    ) -> Result<AutofitOutcome, ViewerError> {
        let (ticket, registration) = self.begin_autofit()?;
        let outcome = read_fit_bounds(source, registration).await;
        self.finish_autofit(ticket, &outcome);
        Ok(outcome)
    }

    pub fn is_autofit_running(&self) -> bool {
        self.autofit.is_running()
    }

    /// Tears the session down: aborts an in-flight autofit and ignores
    /// every later event.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            if self.autofit.cancel() {
                debug!("in-flight autofit aborted");
            }
            info!("{}: viewer disposed", self.config.name);
        }
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}
