//! Fit the camera to the archive's declared bounds once its header arrives.

use foundation::LngLatBounds;
use futures_util::future::{AbortRegistration, Abortable};
use streaming::{ArchiveError, ArchiveSource};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AutofitOutcome {
    /// The header declared bounds.
    Fitted(LngLatBounds),
    /// The header was read but declares no bounds.
    NoBounds,
    /// Reading the header failed; the camera keeps its initial view.
    Failed(ArchiveError),
    /// The read was aborted before it finished.
    Cancelled,
}

impl AutofitOutcome {
    pub fn bounds(&self) -> Option<LngLatBounds> {
        match self {
            AutofitOutcome::Fitted(b) => Some(*b),
            _ => None,
        }
    }
}

/// Reads the archive header and reports what to fit.
///
/// Never fails: read errors are logged and folded into
/// [`AutofitOutcome::Failed`]. Aborting `registration` ends the read with
/// [`AutofitOutcome::Cancelled`].
pub async fn read_fit_bounds<A: ArchiveSource + ?Sized>(
    source: &A,
    registration: AbortRegistration,
) -> AutofitOutcome {
    let location = source.describe();
    match Abortable::new(source.header(), registration).await {
        Err(_aborted) => {
            debug!("header read for {location} cancelled");
            AutofitOutcome::Cancelled
        }
        Ok(Err(err)) => {
            warn!("getHeader failed for {location}: {err}");
            AutofitOutcome::Failed(err)
        }
        Ok(Ok(header)) => {
            debug!("archive header for {location}: {header:?}");
            match header.bounds {
                Some(bounds) => AutofitOutcome::Fitted(bounds),
                None => AutofitOutcome::NoBounds,
            }
        }
    }
}
