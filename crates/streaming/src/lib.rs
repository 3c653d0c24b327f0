//! Tile-archive collaborators.
//!
//! Tile decoding and range reads stay inside the archive reader; this crate
//! only names archives (`pmtiles://` URLs) and exposes their header metadata
//! behind [`ArchiveSource`].

pub mod archive;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_archive;
pub mod protocol;

pub use archive::*;
pub use protocol::*;
