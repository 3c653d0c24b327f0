use std::path::{Path, PathBuf};

use futures_util::future::LocalBoxFuture;
use pmtiles::async_reader::AsyncPmTilesReader;
use tracing::debug;

use crate::archive::{ArchiveError, ArchiveHeader, ArchiveSource};
use foundation::LngLat;

/// A PMTiles archive on the local file system, read with the `pmtiles` crate.
#[derive(Debug, Clone)]
pub struct PmtilesFile {
    path: PathBuf,
}

impl PmtilesFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_header(&self) -> Result<ArchiveHeader, ArchiveError> {
        if !self.path.is_file() {
            return Err(ArchiveError::Io(format!("{:?}: no such file", self.path)));
        }
        let reader = AsyncPmTilesReader::new_with_path(&self.path)
            .await
            .map_err(|e| ArchiveError::Malformed(format!("{:?}: {e}", self.path)))?;
        let h = reader.get_header();
        debug!("pmtiles header read from {:?}", self.path);

        let bounds = ArchiveHeader::parse_bounds([
            h.min_longitude as f64,
            h.min_latitude as f64,
            h.max_longitude as f64,
            h.max_latitude as f64,
        ])?;
        let center = LngLat::new(h.center_longitude as f64, h.center_latitude as f64);
        Ok(ArchiveHeader {
            bounds,
            min_zoom: Some(h.min_zoom),
            max_zoom: Some(h.max_zoom),
            center: center.is_valid().then_some(center),
            center_zoom: Some(h.center_zoom),
        })
    }
}

impl ArchiveSource for PmtilesFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn header(&self) -> LocalBoxFuture<'_, Result<ArchiveHeader, ArchiveError>> {
        Box::pin(self.read_header())
    }
}

#[cfg(test)]
mod tests {
    use super::PmtilesFile;
    use crate::archive::{ArchiveError, ArchiveSource};
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let src = PmtilesFile::new("/definitely/not/here.pmtiles");
        let err = src.header().await.unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[tokio::test]
    async fn non_archive_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pmtiles archive at all, just some text bytes that are long enough to cover a header region of one hundred and twenty seven bytes..").unwrap();
        let src = PmtilesFile::new(file.path());
        assert!(src.header().await.is_err());
    }
}
