use foundation::{LngLat, LngLatBounds};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

/// Error type for archive header reads.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveError {
    /// The archive could not be opened or read (file system, network).
    Io(String),
    /// The archive was read but its header is unusable.
    Malformed(String),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Io(msg) => write!(f, "archive read failed: {msg}"),
            ArchiveError::Malformed(msg) => write!(f, "archive header malformed: {msg}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Header metadata of a tile archive. Only what the viewer consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchiveHeader {
    pub bounds: Option<LngLatBounds>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub center: Option<LngLat>,
    pub center_zoom: Option<u8>,
}

impl ArchiveHeader {
    /// Interprets a raw `[west, south, east, north]` from an archive header.
    ///
    /// An all-zero box means "not declared" and yields `None`. Anything else
    /// that is not a valid geographic box is a malformed header.
    pub fn parse_bounds(wsen: [f64; 4]) -> Result<Option<LngLatBounds>, ArchiveError> {
        if wsen.iter().all(|v| *v == 0.0) {
            return Ok(None);
        }
        LngLatBounds::from_wsen(wsen)
            .map(Some)
            .map_err(|e| ArchiveError::Malformed(e.to_string()))
    }

    /// Picks the declared bounds out of a header that may carry them as four
    /// named fields, as a `bounds` array, or not at all.
    ///
    /// The named fields win when both are present. An array that is not
    /// exactly `[west, south, east, north]` is malformed.
    pub fn bounds_from(
        fields: Option<[f64; 4]>,
        array: Option<Vec<f64>>,
    ) -> Result<Option<LngLatBounds>, ArchiveError> {
        if let Some(wsen) = fields {
            return Self::parse_bounds(wsen);
        }
        match array.map(<[f64; 4]>::try_from) {
            None => Ok(None),
            Some(Ok(wsen)) => Self::parse_bounds(wsen),
            Some(Err(vals)) => Err(ArchiveError::Malformed(format!(
                "bounds has {} values, expected [w, s, e, n]",
                vals.len()
            ))),
        }
    }
}

/// Something that can asynchronously produce an archive header.
///
/// Futures are not `Send`: header reads are driven from the single UI thread
/// (or a current-thread runtime on native).
pub trait ArchiveSource {
    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;

    fn header(&self) -> LocalBoxFuture<'_, Result<ArchiveHeader, ArchiveError>>;
}

#[cfg(test)]
mod tests {
    use super::{ArchiveError, ArchiveHeader};

    #[test]
    fn zero_bounds_are_absent() {
        assert_eq!(ArchiveHeader::parse_bounds([0.0; 4]), Ok(None));
    }

    #[test]
    fn valid_bounds_parse() {
        let b = ArchiveHeader::parse_bounds([139.7, 35.6, 139.8, 35.65])
            .unwrap()
            .unwrap();
        assert_eq!(b.to_wsen(), [139.7, 35.6, 139.8, 35.65]);
    }

    #[test]
    fn garbage_bounds_are_malformed() {
        let err = ArchiveHeader::parse_bounds([500.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    const WSEN: [f64; 4] = [139.7, 35.6, 139.8, 35.65];

    #[test]
    fn named_fields_win_over_array() {
        let b = ArchiveHeader::bounds_from(Some(WSEN), Some(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .unwrap();
        assert_eq!(b.to_wsen(), WSEN);
    }

    #[test]
    fn array_is_used_without_fields() {
        let b = ArchiveHeader::bounds_from(None, Some(WSEN.to_vec()))
            .unwrap()
            .unwrap();
        assert_eq!(b.to_wsen(), WSEN);
    }

    #[test]
    fn header_without_bounds_is_absent() {
        assert_eq!(ArchiveHeader::bounds_from(None, None), Ok(None));
    }

    #[test]
    fn zero_fields_or_array_are_absent() {
        assert_eq!(ArchiveHeader::bounds_from(Some([0.0; 4]), None), Ok(None));
        assert_eq!(ArchiveHeader::bounds_from(None, Some(vec![0.0; 4])), Ok(None));
    }

    #[test]
    fn wrong_length_array_is_malformed() {
        for vals in [vec![], vec![139.7, 35.6, 139.8], WSEN.repeat(2)] {
            let err = ArchiveHeader::bounds_from(None, Some(vals)).unwrap_err();
            assert!(matches!(err, ArchiveError::Malformed(_)));
        }
    }

    #[test]
    fn out_of_range_fields_are_malformed() {
        let err = ArchiveHeader::bounds_from(Some([0.0, -95.0, 1.0, 1.0]), None).unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }
}
