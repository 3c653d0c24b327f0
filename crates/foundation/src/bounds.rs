use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
///
/// Serializes as `[lng, lat]`, the array form map engines accept for centers
/// and popup anchors.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(v: LngLat) -> Self {
        [v.lng, v.lat]
    }
}

/// Geographic bounding box, `[west, south, east, north]` in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct LngLatBounds {
    pub sw: LngLat,
    pub ne: LngLat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidBounds(pub [f64; 4]);

impl std::fmt::Display for InvalidBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [w, s, e, n] = self.0;
        write!(f, "invalid bounds [{w}, {s}, {e}, {n}]")
    }
}

impl std::error::Error for InvalidBounds {}

impl LngLatBounds {
    /// Builds bounds from `[west, south, east, north]`.
    ///
    /// Rejects non-finite values, out-of-range coordinates and `south > north`.
    /// `west > east` is accepted: the box crosses the antimeridian.
    pub fn from_wsen(wsen: [f64; 4]) -> Result<Self, InvalidBounds> {
        let [w, s, e, n] = wsen;
        let sw = LngLat::new(w, s);
        let ne = LngLat::new(e, n);
        if !sw.is_valid() || !ne.is_valid() || s > n {
            return Err(InvalidBounds(wsen));
        }
        Ok(Self { sw, ne })
    }

    pub fn to_wsen(&self) -> [f64; 4] {
        [self.sw.lng, self.sw.lat, self.ne.lng, self.ne.lat]
    }

    /// `[[west, south], [east, north]]`, the corner-pair form used by `fitBounds`.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [self.sw.into(), self.ne.into()]
    }

    pub fn center(&self) -> LngLat {
        let mut lng = if self.sw.lng <= self.ne.lng {
            (self.sw.lng + self.ne.lng) / 2.0
        } else {
            (self.sw.lng + self.ne.lng + 360.0) / 2.0
        };
        if lng > 180.0 {
            lng -= 360.0;
        }
        LngLat::new(lng, (self.sw.lat + self.ne.lat) / 2.0)
    }

    pub fn contains(&self, p: LngLat) -> bool {
        let lat_ok = p.lat >= self.sw.lat && p.lat <= self.ne.lat;
        let lng_ok = if self.sw.lng <= self.ne.lng {
            p.lng >= self.sw.lng && p.lng <= self.ne.lng
        } else {
            p.lng >= self.sw.lng || p.lng <= self.ne.lng
        };
        lat_ok && lng_ok
    }
}

impl TryFrom<[f64; 4]> for LngLatBounds {
    type Error = InvalidBounds;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        Self::from_wsen(v)
    }
}

impl From<LngLatBounds> for [f64; 4] {
    fn from(b: LngLatBounds) -> Self {
        b.to_wsen()
    }
}
