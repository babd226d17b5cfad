/// Geographic coordinates in degrees.
///
/// Longitude is in `[-180, 180]`, latitude in `[-90, 90]`. Values outside
/// those ranges are a caller defect: they are rejected by [`GeoPoint::try_new`]
/// and never clamped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoPointError {
    NonFinite,
    LongitudeOutOfRange(f64),
    LatitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoPointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoPointError::NonFinite => write!(f, "coordinate is not finite"),
            GeoPointError::LongitudeOutOfRange(v) => {
                write!(f, "longitude {v} outside [-180, 180]")
            }
            GeoPointError::LatitudeOutOfRange(v) => write!(f, "latitude {v} outside [-90, 90]"),
        }
    }
}

impl std::error::Error for GeoPointError {}

impl GeoPoint {
    /// Builds a point from trusted input (authored constants, decoded topology).
    pub fn new(longitude: f64, latitude: f64) -> Self {
        debug_assert!(
            Self::try_new(longitude, latitude).is_ok(),
            "invalid geo point ({longitude}, {latitude})"
        );
        Self {
            longitude,
            latitude,
        }
    }

    pub fn try_new(longitude: f64, latitude: f64) -> Result<Self, GeoPointError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoPointError::NonFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::LongitudeOutOfRange(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointError::LatitudeOutOfRange(latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// `(lambda, phi)` in radians.
    pub fn to_radians(self) -> (f64, f64) {
        (self.longitude.to_radians(), self.latitude.to_radians())
    }

    pub fn from_radians(lambda: f64, phi: f64) -> Self {
        Self {
            longitude: lambda.to_degrees(),
            latitude: phi.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, GeoPointError};

    #[test]
    fn accepts_range_edges() {
        assert!(GeoPoint::try_new(180.0, 90.0).is_ok());
        assert!(GeoPoint::try_new(-180.0, -90.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_without_clamping() {
        assert_eq!(
            GeoPoint::try_new(181.0, 0.0),
            Err(GeoPointError::LongitudeOutOfRange(181.0))
        );
        assert_eq!(
            GeoPoint::try_new(0.0, -90.5),
            Err(GeoPointError::LatitudeOutOfRange(-90.5))
        );
        assert_eq!(
            GeoPoint::try_new(f64::NAN, 0.0),
            Err(GeoPointError::NonFinite)
        );
    }

    #[test]
    fn radians_round_trip() {
        let p = GeoPoint::new(8.6753, 9.082);
        let (l, f) = p.to_radians();
        let back = GeoPoint::from_radians(l, f);
        assert!((back.longitude - p.longitude).abs() < 1e-12);
        assert!((back.latitude - p.latitude).abs() < 1e-12);
    }
}
