//! Points on the surface of the Earth given by latitude and longitude in degrees.

use std::fmt::{Display, Formatter};

use num_traits::{Float, NumCast, One};
use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Ellipsoid parameters used to compute distances between geographic points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 ellipsoid.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Semimajor axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening of the ellipsoid.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    /// Radius of the sphere with the same mean radius as the ellipsoid (`(2a + b) / 3`).
    pub fn mean_radius(&self) -> f64 {
        let semiminor = self.semimajor * (1.0 - 1.0 / self.inv_flattening);
        (2.0 * self.semimajor + semiminor) / 3.0
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}

/// A point given by its latitude and longitude.
pub trait GeoPoint {
    /// Numeric type used to represent coordinates.
    type Num: Float;

    /// Latitude in degrees.
    fn lat(&self) -> Self::Num;
    /// Longitude in degrees.
    fn lon(&self) -> Self::Num;

    /// Latitude in radians.
    fn lat_rad(&self) -> Self::Num {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> Self::Num {
        self.lon().to_radians()
    }

    /// Great-circle distance to the `other` point in meters, using the mean radius of the datum.
    fn distance(&self, other: &impl GeoPoint<Num = Self::Num>, datum: &Datum) -> Self::Num {
        let two = Self::Num::one() + Self::Num::one();
        let d_lat = other.lat_rad() - self.lat_rad();
        let d_lon = other.lon_rad() - self.lon_rad();

        let a = (d_lat / two).sin().powi(2)
            + self.lat_rad().cos() * other.lat_rad().cos() * (d_lon / two).sin().powi(2);
        let c = two * a.sqrt().atan2((Self::Num::one() - a).sqrt());

        let radius =
            <Self::Num as NumCast>::from(datum.mean_radius()).unwrap_or_else(Self::Num::nan);
        radius * c
    }
}

/// Constructor for geographic points.
pub trait NewGeoPoint<N = f64>: GeoPoint<Num = N> + Sized {
    /// Creates a point from latitude and longitude.
    fn latlon(lat: N, lon: N) -> Self;
    /// Creates a point from longitude and latitude.
    fn lonlat(lon: N, lat: N) -> Self {
        Self::latlon(lat, lon)
    }
}

/// Geographic coordinates of a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoCoordinates {
    lat: f64,
    lon: f64,
}

impl GeoCoordinates {
    /// Creates coordinates after checking that both values are inside the valid ranges.
    ///
    /// ```
    /// use placefinder_types::GeoCoordinates;
    ///
    /// assert!(GeoCoordinates::new(52.530932, 13.384915).is_ok());
    /// assert!(GeoCoordinates::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::Latitude(lat));
        }

        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::Longitude(lon));
        }

        Ok(Self { lat, lon })
    }

    /// Creates a copy of another point.
    pub fn from(other: &impl GeoPoint<Num = f64>) -> Self {
        Self {
            lat: other.lat(),
            lon: other.lon(),
        }
    }

    /// Returns true if both latitude and longitude are finite and inside the valid ranges.
    pub fn is_valid(&self) -> bool {
        Self::new(self.lat, self.lon).is_ok()
    }

    /// Distance to the `other` point in meters on the WGS84 mean sphere.
    pub fn distance_to(&self, other: &GeoCoordinates) -> f64 {
        self.distance(other, &Datum::WGS84)
    }
}

impl GeoPoint for GeoCoordinates {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint<f64> for GeoCoordinates {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Formats as `lat,lon`, the form geocoding services expect in query strings.
impl Display for GeoCoordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Creates new [`GeoCoordinates`] from latitude and longitude values (in degrees).
///
/// ```
/// use placefinder_types::geo::GeoPoint;
/// use placefinder_types::latlon;
///
/// let point = latlon!(52.5, 13.4);
/// assert_eq!(point.lat(), 52.5);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <$crate::geo::GeoCoordinates as $crate::geo::NewGeoPoint<f64>>::latlon($lat, $lon)
    };
}
