use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range in degrees.
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LON_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A geographic position in degrees.
///
/// Distances between locations are planar: latitude and longitude are treated
/// as Cartesian coordinates, which is what the grid index uses to rank
/// candidates.
///
/// # Examples
///
/// ```
/// use fleetgrid_types::location::Location;
///
/// let a = Location::new(0.0, 0.0);
/// let b = Location::new(3.0, 4.0);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Create a location from latitude and longitude in degrees.
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates lie inside their geographic ranges.
    ///
    /// Non-finite coordinates are never valid.
    ///
    /// ```
    /// use fleetgrid_types::location::Location;
    ///
    /// assert!(Location::new(90.0, -180.0).is_valid());
    /// assert!(!Location::new(90.5, 0.0).is_valid());
    /// assert!(!Location::new(f64::NAN, 0.0).is_valid());
    /// ```
    #[inline]
    pub fn is_valid(&self) -> bool {
        LAT_RANGE.contains(&self.lat) && LON_RANGE.contains(&self.lon)
    }

    /// Planar Euclidean distance in degrees: `sqrt(dlat² + dlon²)`.
    #[inline]
    pub fn distance(&self, other: &Location) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    /// Linear interpolation between `self` (at `fraction == 0`) and `other`
    /// (at `fraction == 1`), each coordinate independently.
    #[inline]
    pub fn lerp(&self, other: &Location, fraction: f64) -> Location {
        Location {
            lat: self.lat + (other.lat - self.lat) * fraction,
            lon: self.lon + (other.lon - self.lon) * fraction,
        }
    }
}

impl From<Location> for Point<f64> {
    /// `x` is longitude, `y` is latitude.
    fn from(location: Location) -> Self {
        Point::new(location.lon, location.lat)
    }
}

impl From<Point<f64>> for Location {
    fn from(point: Point<f64>) -> Self {
        Location::new(point.y(), point.x())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:8.3};{:8.3})", self.lat, self.lon)
    }
}
