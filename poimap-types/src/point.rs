use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

/// A labelled geographic point.
///
/// Used for raw points of interest loaded from a data set and for synthesized
/// cluster centers, whose name carries the member count.
///
/// # Examples
///
/// ```
/// use poimap_types::point::GeoPoint;
///
/// let museum = GeoPoint::new("Museum", -74.0060, 40.7128);
/// assert_eq!(museum.longitude, -74.0060);
/// assert_eq!(museum.latitude, 40.7128);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
        }
    }

    /// Create a cluster-center point labelled `"Cluster of N"`.
    ///
    /// A cluster that ended up with no members is still labelled with a count
    /// of one.
    ///
    /// ```
    /// use poimap_types::point::GeoPoint;
    ///
    /// assert_eq!(GeoPoint::cluster(37, 1.0, 2.0).name, "Cluster of 37");
    /// assert_eq!(GeoPoint::cluster(0, 1.0, 2.0).name, "Cluster of 1");
    /// ```
    pub fn cluster(members: usize, longitude: f64, latitude: f64) -> Self {
        Self::new(format!("Cluster of {}", members.max(1)), longitude, latitude)
    }

    /// Flat-plane projection: x is longitude, y is latitude.
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

impl From<&GeoPoint> for Point<f64> {
    fn from(point: &GeoPoint) -> Self {
        Point::new(point.longitude, point.latitude)
    }
}
