//! Synthetic data sets concentrated over the major land masses.
//!
//! Coordinates are whole degrees: only the general area matters for load and
//! clustering tests, not precise positions.

use poimap_types::GeoPoint;
use rand::Rng;

/// A land-mass region, given as a longitude/latitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    SouthAmerica,
    NorthAmerica,
    Eurasia,
    Australia,
    Africa,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::SouthAmerica,
        Region::NorthAmerica,
        Region::Eurasia,
        Region::Australia,
        Region::Africa,
    ];

    /// The first `n` regions, with `n` clamped to `1..=5`.
    pub fn first(n: usize) -> &'static [Region] {
        &Self::ALL[..n.clamp(1, Self::ALL.len())]
    }

    /// `((min_lon, min_lat), (max_lon, max_lat))`
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        match self {
            Region::SouthAmerica => ((-81.0, -54.0), (-38.0, 5.0)),
            Region::NorthAmerica => ((-128.0, 14.0), (-70.0, 62.0)),
            Region::Eurasia => ((-9.0, 15.0), (144.0, 67.0)),
            Region::Australia => ((114.0, -39.0), (154.0, -10.0)),
            Region::Africa => ((-11.0, -32.0), (46.0, 34.0)),
        }
    }
}

/// Generate `count` points named `Point-{i}`, each in a uniformly chosen region.
///
/// An empty `regions` slice falls back to South America alone.
pub fn generate<R: Rng + ?Sized>(count: usize, regions: &[Region], rng: &mut R) -> Vec<GeoPoint> {
    let regions = if regions.is_empty() {
        Region::first(1)
    } else {
        regions
    };

    (0..count)
        .map(|i| {
            let region = regions[rng.random_range(0..regions.len())];
            let ((min_lon, min_lat), (max_lon, max_lat)) = region.bounds();
            GeoPoint::new(
                format!("Point-{}", i),
                whole_degrees_between(min_lon, max_lon, rng),
                whole_degrees_between(min_lat, max_lat, rng),
            )
        })
        .collect()
}

fn whole_degrees_between<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    let span = (max as i64 - min as i64).max(0);
    rng.random_range(0..=span) as f64 + min
}
