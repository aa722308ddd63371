//! The loaded-once, read-only point set.

use crate::error::LoadError;
use crate::storage::PointSource;
use poimap_types::GeoPoint;
use std::time::Instant;

/// Immutable, ordered collection of points of interest.
///
/// A store is built once and never mutated afterwards, so it can be shared
/// between threads (for example behind an `Arc`) and read without locking.
///
/// # Examples
///
/// ```rust
/// use poimap::{GeoPoint, PointStore};
///
/// let store = PointStore::load(vec![
///     GeoPoint::new("a", 0.0, 0.0),
///     GeoPoint::new("b", 10.0, 10.0),
/// ])?;
/// assert_eq!(store.count(), 2);
/// assert_eq!(store.all()[1].name, "b");
/// # Ok::<(), poimap::LoadError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Box<[GeoPoint]>,
}

impl PointStore {
    /// Read every point from `source`. Fails without producing a partial store.
    pub fn load<S: PointSource>(source: S) -> Result<Self, LoadError> {
        let started = Instant::now();
        let points = source.read_points()?;
        log::info!(
            "Loaded {} points of interest in {:?}",
            points.len(),
            started.elapsed()
        );
        Ok(Self::from_points(points))
    }

    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self {
            points: points.into_boxed_slice(),
        }
    }

    /// All points in load order.
    pub fn all(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
