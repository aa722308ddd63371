//! Bounding-box filtering.
//!
//! A linear scan over the whole store. There is no spatial index: the data
//! set is static and fully in memory, and the scan keeps results in store
//! order without any extra bookkeeping.

use crate::store::PointStore;
use poimap_types::{BoundingBox, GeoPoint};

/// Return every point strictly inside `bbox`, in store order.
///
/// Boundary points are excluded. An inverted or zero-area box yields an empty
/// result.
///
/// # Examples
///
/// ```rust
/// use poimap::{BoundingBox, GeoPoint, PointStore, compute::query};
///
/// let store = PointStore::from_points(vec![
///     GeoPoint::new("origin", 0.0, 0.0),
///     GeoPoint::new("corner", 1.0, 1.0),
/// ]);
/// let found = query(&store, &BoundingBox::new(-1.0, -1.0, 1.0, 1.0));
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "origin");
/// ```
pub fn query(store: &PointStore, bbox: &BoundingBox) -> Vec<GeoPoint> {
    store
        .iter()
        .filter(|point| bbox.contains(point))
        .cloned()
        .collect()
}

/// Number of points strictly inside `bbox`.
pub fn count_within(store: &PointStore, bbox: &BoundingBox) -> usize {
    store.iter().filter(|point| bbox.contains(point)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_store() -> PointStore {
        let mut points = Vec::new();
        for x in -5..=5 {
            for y in -5..=5 {
                points.push(GeoPoint::new(format!("{},{}", x, y), x as f64, y as f64));
            }
        }
        PointStore::from_points(points)
    }

    #[test]
    fn test_boundary_point_excluded() {
        let store = PointStore::from_points(vec![
            GeoPoint::new("a", 0.0, 0.0),
            GeoPoint::new("b", 1.0, 1.0),
        ]);
        let results = query(&store, &BoundingBox::new(-1.0, -1.0, 1.0, 1.0));
        assert_eq!(results, vec![GeoPoint::new("a", 0.0, 0.0)]);
    }

    #[test]
    fn test_query_matches_predicate() {
        let store = grid_store();
        let bbox = BoundingBox::new(-2.0, -1.5, 3.0, 2.0);
        let results = query(&store, &bbox);

        // x in -1..=2, y in -1..=1
        assert_eq!(results.len(), 4 * 3);
        for p in &results {
            assert!(p.longitude > -2.0 && p.longitude < 3.0);
            assert!(p.latitude > -1.5 && p.latitude < 2.0);
        }
        assert_eq!(count_within(&store, &bbox), results.len());
    }

    #[test]
    fn test_query_preserves_store_order() {
        let store = grid_store();
        let bbox = BoundingBox::new(-3.0, -3.0, 3.0, 3.0);
        let first = query(&store, &bbox);
        let second = query(&store, &bbox);
        assert_eq!(first, second);

        let expected: Vec<GeoPoint> = store
            .iter()
            .filter(|p| bbox.contains(p))
            .cloned()
            .collect();
        assert_eq!(first, expected);
    }

    #[test]
    fn test_zero_width_and_height_boxes() {
        let store = grid_store();
        assert!(query(&store, &BoundingBox::new(0.0, -5.0, 0.0, 5.0)).is_empty());
        assert!(query(&store, &BoundingBox::new(-5.0, 1.0, 5.0, 1.0)).is_empty());
    }

    #[test]
    fn test_inverted_box_is_empty() {
        let store = grid_store();
        assert!(query(&store, &BoundingBox::new(3.0, -3.0, -3.0, 3.0)).is_empty());
        assert!(query(&store, &BoundingBox::new(-3.0, 3.0, 3.0, -3.0)).is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store = PointStore::default();
        assert!(query(&store, &BoundingBox::new(-180.0, -90.0, 180.0, 90.0)).is_empty());
    }
}
