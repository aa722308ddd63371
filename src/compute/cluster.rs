//! K-means clustering of points into a fixed number of representative centers.
//!
//! Points are projected onto the flat (longitude, latitude) plane and compared
//! by squared Euclidean distance. There is no geodesic correction and no
//! handling of the ±180° wraparound.
//!
//! Centers are seeded with k-means++ from a caller-supplied random source, then
//! refined by alternating assignment and mean-update rounds until assignments
//! stop changing or the iteration budget runs out.

use crate::error::ComputeFailure;
use geo::Coord;
use poimap_types::GeoPoint;
use rand::Rng;

/// Outcome of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// One point per cluster, in center order, labelled with its member count
    pub centers: Vec<GeoPoint>,
    /// Number of assign/update rounds performed
    pub iterations: usize,
    /// Whether assignments stabilised before the iteration budget ran out
    pub converged: bool,
}

/// Reduce `points` to at most `k` cluster centers.
///
/// Every center is emitted, including one whose cluster ended up empty; such
/// a center keeps its last position and is labelled `"Cluster of 1"`. When
/// `k` exceeds the number of points it is clamped to the number of points.
///
/// The result is fully determined by the inputs and the state of `rng`.
///
/// # Examples
///
/// ```rust
/// use poimap::{GeoPoint, compute::cluster};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let points = vec![
///     GeoPoint::new("a", 0.0, 0.0),
///     GeoPoint::new("b", 0.0, 1.0),
///     GeoPoint::new("c", 10.0, 10.0),
///     GeoPoint::new("d", 10.0, 11.0),
/// ];
/// let mut rng = StdRng::seed_from_u64(42);
/// let centers = cluster(&points, 2, 5, &mut rng)?;
/// assert_eq!(centers.len(), 2);
/// assert!(centers.iter().all(|c| c.name == "Cluster of 2"));
/// # Ok::<(), poimap::ComputeFailure>(())
/// ```
pub fn cluster<R: Rng + ?Sized>(
    points: &[GeoPoint],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Vec<GeoPoint>, ComputeFailure> {
    cluster_with_stats(points, k, max_iterations, rng).map(|clustering| clustering.centers)
}

/// Like [`cluster`], also reporting how the iteration went.
pub fn cluster_with_stats<R: Rng + ?Sized>(
    points: &[GeoPoint],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Clustering, ComputeFailure> {
    if points.is_empty() || k == 0 {
        return Ok(Clustering {
            centers: Vec::new(),
            iterations: 0,
            converged: true,
        });
    }

    if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(ComputeFailure::NonFiniteCoordinate {
            index,
            name: point.name.clone(),
        });
    }

    let coords: Vec<Coord<f64>> = points.iter().map(GeoPoint::coord).collect();
    let k = k.min(coords.len());

    let mut centers = seed_centers(&coords, k, rng);
    let mut assignments = vec![usize::MAX; coords.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        if !assign(&coords, &centers, &mut assignments) {
            converged = true;
            break;
        }
        update_centers(&coords, &assignments, &mut centers);
        iterations += 1;
    }

    if iterations == 0 {
        // No update round ran; still need memberships for the labels.
        assign(&coords, &centers, &mut assignments);
    }

    let mut counts = vec![0usize; k];
    for &cluster in &assignments {
        counts[cluster] += 1;
    }

    log::debug!(
        "k-means over {} points: k={}, {} iterations, converged={}",
        coords.len(),
        k,
        iterations,
        converged
    );

    let centers = centers
        .iter()
        .zip(counts)
        .map(|(center, members)| GeoPoint::cluster(members, center.x, center.y))
        .collect();

    Ok(Clustering {
        centers,
        iterations,
        converged,
    })
}

fn squared_distance(a: &Coord<f64>, b: &Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// k-means++ seeding: each further center is drawn with probability
/// proportional to its squared distance from the nearest chosen center.
fn seed_centers<R: Rng + ?Sized>(coords: &[Coord<f64>], k: usize, rng: &mut R) -> Vec<Coord<f64>> {
    let mut centers = Vec::with_capacity(k);
    let first = coords[rng.random_range(0..coords.len())];
    centers.push(first);

    let mut nearest: Vec<f64> = coords.iter().map(|c| squared_distance(c, &first)).collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().sum();

        let next = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = None;
            for (i, &d) in nearest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                acc += d;
                chosen = Some(i);
                if acc >= target {
                    break;
                }
            }
            // total > 0 guarantees at least one positive weight
            chosen.unwrap_or(0)
        } else {
            // Every point coincides with a chosen center.
            rng.random_range(0..coords.len())
        };

        let center = coords[next];
        centers.push(center);
        for (d, c) in nearest.iter_mut().zip(coords) {
            let candidate = squared_distance(c, &center);
            if candidate < *d {
                *d = candidate;
            }
        }
    }

    centers
}

/// Assign every point to its nearest center, lowest index winning ties.
/// Returns whether any assignment changed.
fn assign(coords: &[Coord<f64>], centers: &[Coord<f64>], assignments: &mut [usize]) -> bool {
    let mut changed = false;
    for (coord, slot) in coords.iter().zip(assignments.iter_mut()) {
        let mut best = 0;
        let mut best_dist = squared_distance(coord, &centers[0]);
        for (j, center) in centers.iter().enumerate().skip(1) {
            let d = squared_distance(coord, center);
            if d < best_dist {
                best_dist = d;
                best = j;
            }
        }
        if *slot != best {
            *slot = best;
            changed = true;
        }
    }
    changed
}

/// Move each center to the mean of its members. Empty clusters stay put.
fn update_centers(coords: &[Coord<f64>], assignments: &[usize], centers: &mut [Coord<f64>]) {
    let mut sums = vec![Coord { x: 0.0, y: 0.0 }; centers.len()];
    let mut counts = vec![0usize; centers.len()];

    for (coord, &cluster) in coords.iter().zip(assignments) {
        sums[cluster].x += coord.x;
        sums[cluster].y += coord.y;
        counts[cluster] += 1;
    }

    for ((center, sum), count) in centers.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            let n = count as f64;
            *center = Coord {
                x: sum.x / n,
                y: sum.y / n,
            };
        }
    }
}
