//! Query service over a loaded point store.
//!
//! `PoiService` is what a transport layer talks to. It owns the store, the
//! cluster cache and the router, and exposes the three fetch operations:
//! everything, everything inside a box, and the zoom-aware view.

use crate::cache::{CacheError, ClusterCache};
use crate::compute::{cluster, query};
use crate::config::Config;
use crate::error::{ComputeFailure, LoadError, ParseError, PoiError, Result};
use crate::router::{QueryRouter, View};
use crate::storage::PointSource;
use crate::store::PointStore;
use poimap_types::{BoundingBox, GeoPoint};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Parse a `left,bottom,right,top` bounds string.
pub fn parse_bounds(bounds: &str) -> std::result::Result<BoundingBox, ParseError> {
    Ok(bounds.parse::<BoundingBox>()?)
}

/// Parse an integer zoom level.
pub fn parse_zoom(zoom: &str) -> std::result::Result<i32, ParseError> {
    zoom.trim().parse::<i32>().map_err(|_| ParseError::Zoom {
        value: zoom.to_string(),
    })
}

/// Counters describing the service's activity so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Points in the loaded store (0 when unready)
    pub points: usize,
    /// Fetch requests handled, including malformed and failed ones
    pub requests: u64,
    /// Clustering runs started
    pub cluster_computations: u64,
}

#[derive(Debug)]
enum StoreState {
    Ready(PointStore),
    Unready(LoadError),
}

/// Point-of-interest query service.
///
/// The service is `Send + Sync`; share it between request handlers with an
/// `Arc`.
///
/// # Examples
///
/// ```rust
/// use poimap::{BoundingBox, Config, GeoPoint, PoiService, PointStore};
///
/// let store = PointStore::from_points(vec![
///     GeoPoint::new("a", 0.0, 0.0),
///     GeoPoint::new("b", 0.0, 1.0),
///     GeoPoint::new("c", 10.0, 10.0),
///     GeoPoint::new("d", 10.0, 11.0),
/// ]);
/// let service = PoiService::new(store, Config::default().with_cluster_count(2).with_seed(1))?;
///
/// let zoomed_in = service.fetch_view(Some(BoundingBox::new(-1.0, -1.0, 1.0, 2.0)), 10)?;
/// assert_eq!(zoomed_in.len(), 2);
///
/// let zoomed_out = service.fetch_view(None, 3)?;
/// assert!(zoomed_out.is_clusters());
/// assert_eq!(zoomed_out.len(), 2);
/// # Ok::<(), poimap::PoiError>(())
/// ```
#[derive(Debug)]
pub struct PoiService {
    state: StoreState,
    cache: ClusterCache,
    router: QueryRouter,
    config: Config,
    requests: AtomicU64,
    cluster_computations: AtomicU64,
}

impl PoiService {
    /// Create a ready service over an already loaded store.
    pub fn new(store: PointStore, config: Config) -> Result<Self> {
        Self::with_state(StoreState::Ready(store), config)
    }

    /// Load the store from `source` and create a service.
    ///
    /// A load failure does not make this fail: it is logged and the service
    /// starts unready, answering every fetch with [`PoiError::Unready`].
    /// Only an invalid configuration is returned as an error.
    pub fn start<S: PointSource>(source: S, config: Config) -> Result<Self> {
        let state = match PointStore::load(source) {
            Ok(store) => StoreState::Ready(store),
            Err(e) => {
                log::error!("Unable to load point data, service will stay unready: {}", e);
                let mut cause = std::error::Error::source(&e);
                while let Some(inner) = cause {
                    log::error!("  caused by: {}", inner);
                    cause = inner.source();
                }
                StoreState::Unready(e)
            }
        };
        Self::with_state(state, config)
    }

    fn with_state(state: StoreState, config: Config) -> Result<Self> {
        config.validate().map_err(PoiError::InvalidConfig)?;
        Ok(Self {
            state,
            cache: ClusterCache::new(),
            router: QueryRouter::new(config.zoom_threshold),
            config,
            requests: AtomicU64::new(0),
            cluster_computations: AtomicU64::new(0),
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, StoreState::Ready(_))
    }

    /// The startup load failure, if the service is unready.
    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            StoreState::Ready(_) => None,
            StoreState::Unready(e) => Some(e),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> QueryRouter {
        self.router
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            points: match &self.state {
                StoreState::Ready(store) => store.count(),
                StoreState::Unready(_) => 0,
            },
            requests: self.requests.load(Ordering::Relaxed),
            cluster_computations: self.cluster_computations.load(Ordering::Relaxed),
        }
    }

    fn store(&self) -> Result<&PointStore> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match &self.state {
            StoreState::Ready(store) => Ok(store),
            StoreState::Unready(e) => Err(PoiError::Unready {
                reason: e.to_string(),
            }),
        }
    }

    /// Every point in the store, in load order.
    pub fn fetch_all(&self) -> Result<&[GeoPoint]> {
        let points = self.store()?.all();
        log::debug!("Responding with {} points of interest", points.len());
        Ok(points)
    }

    /// Points strictly inside `bbox`.
    pub fn fetch_within(&self, bbox: &BoundingBox) -> Result<Vec<GeoPoint>> {
        let points = query(self.store()?, bbox);
        log::debug!(
            "Responding with {} points of interest for bounds ({})",
            points.len(),
            bbox
        );
        Ok(points)
    }

    /// [`fetch_within`](Self::fetch_within) for a raw `left,bottom,right,top` string.
    pub fn fetch_within_str(&self, bounds: &str) -> Result<Vec<GeoPoint>> {
        let bbox = parse_bounds(bounds).map_err(|e| self.reject(e))?;
        self.fetch_within(&bbox)
    }

    /// Cluster view below the zoom threshold, otherwise the points inside `bbox`.
    pub fn fetch_view(&self, bbox: Option<BoundingBox>, zoom: i32) -> Result<View> {
        let store = self.store()?;
        let view = self
            .router
            .resolve(store, zoom, bbox, || self.cluster_view(store))?;
        match bbox {
            Some(bbox) => log::debug!(
                "Responding with {} points of interest for bounds ({}) @ zoom {}",
                view.len(),
                bbox,
                zoom
            ),
            None => log::debug!(
                "Responding with {} points of interest @ zoom {}",
                view.len(),
                zoom
            ),
        }
        Ok(view)
    }

    /// [`fetch_view`](Self::fetch_view) for raw transport strings.
    ///
    /// Below the zoom threshold the bounds are never parsed, so a zoomed-out
    /// request with a malformed box still gets the cluster view.
    pub fn fetch_view_str(&self, bounds: &str, zoom: &str) -> Result<View> {
        let zoom = parse_zoom(zoom).map_err(|e| self.reject(e))?;
        if zoom < self.router.threshold() {
            return self.fetch_view(None, zoom);
        }
        let bbox = parse_bounds(bounds).map_err(|e| self.reject(e))?;
        self.fetch_view(Some(bbox), zoom)
    }

    /// Count a request that failed to parse and turn its error into a `PoiError`.
    fn reject(&self, err: ParseError) -> PoiError {
        self.requests.fetch_add(1, Ordering::Relaxed);
        log::debug!("Rejecting malformed request: {}", err);
        PoiError::Parse(err)
    }

    /// The shared cluster view, computing it on first use.
    pub fn fetch_clusters(&self) -> Result<Arc<Vec<GeoPoint>>> {
        let store = self.store()?;
        self.cluster_view(store)
    }

    fn cluster_view(&self, store: &PointStore) -> Result<Arc<Vec<GeoPoint>>> {
        let compute = || self.compute_clusters(store);

        let result = match self.config.cluster_wait_timeout() {
            Some(timeout) => self
                .cache
                .get_or_try_compute_timeout(compute, timeout)
                .map_err(|e| match e {
                    CacheError::Compute(failure) => PoiError::Compute(failure),
                    CacheError::Timeout(t) => PoiError::ClusterTimeout { waited: t.waited },
                }),
            None => self
                .cache
                .get_or_try_compute(compute)
                .map_err(PoiError::Compute),
        };

        match result {
            Err(PoiError::Compute(failure)) => {
                log::error!("Cluster computation failed, serving empty view: {}", failure);
                Ok(Arc::new(Vec::new()))
            }
            other => other,
        }
    }

    fn compute_clusters(
        &self,
        store: &PointStore,
    ) -> std::result::Result<Vec<GeoPoint>, ComputeFailure> {
        self.cluster_computations.fetch_add(1, Ordering::Relaxed);

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let started = Instant::now();
        let centers = cluster(
            store.all(),
            self.config.cluster_count,
            self.config.max_iterations,
            &mut rng,
        )?;
        log::info!(
            "Computed {} clusters from {} points in {:?}",
            centers.len(),
            store.count(),
            started.elapsed()
        );
        Ok(centers)
    }
}
