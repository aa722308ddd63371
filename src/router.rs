//! Zoom-based choice between the cluster view and a bounded point query.

use crate::compute::query;
use crate::store::PointStore;
use poimap_types::{BoundingBox, GeoPoint};
use std::ops::Deref;
use std::sync::Arc;

/// Which data a request is answered with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route {
    /// The shared cluster view; any bounding box is ignored
    Clusters,
    /// Points strictly inside the box
    Within(BoundingBox),
    /// High zoom without a box: every point
    All,
}

/// Points returned for a zoom-aware request.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Cluster centers shared with every other zoomed-out request
    Clusters(Arc<Vec<GeoPoint>>),
    /// Points selected for this request
    Points(Vec<GeoPoint>),
}

impl View {
    pub fn as_slice(&self) -> &[GeoPoint] {
        match self {
            View::Clusters(centers) => centers.as_slice(),
            View::Points(points) => points.as_slice(),
        }
    }

    pub fn is_clusters(&self) -> bool {
        matches!(self, View::Clusters(_))
    }

    pub fn into_vec(self) -> Vec<GeoPoint> {
        match self {
            View::Clusters(centers) => Arc::unwrap_or_clone(centers),
            View::Points(points) => points,
        }
    }
}

impl Deref for View {
    type Target = [GeoPoint];

    fn deref(&self) -> &[GeoPoint] {
        self.as_slice()
    }
}

/// Stateless dispatcher holding the zoom threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRouter {
    threshold: i32,
}

impl QueryRouter {
    pub const DEFAULT_THRESHOLD: i32 = 8;

    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn route(&self, zoom: i32, bbox: Option<BoundingBox>) -> Route {
        if zoom < self.threshold {
            Route::Clusters
        } else {
            match bbox {
                Some(bbox) => Route::Within(bbox),
                None => Route::All,
            }
        }
    }

    /// Answer a request, calling `clusters` only for zoomed-out requests.
    pub fn resolve<F, E>(
        &self,
        store: &PointStore,
        zoom: i32,
        bbox: Option<BoundingBox>,
        clusters: F,
    ) -> Result<View, E>
    where
        F: FnOnce() -> Result<Arc<Vec<GeoPoint>>, E>,
    {
        match self.route(zoom, bbox) {
            Route::Clusters => clusters().map(View::Clusters),
            Route::Within(bbox) => Ok(View::Points(query(store, &bbox))),
            Route::All => Ok(View::Points(store.all().to_vec())),
        }
    }
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

/// Free-function form of [`QueryRouter::resolve`].
pub fn resolve<F, E>(
    store: &PointStore,
    zoom: i32,
    bbox: Option<BoundingBox>,
    threshold: i32,
    clusters: F,
) -> Result<View, E>
where
    F: FnOnce() -> Result<Arc<Vec<GeoPoint>>, E>,
{
    QueryRouter::new(threshold).resolve(store, zoom, bbox, clusters)
}
