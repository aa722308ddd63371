//! In-memory point-of-interest query engine.
//!
//! A static, fully loaded point set answers two kinds of read queries:
//! - **Bounding-box queries**: every point strictly inside a rectangle, in load order
//! - **Cluster views**: below a zoom threshold, the whole set reduced to a fixed
//!   number of k-means cluster centers, computed once and shared by every caller
//!
//! ```rust
//! use poimap::{Config, GeoPoint, PoiService, PointStore};
//!
//! let store = PointStore::from_points(vec![
//!     GeoPoint::new("Museum", -74.0060, 40.7128),
//!     GeoPoint::new("Harbour", -0.1278, 51.5074),
//! ]);
//! let service = PoiService::new(store, Config::default())?;
//!
//! let nearby = service.fetch_within_str("-75,40,-73,41")?;
//! assert_eq!(nearby.len(), 1);
//!
//! let overview = service.fetch_view_str("-180,-90,180,90", "3")?;
//! assert!(overview.is_clusters());
//! # Ok::<(), poimap::PoiError>(())
//! ```

pub mod cache;
pub mod compute;
pub mod config;
pub mod error;
pub mod generator;
pub mod router;
pub mod service;
pub mod storage;
pub mod store;

pub use cache::{CacheError, ClusterCache, WaitTimeout};
pub use config::Config;
pub use error::{ComputeFailure, LoadError, ParseError, PoiError, Result};
pub use router::{QueryRouter, Route, View, resolve};
pub use service::{PoiService, ServiceStats, parse_bounds, parse_zoom};
pub use storage::{DataFile, DataFormat, JsonArrayFile, JsonLinesFile, PointSource, write_points};
pub use store::PointStore;

#[cfg(feature = "snapshot")]
pub use storage::SnapshotFile;

pub use poimap_types::{BoundingBox, GeoPoint, ParseBoundsError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{BoundingBox, Config, GeoPoint, PoiError, PoiService, PointStore, Result, View};

    pub use crate::{DataFile, PointSource};

    pub use crate::compute::{cluster, query};
}
