//! Query algorithms over the point store.

pub mod cluster;
pub mod query;

pub use cluster::{Clustering, cluster, cluster_with_stats};
pub use query::{count_within, query};
