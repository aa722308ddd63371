//! # poimap-types
//!
//! Plain data types shared by the poimap query engine and its front ends.
//!
//! - **Point type**: `GeoPoint`, a labelled longitude/latitude pair used for both
//!   raw points of interest and synthesized cluster centers
//! - **Bounding box**: `BoundingBox`, an exclusive axis-aligned filter rectangle
//!   with a parser for the `left,bottom,right,top` transport form
//!
//! ## Examples
//!
//! ```rust
//! use poimap_types::bbox::BoundingBox;
//! use poimap_types::point::GeoPoint;
//!
//! let bbox: BoundingBox = "-1, -1, 1, 1".parse().unwrap();
//! assert!(bbox.contains(&GeoPoint::new("origin", 0.0, 0.0)));
//! assert!(!bbox.contains(&GeoPoint::new("corner", 1.0, 1.0)));
//! ```

pub mod bbox;
pub mod point;

pub use bbox::{BoundingBox, ParseBoundsError};
pub use point::GeoPoint;
