use crate::point::GeoPoint;
use geo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 2D axis-aligned filter rectangle in longitude/latitude space.
///
/// The sides are stored exactly as given. An inverted box (`left > right` or
/// `bottom > top`) is not normalised and simply matches nothing.
///
/// Containment is exclusive: a point lying on any edge is outside the box.
///
/// # Examples
///
/// ```
/// use poimap_types::bbox::BoundingBox;
/// use poimap_types::point::GeoPoint;
///
/// let manhattan = BoundingBox::new(-74.0479, 40.6829, -73.9067, 40.8820);
/// assert!(manhattan.contains(&GeoPoint::new("NYC", -74.0060, 40.7128)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum longitude
    pub left: f64,
    /// Minimum latitude
    pub bottom: f64,
    /// Maximum longitude
    pub right: f64,
    /// Maximum latitude
    pub top: f64,
}

impl BoundingBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Check if a point lies strictly inside this box.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.longitude > self.left
            && point.longitude < self.right
            && point.latitude > self.bottom
            && point.latitude < self.top
    }

    /// True when no point can satisfy [`contains`](Self::contains).
    pub fn is_degenerate(&self) -> bool {
        !(self.left < self.right && self.bottom < self.top)
    }

    /// Normalised `geo::Rect` covering the same corners.
    ///
    /// `Rect` reorders inverted corners, so this is for display and interop
    /// only. Filtering always goes through [`contains`](Self::contains).
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! { x: self.left, y: self.bottom },
            geo::coord! { x: self.right, y: self.top },
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.bottom, self.right, self.top)
    }
}

/// Failure to parse a `left,bottom,right,top` bounds string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseBoundsError {
    #[error("expected 4 comma-separated values (left,bottom,right,top), found {found}")]
    WrongArity { found: usize },

    #[error("invalid {side} value '{value}'")]
    InvalidNumber { side: &'static str, value: String },
}

const SIDES: [&str; 4] = ["left", "bottom", "right", "top"];

impl FromStr for BoundingBox {
    type Err = ParseBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != SIDES.len() {
            return Err(ParseBoundsError::WrongArity { found: parts.len() });
        }

        let mut values = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            let part = part.trim();
            values[i] = part
                .parse::<f64>()
                .map_err(|_| ParseBoundsError::InvalidNumber {
                    side: SIDES[i],
                    value: part.to_string(),
                })?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}
