//! Point sources for loading a data set at startup.
//!
//! The query engine only needs a sequence of points; how they are encoded on
//! disk is up to the source. This module provides the [`PointSource`] trait,
//! file formats selected by extension, and writers for producing data files.

use crate::error::LoadError;
use poimap_types::GeoPoint;
use std::path::{Path, PathBuf};

mod json;
#[cfg(feature = "snapshot")]
mod snapshot;

pub use json::{JsonArrayFile, JsonLinesFile};
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotFile;

/// Anything that can produce the full point set in one go.
pub trait PointSource {
    /// Read every point, in order. Partial results are never returned.
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError>;
}

impl PointSource for Vec<GeoPoint> {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        Ok(self.clone())
    }
}

impl PointSource for [GeoPoint] {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        Ok(self.to_vec())
    }
}

impl<S: PointSource + ?Sized> PointSource for &S {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        (**self).read_points()
    }
}

/// On-disk encodings understood by [`DataFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// One JSON object per line (`.jsonl`, `.ndjson`)
    JsonLines,
    /// A single JSON array (`.json`)
    JsonArray,
    /// Binary snapshot (`.snap`, `.bin`)
    #[cfg(feature = "snapshot")]
    Snapshot,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            "json" => Some(Self::JsonArray),
            #[cfg(feature = "snapshot")]
            "snap" | "bin" => Some(Self::Snapshot),
            _ => None,
        }
    }
}

/// A data file whose format is chosen by its extension.
///
/// ```rust,no_run
/// use poimap::{DataFile, PointStore};
///
/// let store = PointStore::load(DataFile::open("data/poi.jsonl")?)?;
/// # Ok::<(), poimap::LoadError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
    format: DataFormat,
}

impl DataFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let format =
            DataFormat::from_path(&path).ok_or_else(|| LoadError::UnsupportedFormat(path.clone()))?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }
}

impl PointSource for DataFile {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        log::debug!("Reading {:?} data from {}", self.format, self.path.display());
        match self.format {
            DataFormat::JsonLines => JsonLinesFile::new(&self.path).read_points(),
            DataFormat::JsonArray => JsonArrayFile::new(&self.path).read_points(),
            #[cfg(feature = "snapshot")]
            DataFormat::Snapshot => SnapshotFile::new(&self.path).read_points(),
        }
    }
}

/// Write `points` to `path` in the format implied by its extension.
pub fn write_points<P: AsRef<Path>>(path: P, points: &[GeoPoint]) -> Result<(), LoadError> {
    let file = DataFile::open(path)?;
    match file.format {
        DataFormat::JsonLines => JsonLinesFile::new(&file.path).write(points),
        DataFormat::JsonArray => JsonArrayFile::new(&file.path).write(points),
        #[cfg(feature = "snapshot")]
        DataFormat::Snapshot => SnapshotFile::new(&file.path).write(points),
    }
}
