//! Binary snapshot encoding.
//!
//! Layout: the `POIMAP_SNAPSHOT` magic, one version byte, then the point list
//! encoded with bincode. Writes go to a temporary file that atomically replaces
//! the previous snapshot.

use super::PointSource;
use crate::error::LoadError;
use poimap_types::GeoPoint;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_MAGIC: &[u8] = b"POIMAP_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn write(&self, points: &[GeoPoint]) -> Result<(), LoadError> {
        let temp_path = self.temp_path();

        let result = self
            .write_temp(&temp_path, points)
            .and_then(|()| {
                std::fs::rename(&temp_path, &self.path).map_err(|e| LoadError::io(&self.path, e))
            });
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        log::debug!(
            "Wrote snapshot of {} points to {}",
            points.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, points: &[GeoPoint]) -> Result<(), LoadError> {
        let io_err = |e| LoadError::io(temp_path, e);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(io_err)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(SNAPSHOT_MAGIC).map_err(io_err)?;
        writer.write_all(&[SNAPSHOT_VERSION]).map_err(io_err)?;
        bincode::serialize_into(&mut writer, points)?;

        writer.flush().map_err(io_err)?;
        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }
}

impl PointSource for SnapshotFile {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        let file = File::open(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
        reader
            .read_exact(&mut magic)
            .map_err(|_| LoadError::InvalidFormat("snapshot header is truncated".to_string()))?;
        if magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidFormat(
                "missing snapshot magic".to_string(),
            ));
        }

        let mut version = [0u8; 1];
        reader
            .read_exact(&mut version)
            .map_err(|_| LoadError::InvalidFormat("snapshot header is truncated".to_string()))?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(LoadError::InvalidFormat(format!(
                "unsupported snapshot version {}",
                version[0]
            )));
        }

        Ok(bincode::deserialize_from(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_snapshot_roundtrip() {
        let temp = NamedTempFile::new().unwrap();
        let snapshot = SnapshotFile::new(temp.path());

        let points: Vec<GeoPoint> = (0..100)
            .map(|i| GeoPoint::new(format!("Point-{}", i), i as f64 * 0.5, -(i as f64)))
            .collect();
        snapshot.write(&points).unwrap();

        assert!(snapshot.exists());
        assert_eq!(snapshot.read_points().unwrap(), points);
        assert!(!snapshot.temp_path().exists());
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("poi.snap");
        std::fs::create_dir(&target).unwrap();

        let snapshot = SnapshotFile::new(&target);
        let err = snapshot
            .write(&[GeoPoint::new("a", 1.0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(!snapshot.temp_path().exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_snapshot_rejects_bad_magic() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"NOT_A_SNAPSHOT_FILE").unwrap();

        let err = SnapshotFile::new(temp.path()).read_points().unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_snapshot_rejects_unknown_version() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(SNAPSHOT_MAGIC).unwrap();
        temp.write_all(&[99]).unwrap();

        let err = SnapshotFile::new(temp.path()).read_points().unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_snapshot_truncated_body() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(SNAPSHOT_MAGIC).unwrap();
        temp.write_all(&[SNAPSHOT_VERSION]).unwrap();
        temp.write_all(&[5, 0, 0]).unwrap();

        let err = SnapshotFile::new(temp.path()).read_points().unwrap_err();
        assert!(matches!(err, LoadError::Snapshot(_)));
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let temp = NamedTempFile::new().unwrap();
        let err = SnapshotFile::new(temp.path()).read_points().unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }
}
