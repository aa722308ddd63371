//! JSON encodings: newline-delimited objects and a single array.

use super::PointSource;
use crate::error::LoadError;
use poimap_types::GeoPoint;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One `{"name":..,"longitude":..,"latitude":..}` object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesFile {
    path: PathBuf,
}

impl JsonLinesFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, points: &[GeoPoint]) -> Result<(), LoadError> {
        let file = File::create(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        for point in points {
            serde_json::to_writer(&mut writer, point)
                .map_err(|e| LoadError::io(&self.path, e.into()))?;
            writer
                .write_all(b"\n")
                .map_err(|e| LoadError::io(&self.path, e))?;
        }
        writer.flush().map_err(|e| LoadError::io(&self.path, e))
    }
}

impl PointSource for JsonLinesFile {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        let file = File::open(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        let reader = BufReader::new(file);

        let mut points = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| LoadError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let point = serde_json::from_str(&line)
                .map_err(|source| LoadError::Json { line: i + 1, source })?;
            points.push(point);
        }
        Ok(points)
    }
}

/// A single JSON array of point objects.
#[derive(Debug, Clone)]
pub struct JsonArrayFile {
    path: PathBuf,
}

impl JsonArrayFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, points: &[GeoPoint]) -> Result<(), LoadError> {
        let file = File::create(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, points)
            .map_err(|e| LoadError::io(&self.path, e.into()))?;
        writer.flush().map_err(|e| LoadError::io(&self.path, e))
    }
}

impl PointSource for JsonArrayFile {
    fn read_points(&self) -> Result<Vec<GeoPoint>, LoadError> {
        let file = File::open(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                LoadError::io(&self.path, source.into())
            } else {
                LoadError::Json {
                    line: source.line(),
                    source,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_json_lines_skips_blank_lines() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, r#"{{"name":"a","longitude":1.0,"latitude":2.0}}"#).unwrap();
        writeln!(temp).unwrap();
        writeln!(temp, r#"{{"name":"b","longitude":-1.5,"latitude":0.25}}"#).unwrap();

        let points = JsonLinesFile::new(temp.path()).read_points().unwrap();
        assert_eq!(
            points,
            vec![GeoPoint::new("a", 1.0, 2.0), GeoPoint::new("b", -1.5, 0.25)]
        );
    }

    #[test]
    fn test_json_lines_reports_line_number() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, r#"{{"name":"a","longitude":1.0,"latitude":2.0}}"#).unwrap();
        writeln!(temp, r#"{{"name":"b","longitude":"east"}}"#).unwrap();

        let err = JsonLinesFile::new(temp.path()).read_points().unwrap_err();
        assert!(matches!(err, LoadError::Json { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonLinesFile::new("/definitely/not/here.jsonl")
            .read_points()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_json_array_round_trip() {
        let temp = NamedTempFile::new().unwrap();
        let points = vec![GeoPoint::new("x", 0.5, 0.5)];
        let file = JsonArrayFile::new(temp.path());
        file.write(&points).unwrap();
        assert_eq!(file.read_points().unwrap(), points);
    }

    #[test]
    fn test_json_array_malformed() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"[{{"name":"a","longitude":1.0}}]"#).unwrap();
        let err = JsonArrayFile::new(temp.path()).read_points().unwrap_err();
        assert!(matches!(err, LoadError::Json { line: 1, .. }));
    }
}
