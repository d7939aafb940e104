// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use super::{Hazard, HazardSource, SourceUnavailable};

const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Format of a hazard dump: a JSON array of [Hazard] objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the compression based on the leading bytes
    #[default]
    Unknown,

    /// Force uncompressed JSON
    Json,

    /// Force JSON with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    JsonGz,

    /// Force JSON with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    JsonBz2,
}

impl FileFormat {
    fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(GZIP_MAGIC) {
            Self::JsonGz
        } else if prefix.starts_with(BZIP2_MAGIC) {
            Self::JsonBz2
        } else {
            Self::Json
        }
    }
}

/// Parse [Hazards](Hazard) from a reader in the provided [FileFormat].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn hazards_from_io<R: io::Read>(
    format: FileFormat,
    reader: R,
) -> Result<Vec<Hazard>, SourceUnavailable> {
    let mut b = io::BufReader::new(reader);

    let format = match format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        known => known,
    };

    let hazards: Vec<Hazard> = match format {
        FileFormat::Unknown | FileFormat::Json => serde_json::from_reader(b)?,

        FileFormat::JsonGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            serde_json::from_reader(io::BufReader::new(d))?
        }

        FileFormat::JsonBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            serde_json::from_reader(io::BufReader::new(d))?
        }
    };
    Ok(hazards)
}

/// Parse [Hazards](Hazard) from a static buffer in the provided [FileFormat].
pub fn hazards_from_buffer(
    format: FileFormat,
    data: &[u8],
) -> Result<Vec<Hazard>, SourceUnavailable> {
    let format = match format {
        FileFormat::Unknown => FileFormat::detect(data),
        known => known,
    };

    if format == FileFormat::Json {
        // Fast path is available for in-memory JSON data
        Ok(serde_json::from_slice(data)?)
    } else {
        hazards_from_io(format, io::Cursor::new(data))
    }
}

/// [HazardSource] re-reading a hazard dump file on every fetch,
/// so that updates to the file are picked up without a restart.
#[derive(Debug, Clone)]
pub struct FileHazardSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileHazardSource {
    pub fn new<P: AsRef<Path>>(path: P, format: FileFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HazardSource for FileHazardSource {
    fn fetch_all(&self) -> Result<Vec<Hazard>, SourceUnavailable> {
        let f = File::open(&self.path)?;
        let hazards = hazards_from_io(self.format, f)?;
        log::debug!("loaded {} hazards from {}", hazards.len(), self.path.display());
        Ok(hazards)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DATA: &[u8] = include_bytes!("test_fixtures/hazards.json");

    fn check_fixture(hazards: &[Hazard]) {
        assert_eq!(hazards.len(), 3);
        assert_eq!(hazards[0].hazard_type, "unsafe area");
        assert_eq!(hazards[0].reported_by.as_deref(), Some("anonymous"));
        assert_eq!(hazards[1].hazard_type, "no streetlight");
        assert_eq!(hazards[1].safety_score, Some(0.35));
        assert_eq!(hazards[2].hazard_type, "stray animals");
        assert_eq!(hazards[2].latitude, -33.8688);
    }

    fn compress_gz(data: &[u8]) -> Vec<u8> {
        let mut e = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    fn compress_bz2(data: &[u8]) -> Vec<u8> {
        let mut e = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    #[test]
    fn json_buffer() {
        check_fixture(&hazards_from_buffer(FileFormat::Json, DATA).unwrap());
    }

    #[test]
    fn json_gz_buffer() {
        let compressed = compress_gz(DATA);
        check_fixture(&hazards_from_buffer(FileFormat::JsonGz, &compressed).unwrap());
    }

    #[test]
    fn json_bz2_io() {
        let compressed = compress_bz2(DATA);
        check_fixture(&hazards_from_io(FileFormat::JsonBz2, compressed.as_slice()).unwrap());
    }

    #[test]
    fn unknown_format_is_detected() {
        check_fixture(&hazards_from_buffer(FileFormat::Unknown, DATA).unwrap());
        check_fixture(&hazards_from_buffer(FileFormat::Unknown, &compress_gz(DATA)).unwrap());
        let compressed = compress_bz2(DATA);
        check_fixture(&hazards_from_io(FileFormat::Unknown, compressed.as_slice()).unwrap());
    }

    #[test]
    fn malformed_json_is_unavailable() {
        let err = hazards_from_buffer(FileFormat::Json, b"[{\"latitude\": }]").unwrap_err();
        assert!(matches!(err, SourceUnavailable::Json(_)));
    }

    #[test]
    fn file_source() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&compress_gz(DATA)).unwrap();
        f.flush().unwrap();

        let source = FileHazardSource::new(f.path(), FileFormat::Unknown);
        check_fixture(&source.fetch_all().unwrap());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileHazardSource::new(dir.path().join("missing.json"), FileFormat::Json);
        assert!(matches!(source.fetch_all(), Err(SourceUnavailable::Io(_))));
    }
}
