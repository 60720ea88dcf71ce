use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

pub mod canvas;
pub mod curve;
pub mod diurnal;
pub mod error;
pub mod landscape;
pub mod list_forecast;
pub mod location;
pub mod mapper;
pub mod owm;
pub mod render;
pub mod sprites;
pub mod sun;
pub mod time;
pub mod weather;

pub use error::{Error, Result};

/// Byte store for raw weather payloads.
pub trait Cache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Data directory holding gzip compressed cache entries.
#[derive(Debug)]
pub struct Data {
    dir: PathBuf,
}

impl Data {
    pub fn from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        Ok(Self {
            dir: path.to_owned(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.gz", key))
    }
}

impl Cache for Data {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut buf = Vec::new();
        GzDecoder::new(fs::File::open(&path)?).read_to_end(&mut buf)?;
        tracing::debug!(key, bytes = buf.len(), "cache hit");
        Ok(Some(buf))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut w = GzEncoder::new(fs::File::create(self.path_for(key))?, Compression::default());
        w.write_all(value)?;
        w.finish()?;
        tracing::debug!(key, bytes = value.len(), "cache write");
        Ok(())
    }
}
