// geotag/src/handoff/store.rs
use crate::core::{GeotagError, GeotagRecord, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receives confirmed records. Implementations either accept the record or
/// report why they could not.
pub trait RecordStore {
    fn persist(&mut self, record: &GeotagRecord) -> Result<()>;
}

/// Writes each confirmed record as pretty-printed JSON to a single file,
/// replacing whatever was there.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_file(&self, path: &Path, record: &GeotagRecord) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|e| {
            GeotagError::Persistence(format!(
                "Failed to write record to {}: {}",
                self.path.display(),
                e
            ))
        })?;
        writer.flush()?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn persist(&mut self, record: &GeotagRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // the target is only replaced by a complete file
        let temp_path = self.temp_path();
        let written = self
            .write_file(&temp_path, record)
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(GeotagError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        log::debug!("Wrote record to {}", self.path.display());
        Ok(())
    }
}
