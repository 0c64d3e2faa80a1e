//! FileSink - appends rendered lines to disk with optional size rotation

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use contracts::{Level, LogContext, LogError, LogSink};
use dispatcher::{SinkHandle, SinkSetting};

use crate::format::{render_line, LineFormat};
use crate::{default_queue_capacity, default_true};

/// Configuration for the file sink
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileSetting {
    /// Whether the sink is built at init time
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log file path; parent directories are created on demand
    #[validate(length(min = 1, message = "file path is not set"))]
    pub path: String,
    /// Severity floor
    #[serde(default)]
    pub minimum_level: Level,
    /// Line format
    #[serde(default)]
    pub format: LineFormat,
    /// Rotate once the file reaches this many megabytes
    #[serde(default)]
    pub max_size_mb: Option<u64>,
    /// Keep at most this many rotated backups
    #[serde(default)]
    pub max_backups: Option<usize>,
    /// Delete rotated backups older than this many days
    #[serde(default)]
    pub max_age_days: Option<u64>,
    /// Gzip rotated backups
    #[serde(default)]
    pub compress: bool,
    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl FileSetting {
    /// Minimal setting: append to `path` with defaults, no rotation
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
            minimum_level: Level::Info,
            format: LineFormat::Text,
            max_size_mb: None,
            max_backups: None,
            max_age_days: None,
            compress: false,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SinkSetting for FileSetting {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn build(&self) -> Result<SinkHandle, LogError> {
        self.validate()
            .map_err(|e| LogError::configuration("file", e.to_string()))?;
        let sink = FileSink::open(self)?;
        Ok(SinkHandle::spawn(sink, self.minimum_level, self.queue_capacity))
    }
}

/// Sink that appends events to a log file
pub struct FileSink {
    name: String,
    path: PathBuf,
    format: LineFormat,
    file: File,
    /// Bytes in the active file, tracked for rotation
    written: u64,
    max_size: Option<u64>,
    max_backups: Option<usize>,
    max_age_days: Option<u64>,
    compress: bool,
}

impl FileSink {
    /// Open (or create) the log file described by `setting`
    ///
    /// # Errors
    /// Returns [`LogError::Configuration`] when the path is unusable.
    pub fn open(setting: &FileSetting) -> Result<Self, LogError> {
        if setting.path.is_empty() {
            return Err(LogError::configuration("file", "file path is not set"));
        }

        let path = PathBuf::from(&setting.path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                LogError::configuration("file", format!("cannot create log directory: {e}"))
            })?;
        }

        let file = open_append(&path)
            .map_err(|e| LogError::configuration("file", format!("cannot open log file: {e}")))?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            name: "file".to_string(),
            path,
            format: setting.format,
            file,
            written,
            max_size: setting.max_size_mb.map(|mb| mb * 1024 * 1024),
            max_backups: setting.max_backups,
            max_age_days: setting.max_age_days,
            compress: setting.compress,
        })
    }

    fn write_line(
        &mut self,
        level: Level,
        message: &str,
        context: &LogContext,
    ) -> Result<(), LogError> {
        if let Err(e) = self.rotate_if_needed() {
            // Rotation trouble must not lose the event; keep appending
            warn!(sink = %self.name, error = %e, "Rotation failed");
        }

        let line = render_line(self.format, level, message, context);
        writeln!(self.file, "{line}")
            .map_err(|e| LogError::sink_write(&self.name, e.to_string()))?;
        self.written += line.len() as u64 + 1;
        Ok(())
    }

    fn rotate_if_needed(&mut self) -> io::Result<()> {
        let Some(max_size) = self.max_size else {
            return Ok(());
        };
        if self.written < max_size {
            return Ok(());
        }

        self.file.flush()?;

        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        let backup = PathBuf::from(format!("{}.{stamp}", self.path.display()));
        fs::rename(&self.path, &backup)?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        debug!(sink = %self.name, backup = %backup.display(), "Rotated log file");

        if self.compress {
            if let Err(e) = compress_backup(&backup) {
                warn!(sink = %self.name, error = %e, "Backup compression failed");
            }
        }

        if let Err(e) = self.prune_backups() {
            warn!(sink = %self.name, error = %e, "Backup pruning failed");
        }

        Ok(())
    }

    /// Apply the max-backups and max-age retention policies
    fn prune_backups(&self) -> io::Result<()> {
        if self.max_backups.is_none() && self.max_age_days.is_none() {
            return Ok(());
        }

        let mut backups = self.list_backups()?;
        // Backup names embed a sortable UTC stamp; oldest first
        backups.sort();

        if let Some(max_age_days) = self.max_age_days {
            let cutoff = std::time::SystemTime::now()
                .checked_sub(std::time::Duration::from_secs(max_age_days * 24 * 3600));
            if let Some(cutoff) = cutoff {
                backups.retain(|path| match fs::metadata(path).and_then(|m| m.modified()) {
                    Ok(modified) if modified < cutoff => {
                        let _ = fs::remove_file(path);
                        false
                    }
                    _ => true,
                });
            }
        }

        if let Some(max_backups) = self.max_backups {
            while backups.len() > max_backups {
                let oldest = backups.remove(0);
                fs::remove_file(oldest)?;
            }
        }

        Ok(())
    }

    fn list_backups(&self) -> io::Result<Vec<PathBuf>> {
        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let active = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = format!("{active}.");

        let mut backups = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                backups.push(entry.path());
            }
        }
        Ok(backups)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Gzip a rotated backup in place, replacing the uncompressed file
fn compress_backup(path: &Path) -> io::Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let mut input = File::open(path)?;
    let output = File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.flush()?;
    fs::remove_file(path)?;
    Ok(())
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Info, message, context)
    }

    async fn warn(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Warning, message, context)
    }

    async fn error(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Error, message, context)
    }

    async fn fatal(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Fatal, message, context)
    }

    async fn flush(&mut self) -> Result<(), LogError> {
        self.file.flush()?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LogError> {
        self.file.flush()?;
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
