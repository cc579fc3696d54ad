//! Size-rotated append-only log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::core::{LOG_BACKUP_FILE_NAME, LOG_FILE_NAME, MAX_LOG_SIZE};

/// Log file that is moved aside once it grows past a size limit.
///
/// Every new file begins with a `Log start` line. Before a full file is
/// renamed to its backup name (replacing the previous backup), a
/// `Log rotation` line is appended to it.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    backup: PathBuf,
    max_size: u64,
    current: Mutex<Option<OpenLog>>,
}

#[derive(Debug)]
struct OpenLog {
    file: File,
    len: u64,
}

impl OpenLog {
    fn marker(&mut self, what: &str) -> io::Result<()> {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let line = format!("[{stamp}] - {what}\n");
        self.file.write_all(line.as_bytes())?;
        self.len += line.len() as u64;
        Ok(())
    }
}

impl RotatingFile {
    /// Log to `sseClock.log` in `directory`, rotating at 10 MiB.
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self::with_limit(directory, MAX_LOG_SIZE)
    }

    /// Log to `sseClock.log` in `directory`, rotating at `max_size` bytes.
    pub fn with_limit(directory: impl AsRef<Path>, max_size: u64) -> Self {
        let directory = directory.as_ref();
        Self {
            path: directory.join(LOG_FILE_NAME),
            backup: directory.join(LOG_BACKUP_FILE_NAME),
            max_size,
            current: Mutex::new(None),
        }
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the log file is rotated to.
    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Append one formatted record, rotating first if the file is full.
    pub fn append(&self, record: &[u8]) -> io::Result<()> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let mut log = match current.take() {
            Some(log) => log,
            None => self.open()?,
        };
        if log.len >= self.max_size {
            log = self.rotate(log)?;
        }
        log.file.write_all(record)?;
        log.len += record.len() as u64;
        *current = Some(log);
        Ok(())
    }

    fn open(&self) -> io::Result<OpenLog> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let len = file.metadata()?.len();
        let mut log = OpenLog { file, len };
        if len == 0 {
            log.marker("Log start")?;
        }
        Ok(log)
    }

    fn rotate(&self, mut full: OpenLog) -> io::Result<OpenLog> {
        // Best effort: the full file is dropped below either way.
        let _ = full.marker("Log rotation");
        drop(full);

        let _ = fs::remove_file(&self.backup);
        if fs::rename(&self.path, &self.backup).is_err() {
            // Could not move it aside; start over in place.
            File::create(&self.path)?;
        }
        self.open()
    }
}

/// Writer handed out per event by [`RotatingFile`].
#[derive(Debug)]
pub struct RotatingWriter<'a> {
    target: &'a RotatingFile,
}

impl Write for RotatingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.target.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriter { target: self }
    }
}
