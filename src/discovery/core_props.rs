//! `coreProps.json` discovery source.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::anchor::ReferenceClock;
use crate::core::{
    ADDRESS_FIELD, CORE_PROPS_RELATIVE_PATH, DiscoveryError, DiscoverySource, ENDPOINT_SCHEME,
    MACOS_CORE_PROPS_PATH,
};

/// Platform location of the peer's `coreProps.json`.
///
/// - Windows: `%ProgramData%/SteelSeries/SteelSeries Engine 3/coreProps.json`
/// - macOS: `/Library/Application Support/SteelSeries Engine 3/coreProps.json`
/// - elsewhere: the same relative path under the user's data directory
pub fn default_core_props_path() -> Result<PathBuf, DiscoveryError> {
    if cfg!(target_os = "windows") {
        let program_data = std::env::var_os("ProgramData").ok_or(DiscoveryError::NoLocation)?;
        return Ok(PathBuf::from(program_data).join(CORE_PROPS_RELATIVE_PATH));
    }
    if cfg!(target_os = "macos") {
        return Ok(PathBuf::from(MACOS_CORE_PROPS_PATH));
    }
    dirs::data_dir()
        .map(|dir| dir.join(CORE_PROPS_RELATIVE_PATH))
        .ok_or(DiscoveryError::NoLocation)
}

/// Reads the peer address from `coreProps.json`.
///
/// The reference clock is anchored when the source is created, so the age of
/// an unchanged file is reproducible across polls.
#[derive(Debug)]
pub struct FileDiscovery {
    path: PathBuf,
    reference: ReferenceClock,
    /// Last reported read failure, to log each failure episode once.
    last_problem: Option<String>,
    /// Last modification time reported as lying in the future.
    future_mtime: Option<SystemTime>,
}

impl FileDiscovery {
    /// Create a source reading the artifact at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_reference(path, ReferenceClock::new())
    }

    /// Create a source with an explicit reference clock.
    pub fn with_reference(path: impl Into<PathBuf>, reference: ReferenceClock) -> Self {
        Self {
            path: path.into(),
            reference,
            last_problem: None,
            future_mtime: None,
        }
    }

    /// Create a source reading the artifact at its platform location.
    pub fn from_default_location() -> Result<Self, DiscoveryError> {
        Ok(Self::new(default_core_props_path()?))
    }

    /// Path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the artifact and return the raw `host:port` value.
    pub fn read_address(&self) -> Result<String, DiscoveryError> {
        let contents = fs::read_to_string(&self.path)?;
        let props: serde_json::Value = serde_json::from_str(&contents)?;
        let address = props
            .get(ADDRESS_FIELD)
            .ok_or(DiscoveryError::MissingAddress)?
            .as_str()
            .ok_or(DiscoveryError::NonStringAddress)?;
        if address.is_empty() {
            return Err(DiscoveryError::EmptyAddress);
        }
        Ok(address.to_owned())
    }

    /// Last modification time of the artifact.
    pub fn modified(&self) -> std::io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    fn note_problem(&mut self, err: &DiscoveryError) {
        let problem = err.to_string();
        if self.last_problem.as_deref() != Some(problem.as_str()) {
            warn!(path = %self.path.display(), error = %problem, "peer address unavailable");
            self.last_problem = Some(problem);
        }
    }
}

impl DiscoverySource for FileDiscovery {
    fn current_address(&mut self) -> Option<String> {
        match self.read_address() {
            Ok(address) => {
                self.last_problem = None;
                Some(format!("{ENDPOINT_SCHEME}{address}"))
            }
            Err(err) => {
                self.note_problem(&err);
                None
            }
        }
    }

    fn address_stamp(&mut self) -> Option<Instant> {
        let modified = match self.modified() {
            Ok(modified) => modified,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read address file age");
                return None;
            }
        };

        let (stamp, ahead) = self.reference.settle(modified, Instant::now());
        match ahead {
            Some(ahead) => {
                if self.future_mtime != Some(modified) {
                    warn!(?ahead, "address file has a modification time in the future");
                    self.future_mtime = Some(modified);
                }
            }
            None => {
                self.future_mtime = None;
                debug!(age = ?Instant::now().saturating_duration_since(stamp), "address file age");
            }
        }
        Some(stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CapturedLogs;
    use std::time::Duration;

    fn write_props(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("coreProps.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reads_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(&dir, r#"{"address":"127.0.0.1:51234","encrypted_address":"x"}"#);
        let mut source = FileDiscovery::new(path);

        assert_eq!(
            source.current_address().as_deref(),
            Some("http://127.0.0.1:51234")
        );
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileDiscovery::new(dir.path().join("absent.json"));

        assert!(source.current_address().is_none());
        assert!(source.address_stamp().is_none());
        assert!(matches!(source.read_address(), Err(DiscoveryError::Io(_))));
    }

    #[test]
    fn test_invalid_contents_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("{not json", "json"),
            (r#"{"port": 1}"#, "missing"),
            (r#"{"address": 51234}"#, "non-string"),
            (r#"{"address": ""}"#, "empty"),
        ];

        for (contents, label) in cases {
            let mut source = FileDiscovery::new(write_props(&dir, contents));
            assert!(source.current_address().is_none(), "{label}");
        }

        let source = FileDiscovery::new(write_props(&dir, r#"{"address": 51234}"#));
        assert!(matches!(
            source.read_address(),
            Err(DiscoveryError::NonStringAddress)
        ));
    }

    #[test]
    fn test_recovers_after_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(&dir, "{}");
        let mut source = FileDiscovery::new(&path);
        assert!(source.current_address().is_none());

        fs::write(&path, r#"{"address":"localhost:6000"}"#).unwrap();
        assert_eq!(
            source.current_address().as_deref(),
            Some("http://localhost:6000")
        );
    }

    #[test]
    fn test_stamp_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(&dir, r#"{"address":"127.0.0.1:1"}"#);
        let mut source = FileDiscovery::new(path);

        let first = source.address_stamp().unwrap();
        let second = source.address_stamp().unwrap();
        assert_eq!(first, second);
        assert!(first <= Instant::now());
    }

    #[test]
    fn test_future_stamp_is_ancient() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(&dir, r#"{"address":"127.0.0.1:1"}"#);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(24 * 60 * 60))
            .unwrap();

        let reference = ReferenceClock::new();
        let mut source = FileDiscovery::with_reference(path, reference);

        assert_eq!(source.address_stamp(), Some(reference.ancient()));
    }

    #[test]
    fn test_future_mtime_warned_once() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let dir = tempfile::tempdir().unwrap();
        let path = write_props(&dir, r#"{"address":"127.0.0.1:1"}"#);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60 * 60))
            .unwrap();

        let mut source = FileDiscovery::new(&path);
        for _ in 0..5 {
            assert!(source.address_stamp().is_some());
        }
        assert_eq!(logs.count("modification time in the future"), 1);

        // A different future time is reported again.
        file.set_modified(SystemTime::now() + Duration::from_secs(2 * 60 * 60))
            .unwrap();
        source.address_stamp();
        assert_eq!(logs.count("modification time in the future"), 2);
    }
}
