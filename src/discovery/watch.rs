//! Change notifications for the discovery artifact.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::Notify;
use tracing::{debug, error};

use crate::core::DiscoveryError;

/// Wakes the session when `coreProps.json` changes on disk.
///
/// The parent directory is watched rather than the file, so the watch stays
/// valid while the peer replaces the file. Dropping the watcher stops the
/// notifications.
pub struct AddressWatcher {
    _watcher: RecommendedWatcher,
    wake: Arc<Notify>,
}

impl AddressWatcher {
    /// Start watching the artifact at `path`.
    pub fn new(path: &Path) -> Result<Self, DiscoveryError> {
        let name = path
            .file_name()
            .map(OsString::from)
            .ok_or(DiscoveryError::NoLocation)?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let wake = Arc::new(Notify::new());
        let signal = Arc::clone(&wake);
        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<Event>| match event {
                Ok(event) => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name() == Some(name.as_os_str()));
                    if ours {
                        debug!(kind = ?event.kind, "address file event");
                        signal.notify_one();
                    }
                }
                Err(err) => error!(error = %err, "address file watch failed"),
            })?;
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            wake,
        })
    }

    /// Notified once per batch of changes to the artifact.
    ///
    /// A change that happens while nobody waits is remembered until the next
    /// wait.
    pub fn wake(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }
}
