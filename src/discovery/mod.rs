//! SSE Clock - Peer discovery
//!
//! The peer rewrites `coreProps.json` every time it starts. This module reads
//! the peer's address from that file and estimates how long ago the address
//! became valid from the file's modification time:
//!
//! - [`FileDiscovery`]: the [`DiscoverySource`](crate::core::DiscoverySource)
//!   used in production
//! - [`ReferenceClock`]: maps file timestamps onto the monotonic clock
//! - [`AddressWatcher`]: wakes the session when the artifact changes
//! - [`default_core_props_path`]: platform location of the artifact

mod anchor;
mod core_props;
mod watch;

pub use anchor::*;
pub use core_props::*;
pub use watch::*;
