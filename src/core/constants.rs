//! Constants shared by the discovery source, transport and session loop.
//!
//! Identity and path values are fixed by the peer's API and MUST NOT be
//! changed: the peer keys registrations on the game and event names.

use std::time::Duration;

// =============================================================================
// DISCOVERY ARTIFACT
// =============================================================================

/// Location of `coreProps.json` relative to the per-machine data directory
/// (`%ProgramData%` on Windows).
pub const CORE_PROPS_RELATIVE_PATH: &str = "SteelSeries/SteelSeries Engine 3/coreProps.json";

/// Absolute location of `coreProps.json` on macOS.
pub const MACOS_CORE_PROPS_PATH: &str =
    "/Library/Application Support/SteelSeries Engine 3/coreProps.json";

/// JSON field of the discovery artifact holding `host:port`.
pub const ADDRESS_FIELD: &str = "address";

/// Scheme prepended to the discovered `host:port`.
pub const ENDPOINT_SCHEME: &str = "http://";

/// Age reported for an artifact whose modification time lies in the future.
pub const ANCIENT_ADDRESS_AGE: Duration = Duration::from_secs(60 * 60);

// =============================================================================
// PEER IDENTITY
// =============================================================================

/// Game identifier registered with the peer.
pub const GAME_ID: &str = "CLOCK_DISPLAY";

/// Human readable name shown by the peer's UI.
pub const GAME_DISPLAY_NAME: &str = "Clock Display";

/// Event identifier carrying the date/time frame.
pub const EVENT_ID: &str = "CLOCK";

/// Peer color id used for the game entry.
pub const ICON_COLOR_ID: u32 = 6;

/// Icon drawn next to the two screen lines (clock icon).
pub const SCREEN_ICON_ID: u32 = 15;

/// Frame key of the first screen line.
pub const FRAME_KEY_DATE: &str = "date";

/// Frame key of the second screen line.
pub const FRAME_KEY_TIME: &str = "time";

// =============================================================================
// PEER ENDPOINTS
// =============================================================================

/// Declares the session's identity.
pub const PATH_GAME_METADATA: &str = "/game_metadata";

/// Declares the screen layout bound to the event.
pub const PATH_BIND_GAME_EVENT: &str = "/bind_game_event";

/// Pushes a new event value.
pub const PATH_GAME_EVENT: &str = "/game_event";

/// Removes the game and all of its events.
pub const PATH_REMOVE_GAME: &str = "/remove_game";

/// Error strings returned by the peer in the `error` field of a non-200 body.
pub mod peer_errors {
    /// Game or event missing, or the JSON body could not be parsed.
    pub const MISSING_GAME_OR_EVENT: &str = "Game or event string not specified";

    /// Anti-spam protection triggered. The only message with its own handling.
    pub const TOO_MANY_REGISTRATIONS: &str =
        "Events for too many games have been registered recently, please try again later";

    /// `bind_game_event` sent without handlers.
    pub const MISSING_HANDLER: &str = "One or more handlers must be specified for binding";

    /// Removing a game that does not exist.
    pub const UNKNOWN_GAME: &str = "That game is not registered";
}

// =============================================================================
// TIMING
// =============================================================================

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Settle threshold: minimum address age before registering after a peer start.
pub const MIN_ADDRESS_AGE: Duration = Duration::from_secs(3);

/// Settle threshold after the peer reported too many registrations.
pub const SPAM_COOLDOWN: Duration = Duration::from_secs(320);

/// First delay after a failure.
pub const MIN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Cap on the exponential failure delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5 * 60);

/// Sleep between polls while waiting for the address to settle.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

// =============================================================================
// LOG FILE
// =============================================================================

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "sseClock.log";

/// Name the log file is renamed to on rotation.
pub const LOG_BACKUP_FILE_NAME: &str = "sseClock.log.bak";

/// Size at which the log file is rotated.
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Filter used when `RUST_LOG` is unset: this crate at `info`, others at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "sse_clock=info,warn";
