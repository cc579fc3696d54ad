//! JSON bodies sent to the peer.
//!
//! Field names follow the peer's API, including its hyphenated handler keys.

use serde::{Deserialize, Serialize};

use crate::core::{
    EVENT_ID, FRAME_KEY_DATE, FRAME_KEY_TIME, GAME_DISPLAY_NAME, GAME_ID, ICON_COLOR_ID,
    SCREEN_ICON_ID,
};

/// Body of `/game_metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct GameMetadata<'a> {
    /// Game identifier.
    pub game: &'a str,
    /// Name shown in the peer's UI.
    pub game_display_name: &'a str,
    /// Peer color id.
    pub icon_color_id: u32,
}

/// Body of `/bind_game_event`.
#[derive(Debug, Clone, Serialize)]
pub struct BindGameEvent<'a> {
    /// Game identifier.
    pub game: &'a str,
    /// Event identifier.
    pub event: &'a str,
    /// Display handlers for the event.
    pub handlers: Vec<ScreenHandler<'a>>,
}

/// A handler drawing the event on a screened device.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenHandler<'a> {
    /// Device class (`screened`).
    #[serde(rename = "device-type")]
    pub device_type: &'a str,
    /// Zone on the device.
    pub zone: &'a str,
    /// Handler mode (`screen`).
    pub mode: &'a str,
    /// Frames to draw.
    pub datas: Vec<ScreenFrame<'a>>,
}

/// One screen frame.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenFrame<'a> {
    /// Icon drawn beside the lines.
    #[serde(rename = "icon-id")]
    pub icon_id: u32,
    /// Text lines.
    pub lines: Vec<ScreenLine<'a>>,
}

/// One text line bound to a key of the event's frame.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenLine<'a> {
    /// The line shows text.
    #[serde(rename = "has-text")]
    pub has_text: bool,
    /// Frame key supplying the text.
    #[serde(rename = "context-frame-key")]
    pub context_frame_key: &'a str,
}

/// Body of `/game_event`.
#[derive(Debug, Clone, Serialize)]
pub struct GameEvent<'a> {
    /// Game identifier.
    pub game: &'a str,
    /// Event identifier.
    pub event: &'a str,
    /// Event payload.
    pub data: EventData<'a>,
}

/// Payload of a game event.
#[derive(Debug, Clone, Serialize)]
pub struct EventData<'a> {
    /// Event value. The peer only redraws when value or frame change.
    pub value: &'a str,
    /// Frame keys referenced by the bound screen lines.
    pub frame: EventFrame<'a>,
}

/// Frame of the clock event.
#[derive(Debug, Clone, Serialize)]
pub struct EventFrame<'a> {
    /// Date line.
    pub date: &'a str,
    /// Time line.
    pub time: &'a str,
}

/// Body of `/remove_game`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveGame<'a> {
    /// Game identifier.
    pub game: &'a str,
}

/// Error body returned by the peer with non-200 responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerErrorBody {
    /// Error message, if any.
    #[serde(default)]
    pub error: Option<String>,
}

/// The game and event this process registers with the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameIdentity {
    /// Game identifier (upper-case A-Z, 0-9, hyphen, underscore).
    pub game: String,
    /// Name shown in the peer's UI.
    pub display_name: String,
    /// Event identifier.
    pub event: String,
    /// Peer color id.
    pub icon_color_id: u32,
}

impl Default for GameIdentity {
    fn default() -> Self {
        Self {
            game: GAME_ID.to_string(),
            display_name: GAME_DISPLAY_NAME.to_string(),
            event: EVENT_ID.to_string(),
            icon_color_id: ICON_COLOR_ID,
        }
    }
}

impl GameIdentity {
    /// `/game_metadata` body.
    pub fn metadata(&self) -> GameMetadata<'_> {
        GameMetadata {
            game: &self.game,
            game_display_name: &self.display_name,
            icon_color_id: self.icon_color_id,
        }
    }

    /// `/bind_game_event` body: a screen with a date line and a time line.
    pub fn bind_event(&self) -> BindGameEvent<'_> {
        BindGameEvent {
            game: &self.game,
            event: &self.event,
            handlers: vec![ScreenHandler {
                device_type: "screened",
                zone: "one",
                mode: "screen",
                datas: vec![ScreenFrame {
                    icon_id: SCREEN_ICON_ID,
                    lines: vec![
                        ScreenLine {
                            has_text: true,
                            context_frame_key: FRAME_KEY_DATE,
                        },
                        ScreenLine {
                            has_text: true,
                            context_frame_key: FRAME_KEY_TIME,
                        },
                    ],
                }],
            }],
        }
    }

    /// `/game_event` body carrying `date` and `time`.
    pub fn event<'a>(&'a self, date: &'a str, time: &'a str) -> GameEvent<'a> {
        GameEvent {
            game: &self.game,
            event: &self.event,
            data: EventData {
                value: time,
                frame: EventFrame { date, time },
            },
        }
    }

    /// `/remove_game` body.
    pub fn remove(&self) -> RemoveGame<'_> {
        RemoveGame { game: &self.game }
    }
}
