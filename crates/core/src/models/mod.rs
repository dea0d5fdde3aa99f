//! Shared domain models.

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, Result};

static GAME_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{16}$").expect("invalid game id regex"));

/// Stable identifier of a persisted game.
///
/// Always the start timestamp rendered as 16 zero-padded lowercase hex digits,
/// so sorting ids as strings sorts games by start time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GameId(String);

impl GameId {
    /// Derive the id for a game started at `date_started` (epoch millis).
    pub fn from_date_started(date_started: i64) -> Self {
        Self(format!("{date_started:016x}"))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameId {
    type Err = DatabaseError;

    fn from_str(value: &str) -> Result<Self> {
        Self::try_from(value.to_string())
    }
}

impl TryFrom<String> for GameId {
    type Error = DatabaseError;

    fn try_from(value: String) -> Result<Self> {
        if GAME_ID.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(DatabaseError::InvalidId(value))
        }
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    /// Name as typed by the user. Trimming happens before it reaches the store.
    pub name: String,
    /// Packed ARGB color chosen for this player.
    pub color: i32,
}

impl PlayerSlot {
    /// Build a slot from a name and color.
    pub fn new(name: impl Into<String>, color: i32) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// A recorded play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<GameId>,
    date_started: i64,
    #[serde(default)]
    players: Vec<PlayerSlot>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Start a new game stamped with the current time.
    pub fn new() -> Self {
        Self::started_at(Utc::now().timestamp_millis())
    }

    /// Start a new game with an explicit start time in epoch milliseconds.
    pub fn started_at(date_started: i64) -> Self {
        Self {
            id: None,
            date_started,
            players: Vec::new(),
        }
    }

    /// Id assigned by the store, `None` until the first successful save.
    pub fn id(&self) -> Option<&GameId> {
        self.id.as_ref()
    }

    pub(crate) fn set_id(&mut self, id: Option<GameId>) {
        self.id = id;
    }

    /// Start time in epoch milliseconds.
    pub fn date_started(&self) -> i64 {
        self.date_started
    }

    /// Start time as a UTC timestamp, if it is representable.
    pub fn started(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.date_started).single()
    }

    /// Players in seating order.
    pub fn players(&self) -> &[PlayerSlot] {
        &self.players
    }

    /// Number of seated players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Name of the player at `index`. Panics if out of range.
    pub fn player_name(&self, index: usize) -> &str {
        &self.players[index].name
    }

    /// Color of the player at `index`. Panics if out of range.
    pub fn player_color(&self, index: usize) -> i32 {
        self.players[index].color
    }

    /// Append a player to the end of the seating order.
    pub fn add_player(&mut self, name: impl Into<String>, color: i32) {
        self.players.push(PlayerSlot::new(name, color));
    }

    /// Remove and return the player at `index`, shifting later seats down.
    /// Panics if out of range.
    pub fn remove_player(&mut self, index: usize) -> PlayerSlot {
        self.players.remove(index)
    }

    /// Rename the player at `index`. Panics if out of range.
    pub fn set_player_name(&mut self, index: usize, name: impl Into<String>) {
        self.players[index].name = name.into();
    }

    /// Recolor the player at `index`. Panics if out of range.
    pub fn set_player_color(&mut self, index: usize, color: i32) {
        self.players[index].color = color;
    }

    /// Encode the game as JSON for hand-off between screens.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a game previously produced by [`Game::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
