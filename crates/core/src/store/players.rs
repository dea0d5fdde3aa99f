//! Per-player statistics stored alongside the game files.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    atomic,
    error::{DatabaseError, Result},
    models::Game,
};

/// File name of the combined player record.
pub const PLAYERS_FILE: &str = "players.json";

/// Running statistics for one player name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Number of games this name has been recorded in.
    pub total_games: u32,
    /// Start time of the newest game this name played.
    pub most_recent_game: i64,
    /// Color used in that newest game.
    pub most_recent_color: i32,
}

/// Every known player keyed by exact name.
///
/// Entries are only ever added or updated; deleting games leaves the
/// statistics untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIndex {
    players: BTreeMap<String, PlayerStats>,
}

impl PlayerIndex {
    /// Path of the player record inside `root`.
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(PLAYERS_FILE)
    }

    /// Load the index from `path`.
    ///
    /// A missing or unparsable file yields an empty index.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!("no player index at {} ({err}), starting empty", path.display());
                return Self::default();
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(index) => index,
            Err(err) => {
                warn!("ignoring corrupt player index {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Write the entire index to `path` in one atomic replace.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let serialised = serde_json::to_vec(self).map_err(|source| DatabaseError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        atomic::write(path, &serialised)?;
        debug!("persisted {} players to {}", self.len(), path.display());
        Ok(())
    }

    /// Fold a newly created game into the statistics.
    ///
    /// Must only be called once per game, on its first save.
    pub fn record_game(&mut self, game: &Game) {
        for slot in game.players() {
            let stats = self.players.entry(slot.name.clone()).or_default();
            stats.most_recent_color = slot.color;
            stats.most_recent_game = game.date_started();
            stats.total_games += 1;
        }
    }

    /// Statistics for `name`, if it has ever been recorded.
    pub fn get(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when no game has ever been recorded.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterate players in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlayerStats)> {
        self.players
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
    }
}
