//! One file per game, named after the game id.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    atomic,
    error::{DatabaseError, Result},
    models::{Game, GameId},
};

/// Extension of committed game files.
pub const GAME_EXTENSION: &str = "game";

/// Whether a save created a game file or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// First save; the game was assigned its id.
    Created,
    /// The game already had an id and its file was overwritten.
    Overwritten,
}

impl SaveKind {
    /// True for a first-time save.
    pub fn is_new(self) -> bool {
        matches!(self, SaveKind::Created)
    }
}

/// Reads and writes game files inside a single directory.
#[derive(Debug, Clone)]
pub struct GameRepository {
    root: PathBuf,
}

impl GameRepository {
    /// Create a repository rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the game files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the committed file for `id`.
    pub fn game_path(&self, id: &GameId) -> PathBuf {
        self.root.join(format!("{id}.{GAME_EXTENSION}"))
    }

    /// Write `game` to disk, assigning its id on first save.
    ///
    /// The id is only left on `game` once the file has been committed, so a
    /// failed first save can be retried as a new game.
    pub fn save(&self, game: &mut Game) -> Result<SaveKind> {
        let (id, kind) = match game.id() {
            Some(id) => {
                if *id != GameId::from_date_started(game.date_started()) {
                    return Err(DatabaseError::IdMismatch {
                        id: id.to_string(),
                        date_started: game.date_started(),
                    });
                }
                (id.clone(), SaveKind::Overwritten)
            }
            None => {
                if game.date_started() == 0 {
                    return Err(DatabaseError::MissingStartDate);
                }
                let id = GameId::from_date_started(game.date_started());
                game.set_id(Some(id.clone()));
                (id, SaveKind::Created)
            }
        };

        if let Err(err) = self.write_game(&id, game) {
            if kind.is_new() {
                game.set_id(None);
            }
            return Err(err);
        }

        if kind.is_new() {
            info!("recorded new game {id} with {} players", game.player_count());
        } else {
            debug!("updated game {id}");
        }
        Ok(kind)
    }

    /// Return all games, newest first.
    pub fn all_games(&self) -> Result<Vec<Game>> {
        self.game_files_by_most_recent()?
            .iter()
            .map(|path| read_game(path))
            .collect()
    }

    /// Return the newest game without decoding any other file.
    pub fn most_recent_game(&self) -> Result<Option<Game>> {
        match self.game_files_by_most_recent()?.first() {
            Some(path) => read_game(path).map(Some),
            None => Ok(None),
        }
    }

    /// Load a single game, `None` if no file exists for `id`.
    pub fn game(&self, id: &GameId) -> Result<Option<Game>> {
        let path = self.game_path(id);
        match fs::read(&path) {
            Ok(bytes) => decode_game(&path, &bytes).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DatabaseError::io("read", path, err)),
        }
    }

    /// Remove the files for `ids`. Every id must refer to a saved game.
    pub fn delete_games<'a>(&self, ids: impl IntoIterator<Item = &'a GameId>) -> Result<()> {
        for id in ids {
            let path = self.game_path(id);
            fs::remove_file(&path).map_err(|err| DatabaseError::io("delete", &path, err))?;
            info!("deleted game {id}");
        }
        Ok(())
    }

    fn write_game(&self, id: &GameId, game: &Game) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|err| DatabaseError::io("create", &self.root, err))?;
        let path = self.game_path(id);
        let serialised = serde_json::to_vec(game).map_err(|source| DatabaseError::Encode {
            path: path.clone(),
            source,
        })?;
        atomic::write(&path, &serialised)
    }

    fn game_files_by_most_recent(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let entries =
            fs::read_dir(&self.root).map_err(|err| DatabaseError::io("list", &self.root, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| DatabaseError::io("list", &self.root, err))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(GAME_EXTENSION) {
                continue;
            }
            let is_file = entry
                .file_type()
                .map_err(|err| DatabaseError::io("stat", &path, err))?
                .is_file();
            if is_file {
                files.push(path);
            }
        }

        files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(files)
    }
}

fn read_game(path: &Path) -> Result<Game> {
    let bytes = fs::read(path).map_err(|err| DatabaseError::io("read", path, err))?;
    decode_game(path, &bytes)
}

fn decode_game(path: &Path, bytes: &[u8]) -> Result<Game> {
    serde_json::from_slice(bytes).map_err(|source| DatabaseError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
