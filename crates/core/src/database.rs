//! Thread-safe entry point combining game files and player statistics.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    error::Result,
    models::{Game, GameId},
    store::{
        games::{GameRepository, SaveKind},
        players::PlayerIndex,
    },
    suggest,
};

/// Game data access shared by every screen of the app.
///
/// Operations block on file I/O. Cloning is cheap and clones share the same
/// player cache, so one instance can be handed to every thread.
#[derive(Clone)]
pub struct GameDatabase {
    games: GameRepository,
    players_path: PathBuf,
    players: Arc<Mutex<Option<PlayerIndex>>>,
}

impl GameDatabase {
    /// Open the database stored in `root`. Nothing is read until first use.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let games = GameRepository::new(root);
        let players_path = PlayerIndex::path_in(games.root());
        Self {
            games,
            players_path,
            players: Arc::new(Mutex::new(None)),
        }
    }

    /// Directory holding the database files.
    pub fn root(&self) -> &Path {
        self.games.root()
    }

    /// Write `game`, assigning its id and recording player statistics on first save.
    ///
    /// Re-saving a game only rewrites its file.
    pub fn save(&self, game: &mut Game) -> Result<SaveKind> {
        let mut cache = self.players.lock();

        let kind = self.games.save(game)?;
        if kind.is_new() {
            let current = cache.get_or_insert_with(|| PlayerIndex::load(&self.players_path));
            let mut updated = current.clone();
            updated.record_game(game);
            updated.persist(&self.players_path)?;
            *current = updated;
        }
        Ok(kind)
    }

    /// Suggested player names, best first. See [`suggest::suggest`].
    pub fn suggested_player_names(&self) -> Vec<String> {
        let mut cache = self.players.lock();
        let index = cache.get_or_insert_with(|| PlayerIndex::load(&self.players_path));
        let names = suggest::suggest(index);
        debug!("suggesting {} player names", names.len());
        names
    }

    /// Snapshot of the player statistics.
    pub fn players(&self) -> PlayerIndex {
        let mut cache = self.players.lock();
        cache
            .get_or_insert_with(|| PlayerIndex::load(&self.players_path))
            .clone()
    }

    /// All games ordered from newest to oldest.
    pub fn all_games(&self) -> Result<Vec<Game>> {
        self.games.all_games()
    }

    /// The most recently started game, or `None` if nothing has been saved.
    pub fn most_recent_game(&self) -> Result<Option<Game>> {
        self.games.most_recent_game()
    }

    /// Load one game by id.
    pub fn game(&self, id: &GameId) -> Result<Option<Game>> {
        self.games.game(id)
    }

    /// Remove games from storage. Player statistics are not modified.
    pub fn delete_games<'a>(&self, ids: impl IntoIterator<Item = &'a GameId>) -> Result<()> {
        self.games.delete_games(ids)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, thread};

    use super::*;
    use crate::error::DatabaseError;
    use anyhow::Result;
    use tempfile::tempdir;

    fn game(date_started: i64, players: &[(&str, i32)]) -> Game {
        let mut game = Game::started_at(date_started);
        for (name, color) in players {
            game.add_player(*name, *color);
        }
        game
    }

    #[test]
    fn new_games_update_player_statistics() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());
        db.save(&mut game(100, &[("Amy", 1), ("Bob", 2)]))?;
        db.save(&mut game(300, &[("Amy", 3)]))?;
        db.save(&mut game(200, &[("Amy", 5)]))?;
        db.save(&mut game(400, &[("Bob", 7), ("Amy", 9)]))?;

        let players = db.players();
        let amy = players.get("Amy").copied().expect("Amy recorded");
        assert_eq!(amy.total_games, 4);
        assert_eq!(amy.most_recent_game, 400);
        assert_eq!(amy.most_recent_color, 9);
        assert_eq!(players.get("Bob").map(|s| s.total_games), Some(2));

        // A fresh handle reads the same statistics back from disk.
        let reopened = GameDatabase::open(dir.path());
        assert_eq!(reopened.players(), players);
        Ok(())
    }

    #[test]
    fn resave_does_not_touch_statistics() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());
        let mut first = game(100, &[("Amy", 1)]);
        db.save(&mut first)?;
        let before = fs::read(dir.path().join("players.json"))?;

        first.set_player_color(0, 42);
        assert_eq!(db.save(&mut first)?, SaveKind::Overwritten);

        assert_eq!(fs::read(dir.path().join("players.json"))?, before);
        let amy = db.players().get("Amy").copied().expect("Amy recorded");
        assert_eq!(amy.total_games, 1);
        assert_eq!(amy.most_recent_color, 1);
        Ok(())
    }

    #[test]
    fn invalid_game_leaves_store_untouched() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());

        let err = db.save(&mut game(0, &[("Amy", 1)])).unwrap_err();
        assert!(matches!(err, DatabaseError::MissingStartDate));
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        assert!(db.suggested_player_names().is_empty());
        Ok(())
    }

    #[test]
    fn deleting_games_keeps_statistics() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());
        let mut old = game(100, &[("Amy", 1)]);
        let mut new = game(200, &[("Amy", 2)]);
        db.save(&mut old)?;
        db.save(&mut new)?;

        let id = old.id().cloned().expect("saved game has an id");
        db.delete_games([&id])?;

        assert_eq!(db.all_games()?, vec![new.clone()]);
        assert_eq!(db.most_recent_game()?, Some(new));
        assert_eq!(db.game(&id)?, None);
        assert_eq!(db.players().get("Amy").map(|s| s.total_games), Some(2));
        Ok(())
    }

    #[test]
    fn suggestions_follow_saved_games() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());
        assert!(db.suggested_player_names().is_empty());

        db.save(&mut game(1, &[("Old", 1)]))?;
        db.save(&mut game(2, &[("Old", 1)]))?;
        db.save(&mut game(10, &[("A", 1)]))?;
        db.save(&mut game(20, &[("B", 1)]))?;
        db.save(&mut game(30, &[("C", 1)]))?;

        assert_eq!(db.suggested_player_names(), ["C", "B", "A", "Old"]);
        Ok(())
    }

    #[test]
    fn failed_statistics_write_keeps_cached_index() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());
        db.save(&mut game(100, &[("Amy", 1)]))?;
        let before = fs::read(dir.path().join("players.json"))?;

        // A non-empty directory in place of the scratch file blocks the write.
        let scratch = dir.path().join("players.scratch");
        fs::create_dir(&scratch)?;
        fs::write(scratch.join("child"), b"x")?;

        let mut second = game(200, &[("Amy", 2), ("Bob", 3)]);
        assert!(matches!(
            db.save(&mut second).unwrap_err(),
            DatabaseError::Io { .. }
        ));

        let players = db.players();
        let amy = players.get("Amy").copied().expect("Amy recorded");
        assert_eq!(amy.total_games, 1);
        assert_eq!(amy.most_recent_game, 100);
        assert_eq!(amy.most_recent_color, 1);
        assert!(players.get("Bob").is_none());
        assert_eq!(fs::read(dir.path().join("players.json"))?, before);
        Ok(())
    }

    #[test]
    fn corrupt_players_file_reads_as_empty() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("players.json"), b"[[[")?;
        let db = GameDatabase::open(dir.path());
        assert!(db.suggested_player_names().is_empty());

        db.save(&mut game(5, &[("Amy", 1)]))?;
        assert_eq!(db.suggested_player_names(), ["Amy"]);
        Ok(())
    }

    #[test]
    fn concurrent_saves_are_additive() -> Result<()> {
        let dir = tempdir()?;
        let db = GameDatabase::open(dir.path());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let db = db.clone();
                thread::spawn(move || -> crate::error::Result<()> {
                    for round in 0..5 {
                        let started = 1_000 + worker * 100 + round;
                        db.save(&mut game(started, &[("Amy", 1), ("Bob", 2)]))?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked")?;
        }

        let on_disk: PlayerIndex =
            serde_json::from_slice(&fs::read(dir.path().join("players.json"))?)?;
        assert_eq!(on_disk.get("Amy").map(|s| s.total_games), Some(40));
        assert_eq!(on_disk.get("Bob").map(|s| s.total_games), Some(40));
        assert_eq!(db.all_games()?.len(), 40);
        Ok(())
    }
}
