#![warn(clippy::all, missing_docs)]

//! Local game store for the Rounds score keeper.
//!
//! This crate records finished game sessions as individual files, keeps
//! per-player statistics next to them, and ranks player names for the
//! set-up screen. Front ends construct [`Game`] values and hand them to a
//! shared [`GameDatabase`].

pub mod atomic;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod store;
pub mod suggest;

pub use config::AppConfig;
pub use database::GameDatabase;
pub use error::{DatabaseError, Result};
pub use models::{Game, GameId, PlayerSlot};
pub use store::{GameRepository, PlayerIndex, PlayerStats, SaveKind};
