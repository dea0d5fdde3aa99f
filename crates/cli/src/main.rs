use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rounds_core::{
    config::{self, AppConfig},
    Game, GameDatabase, GameId, PlayerSlot, SaveKind,
};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rounds", about = "Record games and suggest players")]
struct Cli {
    /// Override the configured data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a game started now.
    New {
        /// Player as NAME:COLOR, COLOR being `#rrggbb` or a signed ARGB integer.
        #[arg(short, long = "player", value_parser = parse_player, required = true)]
        players: Vec<PlayerSlot>,
    },
    /// List all games, newest first.
    List,
    /// Show the most recent game.
    Latest,
    /// Print one game as JSON.
    Show { id: GameId },
    /// Delete games by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<GameId>,
    },
    /// Print suggested player names, best first.
    Suggest,
    /// Save a game read from a JSON file.
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;

    let data_dir = cli.data_dir.unwrap_or(config.data_dir);
    let db = GameDatabase::open(data_dir);
    tracing::debug!("using data directory {}", db.root().display());

    match cli.command {
        Command::New { players } => {
            let mut game = Game::new();
            for slot in players {
                game.add_player(slot.name, slot.color);
            }
            save(&db, &mut game)?;
        }
        Command::List => {
            for game in db.all_games()? {
                println!("{}", summary(&game));
            }
        }
        Command::Latest => match db.most_recent_game()? {
            Some(game) => println!("{}", summary(&game)),
            None => println!("no games recorded"),
        },
        Command::Show { id } => match db.game(&id)? {
            Some(game) => println!("{}", serde_json::to_string_pretty(&game)?),
            None => bail!("no game with id {id}"),
        },
        Command::Delete { ids } => {
            db.delete_games(&ids)?;
            println!("deleted {} game(s)", ids.len());
        }
        Command::Suggest => {
            for name in db.suggested_player_names() {
                println!("{name}");
            }
        }
        Command::Import { path } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut game = Game::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            save(&db, &mut game)?;
        }
    }

    Ok(())
}

fn save(db: &GameDatabase, game: &mut Game) -> Result<()> {
    let kind = db.save(game)?;
    let id = game.id().map(GameId::to_string).unwrap_or_default();
    match kind {
        SaveKind::Created => println!("saved new game {id}"),
        SaveKind::Overwritten => println!("updated game {id}"),
    }
    Ok(())
}

fn summary(game: &Game) -> String {
    let id = game.id().map(GameId::as_str).unwrap_or("-");
    let started = game
        .started()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| game.date_started().to_string());
    let names: Vec<&str> = game.players().iter().map(|slot| slot.name.as_str()).collect();
    format!("{id}  {started}  {}", names.join(", "))
}

fn parse_player(value: &str) -> Result<PlayerSlot> {
    let Some((name, color)) = value.rsplit_once(':') else {
        bail!("expected NAME:COLOR, got {value:?}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("player name must not be empty");
    }
    Ok(PlayerSlot::new(name, parse_color(color.trim())?))
}

fn parse_color(value: &str) -> Result<i32> {
    match value.strip_prefix('#') {
        Some(hex) if hex.len() == 6 => {
            let rgb = u32::from_str_radix(hex, 16)
                .with_context(|| format!("invalid color {value:?}"))?;
            Ok((0xFF00_0000 | rgb) as i32)
        }
        Some(_) => bail!("invalid color {value:?}, expected #rrggbb"),
        None => value
            .parse()
            .with_context(|| format!("invalid color {value:?}")),
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = config.log_dir.clone();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("rounds.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
