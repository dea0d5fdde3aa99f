//! Ranking of player names for the "who is playing" prompt.

use std::{cmp::Ordering, collections::HashSet};

use crate::store::players::{PlayerIndex, PlayerStats};

/// Number of distinct most-recent start times whose players lead the suggestions.
pub const RECENT_GAME_THRESHOLD: usize = 3;

type Entry<'a> = (&'a str, &'a PlayerStats);

/// Most recently played first.
pub fn by_recency(a: &Entry<'_>, b: &Entry<'_>) -> Ordering {
    b.1.most_recent_game.cmp(&a.1.most_recent_game)
}

/// Most games played first.
pub fn by_play_count(a: &Entry<'_>, b: &Entry<'_>) -> Ordering {
    b.1.total_games.cmp(&a.1.total_games)
}

/// Suggested player names, best suggestion first, without duplicates.
///
/// Everyone from the [`RECENT_GAME_THRESHOLD`] most recent distinct start
/// times comes first, then every known player by play count.
pub fn suggest(index: &PlayerIndex) -> Vec<String> {
    let mut result = Vec::with_capacity(index.len());
    let mut seen = HashSet::with_capacity(index.len());
    let mut push = |name: &str| {
        if seen.insert(name.to_string()) {
            result.push(name.to_string());
        }
    };

    let mut by_most_recent: Vec<Entry<'_>> = index.iter().collect();
    by_most_recent.sort_by(by_recency);

    let mut last_date = None;
    let mut buckets = 0;
    for (name, stats) in &by_most_recent {
        if last_date != Some(stats.most_recent_game) {
            last_date = Some(stats.most_recent_game);
            buckets += 1;
        }
        if buckets > RECENT_GAME_THRESHOLD {
            break;
        }
        push(name);
    }

    let mut by_count = by_most_recent;
    by_count.sort_by(by_play_count);
    for (name, _) in &by_count {
        push(name);
    }

    result
}
