use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::season::Playoff;
use crate::table::Resolution;

const CACHE_DIR: &str = "mildred_league";
const CACHE_FILE: &str = "tables.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    tables: HashMap<String, Resolution>,
}

fn table_key(season: u16, playoff: Playoff) -> String {
    format!("{season}/{}", u8::from(playoff))
}

/// Load a previously stored table, if one exists. Any read, parse, or
/// version mismatch just means "no cache" — the engine recomputes cheaply.
pub fn load_table(season: u16, playoff: Playoff) -> Option<Resolution> {
    load_table_from(&cache_path()?, season, playoff)
}

pub fn load_table_from(path: &Path, season: u16, playoff: Playoff) -> Option<Resolution> {
    let raw = fs::read_to_string(path).ok()?;
    let cache = serde_json::from_str::<CacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    cache.tables.get(&table_key(season, playoff)).cloned()
}

/// Store a computed table for later reads. Callers are responsible for
/// re-storing after any game or team write; the engine never reads this
/// cache on its own.
pub fn store_table(season: u16, playoff: Playoff, resolution: &Resolution) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    store_table_at(&path, season, playoff, resolution)
}

pub fn store_table_at(
    path: &Path,
    season: u16,
    playoff: Playoff,
    resolution: &Resolution,
) -> Result<()> {
    let mut cache = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<CacheFile>(&raw).ok())
        .filter(|c| c.version == CACHE_VERSION)
        .unwrap_or_default();
    cache.version = CACHE_VERSION;
    cache
        .tables
        .insert(table_key(season, playoff), resolution.clone());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create table cache dir")?;
    }
    let json = serde_json::to_string(&cache).context("serialize table cache")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write table cache")?;
    fs::rename(&tmp, path).context("swap table cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::RankedTeam;

    fn sample_resolution() -> Resolution {
        Resolution::Resolved(vec![RankedTeam {
            division: "East".to_string(),
            nickname: "A".to_string(),
            win_total: 10,
            loss_total: 3,
            tie_total: 0,
            games_played: 13,
            win_pct: 10.0 / 13.0,
            points_for: 1400.0,
            points_against: 1200.0,
            avg_margin: 200.0 / 13.0,
            division_rank: 1,
            playoff_seed: Some(1),
        }])
    }

    #[test]
    fn stored_tables_round_trip_per_season_and_bracket() {
        let dir = std::env::temp_dir().join("mildred_league_snapshot_test");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join(CACHE_FILE);

        let resolution = sample_resolution();
        store_table_at(&path, 2020, Playoff::Regular, &resolution).unwrap();

        let loaded = load_table_from(&path, 2020, Playoff::Regular).unwrap();
        assert!(loaded.is_resolved());
        assert_eq!(loaded.rows()[0].nickname, "A");
        assert_eq!(loaded.rows()[0].playoff_seed, Some(1));

        // a different key is a miss, not an error
        assert!(load_table_from(&path, 2020, Playoff::Winners).is_none());
        assert!(load_table_from(&path, 2019, Playoff::Regular).is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
