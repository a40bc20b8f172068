use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::LeagueError;
use crate::records::{team_records, MatchupLedger};
use crate::season::{normalize_games, Game, Playoff, Team};
use crate::seeding::seed_playoffs;
use crate::standings::{rank_divisions, RankedTeam, UnresolvedTie};

/// The column contract of the regular-season table. Consumers render rows
/// positionally, so order and presence both matter.
pub const TABLE_COLUMNS: [&str; 12] = [
    "division",
    "nickname",
    "win_total",
    "loss_total",
    "tie_total",
    "games_played",
    "win_pct",
    "points_for",
    "points_against",
    "avg_margin",
    "division_rank",
    "playoff_seed",
];

/// Outcome of a season resolution. A tie that survives every criterion is a
/// designed terminal state, not an error: the rows are still produced (with
/// the shared rank or seed left in place) and the caller decides how to
/// surface the manual cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Resolution {
    Resolved(Vec<RankedTeam>),
    RequiresManualInput {
        rows: Vec<RankedTeam>,
        ties: Vec<UnresolvedTie>,
    },
}

impl Resolution {
    pub fn rows(&self) -> &[RankedTeam] {
        match self {
            Resolution::Resolved(rows) => rows,
            Resolution::RequiresManualInput { rows, .. } => rows,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Resolve a season's regular-season standings end to end: normalize, reduce
/// to records and matchups, rank each division, then seed the playoffs.
///
/// Pure and idempotent — identical input yields an identical table. A season
/// with no regular-season games yields an empty resolved table.
pub fn regular_season_table(games: &[Game], teams: &[Team]) -> Result<Resolution, LeagueError> {
    let regular: Vec<Game> = games
        .iter()
        .filter(|g| g.playoff == Playoff::Regular)
        .cloned()
        .collect();
    let normalized = normalize_games(&regular, teams)?;
    if normalized.is_empty() {
        return Ok(Resolution::Resolved(Vec::new()));
    }

    let records = team_records(&normalized, true);
    let ledger = MatchupLedger::from_games(&normalized);

    let (mut rows, mut ties) = rank_divisions(records, &ledger);
    ties.extend(seed_playoffs(&mut rows, &ledger));

    rows.sort_by(|a, b| {
        a.playoff_seed
            .cmp(&b.playoff_seed)
            .then_with(|| a.division.cmp(&b.division))
            .then_with(|| a.nickname.cmp(&b.nickname))
    });

    if ties.is_empty() {
        Ok(Resolution::Resolved(rows))
    } else {
        Ok(Resolution::RequiresManualInput { rows, ties })
    }
}

/// One row of a playoff-bracket table: the record columns plus the seed the
/// team carried into the bracket. Bracket tables have no `division_rank` or
/// `playoff_seed` — those exist only on the regular-season path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketRow {
    pub division: String,
    pub nickname: String,
    pub playoff_rank: u32,
    pub win_total: u32,
    pub loss_total: u32,
    pub tie_total: u32,
    pub games_played: u32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub avg_margin: f64,
}

/// Build the table for one playoff bracket.
///
/// The winners bracket keeps teams that stayed alive longest on top
/// (games played descending, then win percentage); the losers bracket is the
/// mirror image (games played ascending, then win total and points for).
/// For the regular season use [`regular_season_table`] instead.
pub fn bracket_table(
    games: &[Game],
    teams: &[Team],
    bracket: Playoff,
) -> Result<Vec<BracketRow>, LeagueError> {
    let subset: Vec<Game> = games
        .iter()
        .filter(|g| g.playoff == bracket)
        .cloned()
        .collect();
    let normalized = normalize_games(&subset, teams)?;

    let seeds: HashMap<&str, u32> = teams
        .iter()
        .map(|t| (t.nick_name.as_str(), t.playoff_rank))
        .collect();

    let mut rows: Vec<BracketRow> = team_records(&normalized, true)
        .into_iter()
        .map(|r| BracketRow {
            playoff_rank: seeds.get(r.nickname.as_str()).copied().unwrap_or(0),
            division: r.division.unwrap_or_default(),
            nickname: r.nickname,
            win_total: r.win_total,
            loss_total: r.loss_total,
            tie_total: r.tie_total,
            games_played: r.games_played,
            win_pct: r.win_pct,
            points_for: r.points_for,
            points_against: r.points_against,
            avg_margin: r.avg_margin,
        })
        .collect();

    let by_f64_desc = |a: f64, b: f64| b.partial_cmp(&a).unwrap_or(Ordering::Equal);
    match bracket {
        Playoff::Losers => rows.sort_by(|a, b| {
            a.playoff_rank
                .cmp(&b.playoff_rank)
                .then_with(|| a.games_played.cmp(&b.games_played))
                .then_with(|| b.win_total.cmp(&a.win_total))
                .then_with(|| by_f64_desc(a.points_for, b.points_for))
                .then_with(|| a.nickname.cmp(&b.nickname))
        }),
        _ => rows.sort_by(|a, b| {
            a.playoff_rank
                .cmp(&b.playoff_rank)
                .then_with(|| b.games_played.cmp(&a.games_played))
                .then_with(|| by_f64_desc(a.win_pct, b.win_pct))
                .then_with(|| a.nickname.cmp(&b.nickname))
        }),
    }
    Ok(rows)
}

/// Project the season table into the `{"columns": [...], "data": [[...]]}`
/// shape table consumers render. An unresolved `playoff_seed` serializes as
/// null rather than a guessed number.
pub fn to_split_json(rows: &[RankedTeam]) -> Value {
    let data: Vec<Value> = rows
        .iter()
        .map(|r| {
            json!([
                r.division,
                r.nickname,
                r.win_total,
                r.loss_total,
                r.tie_total,
                r.games_played,
                r.win_pct,
                r.points_for,
                r.points_against,
                r.avg_margin,
                r.division_rank,
                r.playoff_seed,
            ])
        })
        .collect();
    json!({ "columns": TABLE_COLUMNS, "data": data })
}
