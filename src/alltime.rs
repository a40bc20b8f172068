use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LeagueError;
use crate::records::{team_records, MatchupLedger, TeamRecord};
use crate::season::{normalize_games, Game, Playoff, Team};

/// Rank slot charged to a team for a season it sat out. One worse than the
/// worst rank a participating team has ever carried.
const ABSENT_RANK: u32 = 15;

/// Career totals across every season of one slice of the schedule, keyed by
/// nickname alone since teams drift between divisions over the years.
/// Sorted by win total ascending, the order the all-time win chart wants.
pub fn career_records(
    games: &[Game],
    teams: &[Team],
    playoff: Playoff,
) -> Result<Vec<TeamRecord>, LeagueError> {
    let subset: Vec<Game> = games
        .iter()
        .filter(|g| g.playoff == playoff)
        .cloned()
        .collect();
    let normalized = normalize_games(&subset, teams)?;
    let mut records = team_records(&normalized, false);
    records.sort_by(|a, b| {
        a.win_total
            .cmp(&b.win_total)
            .then_with(|| a.nickname.cmp(&b.nickname))
    });
    Ok(records)
}

/// The all-time head-to-head matrix over currently active teams: win
/// percentage drives the view, game counts ride along for hover detail.
/// `None` marks a pair that has never met (and the diagonal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupGrid {
    pub subjects: Vec<String>,
    pub opponents: Vec<String>,
    pub win_pct: Vec<Vec<Option<f64>>>,
    pub game_totals: Vec<Vec<u32>>,
}

pub fn alltime_matchup_grid(games: &[Game], teams: &[Team]) -> Result<MatchupGrid, LeagueError> {
    let normalized = normalize_games(games, teams)?;
    let ledger = MatchupLedger::from_games(&normalized);

    let active: BTreeSet<&str> = teams
        .iter()
        .filter(|t| t.active)
        .map(|t| t.nick_name.as_str())
        .collect();

    let opponents: Vec<String> = active.iter().map(|n| n.to_string()).collect();
    // subjects run bottom-up so the matrix diagonal reads top-left to
    // bottom-right when rendered
    let subjects: Vec<String> = opponents.iter().rev().cloned().collect();

    let mut win_pct = Vec::with_capacity(subjects.len());
    let mut game_totals = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        let mut pct_row = Vec::with_capacity(opponents.len());
        let mut games_row = Vec::with_capacity(opponents.len());
        for opponent in &opponents {
            let matchup = (subject != opponent)
                .then(|| ledger.get(subject, opponent))
                .flatten();
            pct_row.push(matchup.and_then(|m| m.win_pct()));
            games_row.push(matchup.map(|m| m.game_total).unwrap_or(0));
        }
        win_pct.push(pct_row);
        game_totals.push(games_row);
    }

    Ok(MatchupGrid {
        subjects,
        opponents,
        win_pct,
        game_totals,
    })
}

/// The nickname-by-season grid of final playoff ranks behind the all-time
/// ranking heatmap. Teams are ordered least relevant first: a missed season
/// counts as rank 15, and larger summed ranks sort earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualRankingGrid {
    pub seasons: Vec<u16>,
    pub nicknames: Vec<String>,
    pub ranks: Vec<Vec<Option<u32>>>,
}

pub fn annual_ranking_grid(teams: &[Team]) -> AnnualRankingGrid {
    let seasons: Vec<u16> = teams
        .iter()
        .map(|t| t.season)
        .collect::<BTreeSet<u16>>()
        .into_iter()
        .collect();

    let mut by_nick: BTreeMap<&str, BTreeMap<u16, u32>> = BTreeMap::new();
    for t in teams {
        by_nick
            .entry(t.nick_name.as_str())
            .or_default()
            .insert(t.season, t.playoff_rank);
    }

    let mut ordered: Vec<(&str, u32)> = by_nick
        .iter()
        .map(|(nick, ranks)| {
            let relevance: u32 = seasons
                .iter()
                .map(|s| ranks.get(s).copied().unwrap_or(ABSENT_RANK))
                .sum();
            (*nick, relevance)
        })
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let nicknames: Vec<String> = ordered.iter().map(|(n, _)| n.to_string()).collect();
    let ranks: Vec<Vec<Option<u32>>> = ordered
        .iter()
        .map(|(nick, _)| {
            seasons
                .iter()
                .map(|s| by_nick[nick].get(s).copied())
                .collect()
        })
        .collect();

    AnnualRankingGrid {
        seasons,
        nicknames,
        ranks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(nick: &str, season: u16, playoff_rank: u32, active: bool) -> Team {
        Team {
            division: "East".to_string(),
            full_name: format!("{nick} FC"),
            nick_name: nick.to_string(),
            season,
            playoff_rank,
            active,
        }
    }

    fn game(a: &str, h: &str, a_score: f64, h_score: f64, season: u16) -> Game {
        Game {
            away: format!("{a} FC"),
            a_nick: a.to_string(),
            a_score,
            home: format!("{h} FC"),
            h_nick: h.to_string(),
            h_score,
            week_s: 1,
            week_e: 1,
            season,
            playoff: Playoff::Regular,
        }
    }

    #[test]
    fn career_records_merge_across_seasons_and_divisions() {
        let teams = vec![
            team("A", 2019, 1, true),
            team("B", 2019, 2, true),
            team("A", 2020, 1, true),
            team("B", 2020, 2, true),
        ];
        let games = vec![
            game("A", "B", 100.0, 90.0, 2019),
            game("A", "B", 100.0, 90.0, 2020),
        ];
        let records = career_records(&games, &teams, Playoff::Regular).unwrap();
        assert_eq!(records.len(), 2);
        // ascending by win total: B (0) before A (2)
        assert_eq!(records[0].nickname, "B");
        assert_eq!(records[1].nickname, "A");
        assert_eq!(records[1].win_total, 2);
        assert!(records[1].division.is_none());
    }

    #[test]
    fn matchup_grid_keeps_only_active_teams() {
        let teams = vec![
            team("A", 2020, 1, true),
            team("B", 2020, 2, true),
            team("C", 2020, 3, false),
        ];
        let games = vec![
            game("A", "B", 100.0, 90.0, 2020),
            game("A", "C", 100.0, 90.0, 2020),
        ];
        let grid = alltime_matchup_grid(&games, &teams).unwrap();
        assert_eq!(grid.opponents, ["A", "B"]);
        assert_eq!(grid.subjects, ["B", "A"]);
        // B row: lost the only meeting with A; never plays itself
        assert_eq!(grid.win_pct[0], vec![Some(0.0), None]);
        assert_eq!(grid.game_totals[0], vec![1, 0]);
    }

    #[test]
    fn ranking_grid_charges_absent_seasons_as_least_relevant() {
        let teams = vec![
            team("A", 2019, 1, true),
            team("A", 2020, 2, true),
            team("B", 2020, 1, true),
        ];
        let grid = annual_ranking_grid(&teams);
        assert_eq!(grid.seasons, [2019, 2020]);
        // B missed 2019 (15 + 1) and outweighs A (1 + 2)
        assert_eq!(grid.nicknames, ["B", "A"]);
        assert_eq!(grid.ranks[0], vec![None, Some(1)]);
        assert_eq!(grid.ranks[1], vec![Some(1), Some(2)]);
    }
}
