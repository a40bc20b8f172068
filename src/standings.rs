use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::records::{MatchupLedger, TeamRecord};

/// One row of the season table. Field order is the column contract any table
/// consumer relies on; `playoff_seed` exists only on the regular-season path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTeam {
    pub division: String,
    pub nickname: String,
    pub win_total: u32,
    pub loss_total: u32,
    pub tie_total: u32,
    pub games_played: u32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub avg_margin: f64,
    pub division_rank: u32,
    pub playoff_seed: Option<u32>,
}

impl RankedTeam {
    fn from_record(record: TeamRecord) -> Self {
        Self {
            division: record.division.unwrap_or_default(),
            nickname: record.nickname,
            win_total: record.win_total,
            loss_total: record.loss_total,
            tie_total: record.tie_total,
            games_played: record.games_played,
            win_pct: record.win_pct,
            points_for: record.points_for,
            points_against: record.points_against,
            avg_margin: record.avg_margin,
            division_rank: 1,
            playoff_seed: None,
        }
    }
}

/// The criterion at which a tiebreak stopped or got stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiebreakStage {
    HeadToHead,
    DivisionRecord,
    PointsFor,
    PointsAgainst,
    DivisionOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieContext {
    DivisionRank { division: String, rank: u32 },
    PlayoffSeed { seed: u32 },
}

/// A tie that survived every criterion. Historically settled with a literal
/// coin flip; the engine reports it and leaves the shared rank in place
/// rather than guessing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedTie {
    pub teams: Vec<String>,
    pub stage: TiebreakStage,
    pub context: TieContext,
}

/// Competition-ranked 0-based offsets for one tied group, higher score first.
/// Offsets are additive on top of the shared rank; teams already separated
/// by an earlier stage are never reconsidered.
fn apply_stage_offsets(
    rows: &mut [RankedTeam],
    group: &[usize],
    scores: &[f64],
) -> Vec<Vec<usize>> {
    for (pos, &i) in group.iter().enumerate() {
        let offset = scores.iter().filter(|s| **s > scores[pos]).count() as u32;
        rows[i].division_rank += offset;
    }
    let mut by_rank: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for &i in group {
        by_rank.entry(rows[i].division_rank).or_default().push(i);
    }
    by_rank.into_values().filter(|g| g.len() > 1).collect()
}

fn group_nicknames(rows: &[RankedTeam], group: &[usize]) -> Vec<String> {
    group.iter().map(|&i| rows[i].nickname.clone()).collect()
}

/// Rank every division by win percentage and break collisions through the
/// 4-stage cascade: head-to-head, division record, points for, points
/// against. Returns the rows plus any ties that exhausted the cascade.
pub fn rank_divisions(
    records: Vec<TeamRecord>,
    ledger: &MatchupLedger,
) -> (Vec<RankedTeam>, Vec<UnresolvedTie>) {
    let mut rows: Vec<RankedTeam> = records.into_iter().map(RankedTeam::from_record).collect();
    let mut unresolved = Vec::new();

    let mut divisions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        divisions.entry(row.division.clone()).or_default().push(i);
    }

    for (division, members) in &divisions {
        // initial competition ranking: 1,1,3,...
        for &i in members {
            let rank = 1 + members
                .iter()
                .filter(|&&j| rows[j].win_pct > rows[i].win_pct)
                .count() as u32;
            rows[i].division_rank = rank;
        }

        // division record: each member's head-to-head total against the
        // whole division, not just whatever group ends up tied
        let member_nicks = group_nicknames(&rows, members);
        let member_refs: Vec<&str> = member_nicks.iter().map(String::as_str).collect();
        let division_pct: HashMap<String, f64> = member_nicks
            .iter()
            .map(|nick| {
                let pct = ledger
                    .group_totals(nick, &member_refs)
                    .win_pct()
                    .unwrap_or(0.5);
                (nick.clone(), pct)
            })
            .collect();

        let mut by_rank: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for &i in members {
            by_rank.entry(rows[i].division_rank).or_default().push(i);
        }
        for (rank, group) in by_rank {
            if group.len() > 1 {
                debug!(
                    "division {division}: rank {rank} contested by {:?}",
                    group_nicknames(&rows, &group)
                );
                tb_head_to_head(&mut rows, &group, ledger, &division_pct, division, &mut unresolved);
            }
        }
    }

    (rows, unresolved)
}

fn tb_head_to_head(
    rows: &mut [RankedTeam],
    group: &[usize],
    ledger: &MatchupLedger,
    division_pct: &HashMap<String, f64>,
    division: &str,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let nicks = group_nicknames(rows, group);
    let refs: Vec<&str> = nicks.iter().map(String::as_str).collect();
    let scores: Vec<f64> = nicks
        .iter()
        .map(|nick| ledger.group_totals(nick, &refs).win_pct().unwrap_or(0.5))
        .collect();

    for sub in apply_stage_offsets(rows, group, &scores) {
        tb_division_record(rows, &sub, division_pct, division, unresolved);
    }
}

fn tb_division_record(
    rows: &mut [RankedTeam],
    group: &[usize],
    division_pct: &HashMap<String, f64>,
    division: &str,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let scores: Vec<f64> = group
        .iter()
        .map(|&i| {
            division_pct
                .get(&rows[i].nickname)
                .copied()
                .unwrap_or(0.5)
        })
        .collect();

    for sub in apply_stage_offsets(rows, group, &scores) {
        tb_points_for(rows, &sub, division, unresolved);
    }
}

fn tb_points_for(
    rows: &mut [RankedTeam],
    group: &[usize],
    division: &str,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let scores: Vec<f64> = group.iter().map(|&i| rows[i].points_for).collect();
    for sub in apply_stage_offsets(rows, group, &scores) {
        tb_points_against(rows, &sub, division, unresolved);
    }
}

fn tb_points_against(
    rows: &mut [RankedTeam],
    group: &[usize],
    division: &str,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let scores: Vec<f64> = group.iter().map(|&i| rows[i].points_against).collect();
    for sub in apply_stage_offsets(rows, group, &scores) {
        let teams = group_nicknames(rows, &sub);
        warn!(
            "division {division}: {teams:?} are tied after every criterion; \
             you're gonna need a coin for this one"
        );
        unresolved.push(UnresolvedTie {
            teams,
            stage: TiebreakStage::PointsAgainst,
            context: TieContext::DivisionRank {
                division: division.to_string(),
                rank: rows[sub[0]].division_rank,
            },
        });
    }
}
