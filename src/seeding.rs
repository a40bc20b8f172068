use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use crate::records::MatchupLedger;
use crate::standings::{RankedTeam, TieContext, TiebreakStage, UnresolvedTie};

/// Criteria per cascade pass; the guard allows `group_len * STAGE_EVALS`
/// stage evaluations, which bounds the partial-resolution recursion even if
/// a future stage forgets to shrink the group.
const STAGE_EVALS: u32 = 5;

struct TieGuard {
    evals: u32,
    limit: u32,
}

impl TieGuard {
    fn new(group_len: usize) -> Self {
        Self {
            evals: 0,
            limit: group_len as u32 * STAGE_EVALS,
        }
    }

    fn exhausted(&mut self) -> bool {
        self.evals += 1;
        self.evals > self.limit
    }
}

/// Order the global playoff seed list: division winners first by win
/// percentage, everyone else after them, then break every contested seed
/// through the wildcard cascade. Mutates `playoff_seed` in place and returns
/// the ties that could not be resolved.
pub fn seed_playoffs(rows: &mut [RankedTeam], ledger: &MatchupLedger) -> Vec<UnresolvedTie> {
    let mut unresolved = Vec::new();

    let winners: Vec<usize> = (0..rows.len())
        .filter(|&i| rows[i].division_rank == 1)
        .collect();
    let losers: Vec<usize> = (0..rows.len())
        .filter(|&i| rows[i].division_rank != 1)
        .collect();

    for &i in &winners {
        let seed = 1 + winners
            .iter()
            .filter(|&&j| rows[j].win_pct > rows[i].win_pct)
            .count() as u32;
        rows[i].playoff_seed = Some(seed);
    }
    let winner_count = winners.len() as u32;
    for &i in &losers {
        let seed = winner_count
            + 1
            + losers
                .iter()
                .filter(|&&j| rows[j].win_pct > rows[i].win_pct)
                .count() as u32;
        rows[i].playoff_seed = Some(seed);
    }

    // winners can only contend with winners for the top seeds, so the two
    // pools resolve independently
    resolve_pool(rows, &winners, ledger, &mut unresolved);
    resolve_pool(rows, &losers, ledger, &mut unresolved);
    unresolved
}

/// Walk the pool's seed values lowest first: resolving a seed can bump teams
/// into the next one, so later groups are only final once we reach them.
fn resolve_pool(
    rows: &mut [RankedTeam],
    pool: &[usize],
    ledger: &MatchupLedger,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let Some(lo) = pool.iter().filter_map(|&i| rows[i].playoff_seed).min() else {
        return;
    };
    let hi = lo + pool.len() as u32;
    for seed in lo..=hi {
        let group: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&i| rows[i].playoff_seed == Some(seed))
            .collect();
        if group.len() > 1 {
            debug!(
                "playoff seed {seed} contested by {:?}",
                group_nicknames(rows, &group)
            );
            let mut guard = TieGuard::new(group.len());
            break_seed_tie(rows, group, ledger, &mut guard, unresolved);
        }
    }
}

/// The wildcard cascade for one contested seed. Re-entered from the top
/// whenever a stage resolves some — but not all — of the tie, so the
/// qualification filter and the head-to-head sweep check always see the
/// current subset.
fn break_seed_tie(
    rows: &mut [RankedTeam],
    group: Vec<usize>,
    ledger: &MatchupLedger,
    guard: &mut TieGuard,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let Some(seed) = group.iter().filter_map(|&i| rows[i].playoff_seed).min() else {
        return;
    };

    // Single-division short-circuit: division rank already encodes every
    // head-to-head consideration inside one division, so the seed order is
    // the division order and the matchup ledger is never consulted.
    let division_set: BTreeSet<&str> = group.iter().map(|&i| rows[i].division.as_str()).collect();
    if division_set.len() == 1 {
        for pos in 0..group.len() {
            let i = group[pos];
            let offset = group
                .iter()
                .filter(|&&j| rows[j].division_rank < rows[i].division_rank)
                .count() as u32;
            rows[i].playoff_seed = Some(seed + offset);
        }
        // division ranks left shared by a manual-resolution case stay shared
        // here too; report only the subgroup stuck at this seed, the outer
        // walk reaches the rest
        let stuck: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&i| rows[i].playoff_seed == Some(seed))
            .collect();
        if stuck.len() > 1 {
            report_manual(rows, &stuck, seed, TiebreakStage::DivisionOrder, unresolved);
        }
        return;
    }

    // Qualification: only each division's best remaining representative may
    // compete for this seed; the rest wait for the next one.
    let mut best_rank: HashMap<&str, u32> = HashMap::new();
    for &i in &group {
        let entry = best_rank
            .entry(rows[i].division.as_str())
            .or_insert(rows[i].division_rank);
        *entry = (*entry).min(rows[i].division_rank);
    }
    let (qualified, disqualified): (Vec<usize>, Vec<usize>) = group
        .iter()
        .copied()
        .partition(|&i| best_rank[rows[i].division.as_str()] == rows[i].division_rank);
    for &i in &disqualified {
        rows[i].playoff_seed = Some(seed + 1);
    }
    if qualified.len() == 1 {
        return;
    }

    stage_head_to_head(rows, qualified, seed, ledger, guard, unresolved);
}

fn stage_head_to_head(
    rows: &mut [RankedTeam],
    group: Vec<usize>,
    seed: u32,
    ledger: &MatchupLedger,
    guard: &mut TieGuard,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    if guard.exhausted() {
        report_manual(rows, &group, seed, TiebreakStage::HeadToHead, unresolved);
        return;
    }

    let nicks = group_nicknames(rows, &group);
    let refs: Vec<&str> = nicks.iter().map(String::as_str).collect();

    // Full round-robin sweep check: head-to-head only counts when every
    // pair in the group has actually met; otherwise the whole stage is
    // neutralized to 0.5 and decides nothing.
    let full_round_robin = refs
        .iter()
        .enumerate()
        .all(|(x, a)| refs[x + 1..].iter().all(|b| ledger.pair_played(a, b)));
    let scores: Vec<f64> = if full_round_robin {
        nicks
            .iter()
            .map(|nick| ledger.group_totals(nick, &refs).win_pct().unwrap_or(0.5))
            .collect()
    } else {
        vec![0.5; group.len()]
    };

    let still = run_stage(rows, &group, seed, &scores);
    if still.len() == group.len() {
        stage_points_for(rows, group, seed, ledger, guard, unresolved);
    } else if still.len() > 1 {
        break_seed_tie(rows, still, ledger, guard, unresolved);
    }
}

fn stage_points_for(
    rows: &mut [RankedTeam],
    group: Vec<usize>,
    seed: u32,
    ledger: &MatchupLedger,
    guard: &mut TieGuard,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    if guard.exhausted() {
        report_manual(rows, &group, seed, TiebreakStage::PointsFor, unresolved);
        return;
    }

    let scores: Vec<f64> = group.iter().map(|&i| rows[i].points_for).collect();
    let still = run_stage(rows, &group, seed, &scores);
    if still.len() == group.len() {
        stage_points_against(rows, group, seed, ledger, guard, unresolved);
    } else if still.len() > 1 {
        break_seed_tie(rows, still, ledger, guard, unresolved);
    }
}

fn stage_points_against(
    rows: &mut [RankedTeam],
    group: Vec<usize>,
    seed: u32,
    ledger: &MatchupLedger,
    guard: &mut TieGuard,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    if guard.exhausted() {
        report_manual(rows, &group, seed, TiebreakStage::PointsAgainst, unresolved);
        return;
    }

    let scores: Vec<f64> = group.iter().map(|&i| rows[i].points_against).collect();
    let still = run_stage(rows, &group, seed, &scores);
    if still.len() == group.len() {
        report_manual(rows, &group, seed, TiebreakStage::PointsAgainst, unresolved);
    } else if still.len() > 1 {
        break_seed_tie(rows, still, ledger, guard, unresolved);
    }
}

/// Apply one criterion: the group's best keep the contested seed, everyone
/// else is bumped to the next seed and re-enters that seed's resolution.
/// Returns whoever still holds the contested seed.
fn run_stage(rows: &mut [RankedTeam], group: &[usize], seed: u32, scores: &[f64]) -> Vec<usize> {
    for (pos, &i) in group.iter().enumerate() {
        let offset = scores.iter().filter(|s| **s > scores[pos]).count() as u32;
        rows[i].playoff_seed = Some(if offset == 0 { seed } else { seed + 1 });
    }
    group
        .iter()
        .copied()
        .filter(|&i| rows[i].playoff_seed == Some(seed))
        .collect()
}

fn group_nicknames(rows: &[RankedTeam], group: &[usize]) -> Vec<String> {
    group.iter().map(|&i| rows[i].nickname.clone()).collect()
}

fn report_manual(
    rows: &[RankedTeam],
    group: &[usize],
    seed: u32,
    stage: TiebreakStage,
    unresolved: &mut Vec<UnresolvedTie>,
) {
    let teams = group_nicknames(rows, group);
    warn!(
        "playoff seed {seed}: {teams:?} remain tied at {stage:?}; \
         you're gonna need a coin for this one"
    );
    unresolved.push(UnresolvedTie {
        teams,
        stage,
        context: TieContext::PlayoffSeed { seed },
    });
}
