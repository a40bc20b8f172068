use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::season::NormalizedGame;

/// Per team-season aggregate. `division` is populated when aggregation groups
/// by division (single-season standings) and absent for cross-season career
/// totals, where the same nickname may have played in several divisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub division: Option<String>,
    pub nickname: String,
    pub win_total: u32,
    pub loss_total: u32,
    pub tie_total: u32,
    pub games_played: u32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub avg_margin: f64,
}

#[derive(Default)]
struct RecordAcc {
    wins: u32,
    losses: u32,
    ties: u32,
    points_for: f64,
    points_against: f64,
}

impl RecordAcc {
    fn add_side(&mut self, won: bool, lost: bool, tied: bool, scored: f64, allowed: f64) {
        if won {
            self.wins += 1;
        } else if lost {
            self.losses += 1;
        } else if tied {
            self.ties += 1;
        }
        self.points_for += scored;
        self.points_against += allowed;
    }
}

/// Reduce normalized games into one record per team.
///
/// Two passes merged by key — the away side, then the home side — so a team
/// that only ever appears on one side still gets a complete record with the
/// missing side zeroed. Teams with no games at all do not appear.
pub fn team_records(games: &[NormalizedGame], group_by_division: bool) -> Vec<TeamRecord> {
    let mut acc: HashMap<(Option<String>, String), RecordAcc> = HashMap::new();

    for g in games {
        let key = (
            group_by_division.then(|| g.a_division.clone()),
            g.a_nick.clone(),
        );
        acc.entry(key)
            .or_default()
            .add_side(g.a_win, g.h_win, g.a_tie, g.a_score_norm, g.h_score_norm);
    }
    for g in games {
        let key = (
            group_by_division.then(|| g.h_division.clone()),
            g.h_nick.clone(),
        );
        acc.entry(key)
            .or_default()
            .add_side(g.h_win, g.a_win, g.h_tie, g.h_score_norm, g.a_score_norm);
    }

    let mut out: Vec<TeamRecord> = acc
        .into_iter()
        .map(|((division, nickname), a)| {
            let games_played = a.wins + a.losses + a.ties;
            TeamRecord {
                division,
                nickname,
                win_total: a.wins,
                loss_total: a.losses,
                tie_total: a.ties,
                games_played,
                win_pct: (a.wins as f64 + 0.5 * a.ties as f64) / games_played as f64,
                points_for: a.points_for,
                points_against: a.points_against,
                avg_margin: (a.points_for - a.points_against) / games_played as f64,
            }
        })
        .collect();

    // win_pct descending; division/nickname keep the order deterministic.
    out.sort_by(|a, b| {
        b.win_pct
            .partial_cmp(&a.win_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.division.cmp(&b.division))
            .then_with(|| a.nickname.cmp(&b.nickname))
    });
    out
}

/// Directed head-to-head total for one ordered pair: wins credited to the
/// subject (ties count 0.5) over every meeting with the opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub win_total: f64,
    pub game_total: u32,
}

impl Matchup {
    pub fn win_pct(&self) -> Option<f64> {
        (self.game_total > 0).then(|| self.win_total / self.game_total as f64)
    }

    fn absorb(&mut self, won: bool, tied: bool) {
        if won {
            self.win_total += 1.0;
        } else if tied {
            self.win_total += 0.5;
        }
        self.game_total += 1;
    }
}

/// Every ordered `(subject, opponent)` pair that has met at least once.
/// This is the substrate every tiebreaker stage queries, restricted to the
/// permutation pairs of whatever group is tied.
#[derive(Debug, Clone, Default)]
pub struct MatchupLedger {
    map: HashMap<(String, String), Matchup>,
}

impl MatchupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_games(games: &[NormalizedGame]) -> Self {
        let mut map: HashMap<(String, String), Matchup> = HashMap::new();
        for g in games {
            map.entry((g.a_nick.clone(), g.h_nick.clone()))
                .or_default()
                .absorb(g.a_win, g.a_tie);
            map.entry((g.h_nick.clone(), g.a_nick.clone()))
                .or_default()
                .absorb(g.h_win, g.h_tie);
        }
        Self { map }
    }

    pub fn get(&self, subject: &str, opponent: &str) -> Option<Matchup> {
        self.map
            .get(&(subject.to_string(), opponent.to_string()))
            .copied()
    }

    pub fn pair_played(&self, a: &str, b: &str) -> bool {
        self.get(a, b).is_some_and(|m| m.game_total > 0)
    }

    /// Sum the subject's head-to-head record against each listed opponent.
    /// Unplayed opponents contribute nothing; a zero `game_total` result
    /// means the subject never met anyone in the list.
    pub fn group_totals(&self, subject: &str, opponents: &[&str]) -> Matchup {
        let mut total = Matchup::default();
        for opponent in opponents {
            if *opponent == subject {
                continue;
            }
            if let Some(m) = self.get(subject, opponent) {
                total.win_total += m.win_total;
                total.game_total += m.game_total;
            }
        }
        total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &Matchup)> {
        self.map.iter()
    }
}
