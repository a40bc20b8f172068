use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LeagueError;

/// Which slice of the season a game belongs to. Stored as 0/1/2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Playoff {
    Regular,
    Winners,
    Losers,
}

impl TryFrom<u8> for Playoff {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Playoff::Regular),
            1 => Ok(Playoff::Winners),
            2 => Ok(Playoff::Losers),
            other => Err(format!("unknown playoff flag {other}")),
        }
    }
}

impl From<Playoff> for u8 {
    fn from(value: Playoff) -> Self {
        match value {
            Playoff::Regular => 0,
            Playoff::Winners => 1,
            Playoff::Losers => 2,
        }
    }
}

/// One matchup as entered by league administration. Immutable: edits replace
/// the whole record. `week_s`/`week_e` span multi-week playoff games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub away: String,
    pub a_nick: String,
    pub a_score: f64,
    pub home: String,
    pub h_nick: String,
    pub h_score: f64,
    pub week_s: u32,
    pub week_e: u32,
    pub season: u16,
    pub playoff: Playoff,
}

/// A team's participation in one season. `playoff_rank` is the externally
/// assigned seed from the previous resolved season; it orders historical
/// views and bracket tables, never the current season's own resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub division: String,
    pub full_name: String,
    pub nick_name: String,
    pub season: u16,
    pub playoff_rank: u32,
    pub active: bool,
}

/// A game annotated with outcome flags, each side's division, and scores
/// normalized to a per-week rate so multi-week playoff games compare fairly
/// with single-week ones. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedGame {
    pub a_nick: String,
    pub h_nick: String,
    pub a_division: String,
    pub h_division: String,
    pub a_score: f64,
    pub h_score: f64,
    pub a_score_norm: f64,
    pub h_score_norm: f64,
    pub a_win: bool,
    pub h_win: bool,
    pub a_tie: bool,
    pub h_tie: bool,
    pub h_margin: f64,
    pub season: u16,
    pub playoff: Playoff,
}

/// Derive outcome flags and per-week score rates for every game, resolving
/// each side's division from the season team list.
///
/// Fails fast on the two precondition violations: a week span where
/// `week_e < week_s`, and a game that references a nickname missing from the
/// team list for that season.
pub fn normalize_games(games: &[Game], teams: &[Team]) -> Result<Vec<NormalizedGame>, LeagueError> {
    let divisions: HashMap<(&str, u16), &str> = teams
        .iter()
        .map(|t| ((t.nick_name.as_str(), t.season), t.division.as_str()))
        .collect();

    let lookup = |nick: &str, season: u16| -> Result<String, LeagueError> {
        divisions
            .get(&(nick, season))
            .map(|d| d.to_string())
            .ok_or_else(|| LeagueError::UnknownTeam {
                nickname: nick.to_string(),
                season,
            })
    };

    let mut out = Vec::with_capacity(games.len());
    for game in games {
        if game.week_e < game.week_s {
            return Err(LeagueError::InvalidWeekSpan {
                week_s: game.week_s,
                week_e: game.week_e,
            });
        }
        let weeks = (game.week_e - game.week_s + 1) as f64;
        let a_score_norm = game.a_score / weeks;
        let h_score_norm = game.h_score / weeks;
        let a_win = game.a_score > game.h_score;
        let h_win = game.a_score < game.h_score;
        let tie = game.a_score == game.h_score;

        out.push(NormalizedGame {
            a_nick: game.a_nick.clone(),
            h_nick: game.h_nick.clone(),
            a_division: lookup(&game.a_nick, game.season)?,
            h_division: lookup(&game.h_nick, game.season)?,
            a_score: game.a_score,
            h_score: game.h_score,
            a_score_norm,
            h_score_norm,
            a_win,
            h_win,
            a_tie: tie,
            h_tie: tie,
            h_margin: h_score_norm - a_score_norm,
            season: game.season,
            playoff: game.playoff,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(nick: &str, division: &str, season: u16) -> Team {
        Team {
            division: division.to_string(),
            full_name: format!("{nick} FC"),
            nick_name: nick.to_string(),
            season,
            playoff_rank: 1,
            active: true,
        }
    }

    fn game(a: &str, h: &str, a_score: f64, h_score: f64, week_s: u32, week_e: u32) -> Game {
        Game {
            away: format!("{a} FC"),
            a_nick: a.to_string(),
            a_score,
            home: format!("{h} FC"),
            h_nick: h.to_string(),
            h_score,
            week_s,
            week_e,
            season: 2020,
            playoff: Playoff::Regular,
        }
    }

    #[test]
    fn outcome_flags_are_mutually_exclusive() {
        let teams = vec![team("A", "East", 2020), team("B", "West", 2020)];
        let games = vec![
            game("A", "B", 100.0, 90.0, 1, 1),
            game("A", "B", 80.0, 95.0, 2, 2),
            game("A", "B", 88.0, 88.0, 3, 3),
        ];
        let normalized = normalize_games(&games, &teams).unwrap();

        assert!(normalized[0].a_win && !normalized[0].h_win && !normalized[0].a_tie);
        assert!(normalized[1].h_win && !normalized[1].a_win && !normalized[1].h_tie);
        assert!(normalized[2].a_tie && normalized[2].h_tie);
        assert!(!normalized[2].a_win && !normalized[2].h_win);
        assert_eq!(normalized[0].a_division, "East");
        assert_eq!(normalized[0].h_division, "West");
    }

    #[test]
    fn two_week_scores_normalize_to_weekly_rate() {
        let teams = vec![team("A", "East", 2020), team("B", "West", 2020)];
        let games = vec![game("A", "B", 220.0, 180.0, 14, 15)];
        let normalized = normalize_games(&games, &teams).unwrap();
        assert_eq!(normalized[0].a_score_norm, 110.0);
        assert_eq!(normalized[0].h_score_norm, 90.0);
        assert_eq!(normalized[0].h_margin, -20.0);
    }

    #[test]
    fn inverted_week_span_fails_fast() {
        let teams = vec![team("A", "East", 2020), team("B", "West", 2020)];
        let games = vec![game("A", "B", 100.0, 90.0, 5, 4)];
        let err = normalize_games(&games, &teams).unwrap_err();
        assert_eq!(err, LeagueError::InvalidWeekSpan { week_s: 5, week_e: 4 });
    }

    #[test]
    fn unknown_team_fails_fast() {
        let teams = vec![team("A", "East", 2020)];
        let games = vec![game("A", "B", 100.0, 90.0, 1, 1)];
        let err = normalize_games(&games, &teams).unwrap_err();
        assert_eq!(
            err,
            LeagueError::UnknownTeam { nickname: "B".to_string(), season: 2020 }
        );
    }

    #[test]
    fn playoff_flag_round_trips_through_wire_format() {
        for (flag, raw) in [(Playoff::Regular, 0u8), (Playoff::Winners, 1), (Playoff::Losers, 2)] {
            assert_eq!(u8::from(flag), raw);
            assert_eq!(Playoff::try_from(raw).unwrap(), flag);
        }
        assert!(Playoff::try_from(3u8).is_err());
    }
}
