use serde::{Deserialize, Serialize};

use crate::error::LeagueError;
use crate::season::{Game, Team};

/// Placeholder opponent used for odd-team weeks; it never gets a row.
pub const BYE_NICK: &str = "Bye";

/// A team's normalized weekly scores for one season, split into the points
/// it scored and the points scored against it. Feeds distribution views;
/// rendering is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSpread {
    pub nickname: String,
    pub playoff_rank: u32,
    pub for_scores: Vec<f64>,
    pub against_scores: Vec<f64>,
}

/// Collect every normalized score in the season per team, ordered by the
/// externally assigned playoff rank.
pub fn season_score_spread(
    games: &[Game],
    teams: &[Team],
) -> Result<Vec<ScoreSpread>, LeagueError> {
    let rank_of = |nick: &str| -> u32 {
        teams
            .iter()
            .find(|t| t.nick_name == nick)
            .map(|t| t.playoff_rank)
            .unwrap_or(u32::MAX)
    };

    let mut spreads: Vec<ScoreSpread> = Vec::new();
    let push = |nick: &str, scored: f64, allowed: f64, spreads: &mut Vec<ScoreSpread>| {
        if nick == BYE_NICK {
            return;
        }
        let spread = match spreads.iter_mut().find(|s| s.nickname == nick) {
            Some(existing) => existing,
            None => {
                spreads.push(ScoreSpread {
                    nickname: nick.to_string(),
                    playoff_rank: rank_of(nick),
                    for_scores: Vec::new(),
                    against_scores: Vec::new(),
                });
                spreads.last_mut().unwrap()
            }
        };
        spread.for_scores.push(scored);
        spread.against_scores.push(allowed);
    };

    for game in games {
        if game.week_e < game.week_s {
            return Err(LeagueError::InvalidWeekSpan {
                week_s: game.week_s,
                week_e: game.week_e,
            });
        }
        let weeks = (game.week_e - game.week_s + 1) as f64;
        let a_norm = game.a_score / weeks;
        let h_norm = game.h_score / weeks;
        push(&game.a_nick, a_norm, h_norm, &mut spreads);
        push(&game.h_nick, h_norm, a_norm, &mut spreads);
    }

    spreads.sort_by(|a, b| {
        a.playoff_rank
            .cmp(&b.playoff_rank)
            .then_with(|| a.nickname.cmp(&b.nickname))
    });
    Ok(spreads)
}
