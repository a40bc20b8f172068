use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::season::{Game, Playoff, Team};

/// The league's three divisions.
pub const DIVISIONS: [&str; 3] = ["AFC East", "Division 6", "Referees"];

const WEEKS: u32 = 13;

/// Generate a reproducible season: three divisions, a single round robin
/// across the whole league, and seeded random scores. Same seed, same
/// season — property tests and benchmarks rely on that.
pub fn synthetic_season(season: u16, teams_per_division: usize, seed: u64) -> (Vec<Game>, Vec<Team>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut teams = Vec::new();
    for (d, division) in DIVISIONS.iter().enumerate() {
        for t in 0..teams_per_division {
            let index = d * teams_per_division + t;
            teams.push(Team {
                division: division.to_string(),
                full_name: format!("Synthetic Club {:02}", index + 1),
                nick_name: format!("T{:02}", index + 1),
                season,
                playoff_rank: (index + 1) as u32,
                active: true,
            });
        }
    }

    let mut games = Vec::new();
    for (i, away) in teams.iter().enumerate() {
        for home in teams.iter().skip(i + 1) {
            let week = (games.len() as u32 % WEEKS) + 1;
            games.push(Game {
                away: away.full_name.clone(),
                a_nick: away.nick_name.clone(),
                a_score: random_score(&mut rng),
                home: home.full_name.clone(),
                h_nick: home.nick_name.clone(),
                h_score: random_score(&mut rng),
                week_s: week,
                week_e: week,
                season,
                playoff: Playoff::Regular,
            });
        }
    }

    (games, teams)
}

/// The adversarial worst case: every game in the round robin ends in the
/// same tie, so every team carries an identical record through every
/// tiebreaker criterion.
pub fn all_tied_season(season: u16, teams_per_division: usize) -> (Vec<Game>, Vec<Team>) {
    let (mut games, teams) = synthetic_season(season, teams_per_division, 0);
    for game in &mut games {
        game.a_score = 100.0;
        game.h_score = 100.0;
    }
    (games, teams)
}

fn random_score(rng: &mut StdRng) -> f64 {
    // two decimals, the resolution score entry actually uses
    (rng.gen_range(70.0f64..150.0) * 100.0).round() / 100.0
}
