use mildred_league::records::MatchupLedger;
use mildred_league::season::{normalize_games, Game, Playoff, Team};
use mildred_league::seeding::seed_playoffs;
use mildred_league::standings::RankedTeam;
use mildred_league::table::{regular_season_table, Resolution};

fn team(nick: &str, division: &str) -> Team {
    Team {
        division: division.to_string(),
        full_name: format!("{nick} FC"),
        nick_name: nick.to_string(),
        season: 2020,
        playoff_rank: 1,
        active: true,
    }
}

fn game(a: &str, h: &str, a_score: f64, h_score: f64) -> Game {
    Game {
        away: format!("{a} FC"),
        a_nick: a.to_string(),
        a_score,
        home: format!("{h} FC"),
        h_nick: h.to_string(),
        h_score,
        week_s: 1,
        week_e: 1,
        season: 2020,
        playoff: Playoff::Regular,
    }
}

fn resolved_rows(games: &[Game], teams: &[Team]) -> Vec<RankedTeam> {
    match regular_season_table(games, teams).unwrap() {
        Resolution::Resolved(rows) => rows,
        Resolution::RequiresManualInput { ties, .. } => {
            panic!("expected clean resolution, got manual ties: {ties:?}")
        }
    }
}

fn seed_of(rows: &[RankedTeam], nick: &str) -> u32 {
    rows.iter()
        .find(|r| r.nickname == nick)
        .and_then(|r| r.playoff_seed)
        .unwrap()
}

/// Two division winners tied on record who never met: the tie must fall
/// straight through the neutralized head-to-head to points-for, and the
/// resolved seeds differ by exactly one.
#[test]
fn never_met_winners_resolve_on_points_for() {
    let teams = vec![
        team("Alpha", "AFC East"),
        team("Ade", "AFC East"),
        team("Bravo", "Division 6"),
        team("Bev", "Division 6"),
        team("Cedar", "Referees"),
        team("Cole", "Referees"),
    ];
    let games = vec![
        game("Alpha", "Ade", 100.0, 90.0),
        game("Ade", "Alpha", 90.0, 100.0),
        game("Alpha", "Cole", 110.0, 80.0),
        game("Cole", "Alpha", 95.0, 85.0),
        game("Bravo", "Bev", 105.0, 90.0),
        game("Bev", "Bravo", 90.0, 105.0),
        game("Bravo", "Ade", 120.0, 80.0),
        game("Ade", "Bravo", 99.0, 98.0),
        game("Cedar", "Cole", 100.0, 70.0),
        game("Cole", "Cedar", 70.0, 100.0),
        game("Ade", "Cedar", 100.0, 90.0),
        game("Cedar", "Ade", 80.0, 90.0),
    ];
    let rows = resolved_rows(&games, &teams);

    // Alpha and Bravo both 3-1; Bravo outscored Alpha 428 to 395
    assert_eq!(seed_of(&rows, "Bravo"), 1);
    assert_eq!(seed_of(&rows, "Alpha"), 2);
    assert_eq!(seed_of(&rows, "Cedar"), 3);
    assert_eq!(seed_of(&rows, "Ade"), 4);
}

/// Four tied division winners where exactly one pair has met (and split):
/// no full round-robin sweep exists, so head-to-head decides nothing and
/// points-for orders all four seeds.
#[test]
fn partial_sweep_neutralizes_head_to_head_for_the_whole_group() {
    let teams = vec![
        team("Wn", "North"),
        team("n2", "North"),
        team("Xs", "South"),
        team("s2", "South"),
        team("Ye", "East"),
        team("e2", "East"),
        team("Zw", "West"),
        team("w2", "West"),
    ];
    let games = vec![
        game("Wn", "n2", 100.0, 80.0),
        game("n2", "Wn", 80.0, 100.0),
        game("Xs", "s2", 105.0, 80.0),
        game("s2", "Xs", 80.0, 105.0),
        game("Ye", "e2", 108.0, 80.0),
        game("e2", "Ye", 82.0, 108.0),
        game("Zw", "w2", 120.0, 80.0),
        game("w2", "Zw", 80.0, 120.0),
        // the only meeting between winners, split 1-1
        game("Wn", "Xs", 100.0, 90.0),
        game("Xs", "Wn", 95.0, 85.0),
        // balance the schedule so all four winners land on 3-1
        game("Ye", "s2", 110.0, 90.0),
        game("s2", "Ye", 85.0, 80.0),
        game("Zw", "n2", 130.0, 90.0),
        game("n2", "Zw", 88.0, 87.0),
    ];
    let rows = resolved_rows(&games, &teams);

    // points-for order: Zw 457, Ye 406, Xs 395, Wn 385
    assert_eq!(seed_of(&rows, "Zw"), 1);
    assert_eq!(seed_of(&rows, "Ye"), 2);
    assert_eq!(seed_of(&rows, "Xs"), 3);
    assert_eq!(seed_of(&rows, "Wn"), 4);

    let mut seeds: Vec<u32> = rows.iter().filter_map(|r| r.playoff_seed).collect();
    seeds.sort_unstable();
    assert_eq!(seeds, (1..=8).collect::<Vec<u32>>());
}

/// A lopsided head-to-head between two members of a four-way tie must not
/// leak into the neutralized stage: the sweep check fails, points-for picks
/// the first seeds, and the head-to-head only returns once the survivors
/// form a fully swept pair.
#[test]
fn neutralized_stage_ignores_a_lopsided_pair() {
    let pair_teams = vec![team("Wn", "North"), team("Xs", "South")];
    let pair_games = vec![
        game("Wn", "Xs", 100.0, 70.0),
        game("Wn", "Xs", 110.0, 60.0),
    ];
    let normalized = normalize_games(&pair_games, &pair_teams).unwrap();
    let ledger = MatchupLedger::from_games(&normalized);

    let winner = |nick: &str, division: &str, pf: f64| RankedTeam {
        division: division.to_string(),
        nickname: nick.to_string(),
        win_total: 2,
        loss_total: 2,
        tie_total: 0,
        games_played: 4,
        win_pct: 0.5,
        points_for: pf,
        points_against: 400.0,
        avg_margin: 0.0,
        division_rank: 1,
        playoff_seed: None,
    };
    let mut rows = vec![
        winner("Wn", "North", 440.0),
        winner("Xs", "South", 460.0),
        winner("Ye", "East", 480.0),
        winner("Zw", "West", 500.0),
    ];

    let unresolved = seed_playoffs(&mut rows, &ledger);
    assert!(unresolved.is_empty());

    // Wn swept Xs head-to-head, yet takes none of the early seeds: the
    // four-way and three-way groups lack a sweep, so points-for rules them.
    assert_eq!(seed_of(&rows, "Zw"), 1);
    assert_eq!(seed_of(&rows, "Ye"), 2);
    // only the final pair is fully swept, and there head-to-head rules
    assert_eq!(seed_of(&rows, "Wn"), 3);
    assert_eq!(seed_of(&rows, "Xs"), 4);
}

/// Three-way wildcard tie where head-to-head resolves exactly one team:
/// the engine must restart the cascade (qualification + head-to-head) on
/// the remaining pair instead of dragging the whole group to points-for.
#[test]
fn partial_resolution_restarts_the_cascade_on_the_remainder() {
    let teams = vec![
        team("P", "North"),
        team("p2", "North"),
        team("Q", "South"),
        team("q2", "South"),
        team("R", "East"),
        team("r2", "East"),
    ];
    let games = vec![
        game("P", "Q", 100.0, 90.0),
        game("Q", "P", 100.0, 90.0),
        game("P", "p2", 100.0, 90.0),
        game("p2", "P", 100.0, 90.0),
        game("Q", "q2", 110.0, 90.0),
        game("q2", "Q", 95.0, 85.0),
        game("P", "R", 100.0, 90.0),
        game("Q", "R", 105.0, 95.0),
        game("R", "r2", 150.0, 70.0),
        game("R", "r2", 150.0, 70.0),
        game("R", "p2", 150.0, 70.0),
    ];
    let rows = resolved_rows(&games, &teams);

    // P, Q, R all 3-2. Head-to-head inside the trio drops R (0-2); the
    // survivors P and Q re-run the cascade as a pair, split head-to-head,
    // and Q's points-for (490 vs 480) takes seed 1. R's league-best 635
    // points-for must never pull it back into that comparison.
    assert_eq!(seed_of(&rows, "Q"), 1);
    assert_eq!(seed_of(&rows, "P"), 2);
    assert_eq!(seed_of(&rows, "R"), 3);

    // the losers seed out cleanly behind them
    assert_eq!(seed_of(&rows, "q2"), 4);
    assert_eq!(seed_of(&rows, "p2"), 5);
    assert_eq!(seed_of(&rows, "r2"), 6);
}
