//! Season standings and playoff seeding for the Mildred League: pure
//! derivations from a season's games and teams, with a strictly ordered
//! tiebreaker protocol for everything the win column can't settle.

pub mod alltime;
pub mod error;
pub mod export;
pub mod records;
pub mod score_spread;
pub mod season;
pub mod seeding;
pub mod snapshot;
pub mod standings;
pub mod synthetic;
pub mod table;
