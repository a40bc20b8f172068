use thiserror::Error;

/// Precondition violations surfaced to the caller. These are data problems
/// the caller must fix; nothing here is retryable.
///
/// An unresolvable tie is deliberately NOT an error — it is a designed
/// terminal state carried by [`crate::table::Resolution::RequiresManualInput`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeagueError {
    #[error("invalid week span: week_e {week_e} precedes week_s {week_s}")]
    InvalidWeekSpan { week_s: u32, week_e: u32 },

    #[error("game references team {nickname:?} in season {season}, but the season team list has no such team")]
    UnknownTeam { nickname: String, season: u16 },
}
