use thiserror::Error;

use crate::schedule::DayIndex;

/// Reasons a schedule request cannot produce a result.
///
/// The first three variants are the outcomes of the generator itself; the rest
/// are raised while validating a request before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(
        "insufficient staff: the week needs at least {demand} shifts but members can cover only {supply}"
    )]
    InsufficientSupply { demand: u32, supply: u32 },

    #[error(
        "no valid team can be formed on {day} with the given days off and skills (check ordering, main and dishwashing coverage)"
    )]
    DayInfeasible { day: DayIndex },

    #[error(
        "no schedule satisfies all constraints simultaneously; days off or missing skills may be concentrated on particular days"
    )]
    NoJointSchedule,

    #[error("days off were given for unknown member '{0}'")]
    UnknownMember(String),

    #[error("member '{0}' appears more than once")]
    DuplicateMember(String),

    #[error("day index {0} is outside Monday..Sunday (0..=6)")]
    InvalidDay(u8),

    #[error("'{0}' is not a day of the week")]
    UnknownDay(String),

    #[error("top_n must be at least 1")]
    InvalidTopN,
}

/// Errors raised by the member registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown skill tier '{0}'")]
    UnknownTier(String),

    #[error("member '{0}' already exists")]
    DuplicateMember(String),

    #[error("member '{0}' is not registered")]
    UnknownMember(String),
}
