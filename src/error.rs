use thiserror::Error;

use crate::stats_editor::StatField;

/// Errors raised by the stats edit buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("row {index} is out of range (roster has {len} players)")]
    OutOfRange { index: usize, len: usize },

    #[error("unknown stat field '{0}'")]
    UnknownField(String),

    #[error("'{raw}' is not a valid value for {field}")]
    InvalidNumber { field: StatField, raw: String },

    #[error("stats are still loading")]
    NotReady,
}

/// Validation errors for the match and player forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill all fields")]
    MissingFields,

    #[error("Team 1 and Team 2 cannot be the same.")]
    SameTeams,

    #[error("invalid match date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid cost '{0}'")]
    InvalidCost(String),
}
