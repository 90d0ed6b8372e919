// Copyright © 2024 Pathway

use std::result;

use super::{Diff, Timestamp};
use crate::env::Error as EnvError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("count must be non-negative, got {0}")]
    NegativeCount(Diff),

    #[error("cannot combine changes carrying different data")]
    ChangeDataMismatch,

    #[error("multiplicity must be positive, got {0}")]
    NonPositiveMultiplicity(Diff),

    #[error("cannot move the clock backwards from {current} to {requested}")]
    TimestampRegression {
        current: Timestamp,
        requested: Timestamp,
    },

    #[error("invalid configuration: {0}")]
    Env(#[from] EnvError),
}

impl Error {
    /// Whether the error was caused by a bad argument to an engine operation,
    /// as opposed to bad configuration.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::NegativeCount(_)
                | Self::ChangeDataMismatch
                | Self::NonPositiveMultiplicity(_)
                | Self::TimestampRegression { .. }
        )
    }
}

pub type Result<T, E = Error> = result::Result<T, E>;

pub(crate) fn ensure_non_negative(count: Diff) -> Result<()> {
    if count < 0 {
        Err(Error::NegativeCount(count))
    } else {
        Ok(())
    }
}
