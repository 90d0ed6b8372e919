// Copyright © 2024 Pathway

use log::warn;

use super::error::Result;
use super::Timestamp;
use crate::env::{parse_env_var_or, var_name};

const INITIAL_TIMESTAMP_VAR: &str = "INITIAL_TIMESTAMP";
const TRACE_CAPACITY_VAR: &str = "TRACE_CAPACITY";

/// Capacity hints above this are honored but reported, since the buffer is allocated eagerly.
const LARGE_TRACE_CAPACITY: usize = 1 << 24;

/// Settings for newly created traces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    initial_timestamp: Timestamp,
    trace_capacity: usize,
}

impl Config {
    /// Reads `DELTASET_INITIAL_TIMESTAMP` and `DELTASET_TRACE_CAPACITY`, falling back to the
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let initial_timestamp =
            parse_env_var_or(&var_name(INITIAL_TIMESTAMP_VAR), Timestamp::minimum())?;
        let trace_capacity = parse_env_var_or(&var_name(TRACE_CAPACITY_VAR), 0)?;
        Ok(Self::default()
            .with_initial_timestamp(initial_timestamp)
            .with_trace_capacity(trace_capacity))
    }

    #[must_use]
    pub fn with_initial_timestamp(mut self, initial_timestamp: Timestamp) -> Self {
        self.initial_timestamp = initial_timestamp;
        self
    }

    #[must_use]
    pub fn with_trace_capacity(mut self, trace_capacity: usize) -> Self {
        if trace_capacity > LARGE_TRACE_CAPACITY {
            warn!("Trace capacity hint {trace_capacity} is unusually large");
        }
        self.trace_capacity = trace_capacity;
        self
    }

    pub fn initial_timestamp(&self) -> Timestamp {
        self.initial_timestamp
    }

    pub fn trace_capacity(&self) -> usize {
        self.trace_capacity
    }
}
