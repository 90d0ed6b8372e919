// Copyright © 2024 Pathway

//! Append-only log of timestamped changes.

use std::cmp::max;
use std::collections::HashMap;
use std::hash::Hash;
use std::slice;

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::change::{Change, Diff};
use super::collection::Collection;
use super::config::Config;
use super::error::{Error, Result};
use super::timestamp::Timestamp;

/// A [`Change`] together with the logical time it was recorded at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestampedChange<T> {
    change: Change<T>,
    timestamp: Timestamp,
}

impl<T> TimestampedChange<T> {
    pub fn new(change: Change<T>, timestamp: Timestamp) -> Self {
        Self { change, timestamp }
    }

    pub fn change(&self) -> &Change<T> {
        &self.change
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn data(&self) -> &T {
        self.change.data()
    }

    pub fn diff(&self) -> Diff {
        self.change.diff()
    }

    pub fn into_change(self) -> Change<T> {
        self.change
    }
}

/// A log of changes plus a logical clock that never moves backwards.
///
/// Every entry carries the clock value at the moment it was recorded, so entries are ordered by
/// timestamp as well as by recording order. No-op changes are never stored.
#[derive(Debug, Clone)]
pub struct Trace<T> {
    timestamp: Timestamp,
    changes: Vec<TimestampedChange<T>>,
}

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trace<T> {
    pub fn new() -> Self {
        Self::starting_at(Timestamp::minimum())
    }

    pub fn starting_at(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            changes: Vec::new(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            timestamp: config.initial_timestamp(),
            changes: Vec::with_capacity(config.trace_capacity()),
        }
    }

    /// A trace holding `changes` as a single batch recorded at the minimum timestamp.
    pub fn from_changes(changes: impl IntoIterator<Item = Change<T>>) -> Self {
        let mut result = Self::new();
        result.record_batch(changes);
        result
    }

    /// Rebuilds a trace from previously recorded entries.
    ///
    /// Entries must be ordered by timestamp. The clock ends at the latest entry's timestamp.
    pub fn from_timestamped(
        entries: impl IntoIterator<Item = TimestampedChange<T>>,
    ) -> Result<Self> {
        let mut result = Self::new();
        for entry in entries {
            result.advance(entry.timestamp())?;
            result.record(entry.into_change());
        }
        Ok(result)
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// All recorded entries in recording order.
    pub fn changes(&self) -> &[TimestampedChange<T>] {
        &self.changes
    }

    /// Moves the clock forward to `timestamp`. Advancing to the current time does nothing.
    pub fn advance(&mut self, timestamp: Timestamp) -> Result<()> {
        if timestamp < self.timestamp {
            return Err(Error::TimestampRegression {
                current: self.timestamp,
                requested: timestamp,
            });
        }
        if timestamp > self.timestamp {
            debug!("Advancing trace clock from {} to {timestamp}", self.timestamp);
            self.timestamp = timestamp;
        }
        Ok(())
    }

    pub fn insert(&mut self, data: T) {
        self.record(Change::insert(data));
    }

    pub fn remove(&mut self, data: T) {
        self.record(Change::remove(data));
    }

    /// Records `count` insertions of `data` at the current time. A zero count records nothing.
    pub fn insert_many(&mut self, data: T, count: Diff) -> Result<()> {
        self.record(Change::insert_many(data, count)?);
        Ok(())
    }

    /// Records `count` deletions of `data` at the current time. A zero count records nothing.
    pub fn remove_many(&mut self, data: T, count: Diff) -> Result<()> {
        self.record(Change::remove_many(data, count)?);
        Ok(())
    }

    /// Appends `change` at the current time, unless it is a no-op.
    pub fn record(&mut self, change: Change<T>) {
        if change.is_noop() {
            trace!("Dropping no-op change at {}", self.timestamp);
            return;
        }
        self.changes.push(TimestampedChange::new(change, self.timestamp));
    }

    /// Records every change in order, all at the current time.
    pub fn record_batch(&mut self, changes: impl IntoIterator<Item = Change<T>>) {
        for change in changes {
            self.record(change);
        }
    }

    fn position_of(&self, timestamp: Timestamp) -> usize {
        self.changes
            .partition_point(|entry| entry.timestamp() < timestamp)
    }

    /// Entries with `timestamp >= since`, in recording order.
    pub fn changes_from(&self, since: Timestamp) -> slice::Iter<'_, TimestampedChange<T>> {
        self.changes[self.position_of(since)..].iter()
    }

    /// Entries with `from <= timestamp < to`, in recording order.
    pub fn changes_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> slice::Iter<'_, TimestampedChange<T>> {
        let start = self.position_of(from);
        let end = max(start, self.position_of(to));
        self.changes[start..end].iter()
    }

    /// A new trace holding the entries with `timestamp >= from`. Its clock starts at the later of
    /// `from` and this trace's clock.
    #[must_use]
    pub fn trim_before(&self, from: Timestamp) -> Self
    where
        T: Clone,
    {
        let changes: Vec<_> = self.changes_from(from).cloned().collect();
        debug!(
            "Trimming trace before {from}: keeping {} of {} entries",
            changes.len(),
            self.changes.len()
        );
        Self {
            timestamp: max(from, self.timestamp),
            changes,
        }
    }
}

impl<T: Eq + Hash + Clone> Trace<T> {
    /// Replays the whole log into net multiplicities.
    ///
    /// Entries are applied in recording order; whenever an element's running total reaches zero
    /// or below it is dropped, and a later insertion starts it again from zero.
    pub fn consolidate(&self) -> HashMap<T, Diff> {
        consolidate_entries(&self.changes)
    }

    /// Like [`Trace::consolidate`], restricted to entries with `timestamp <= time`.
    pub fn consolidate_as_of(&self, time: Timestamp) -> HashMap<T, Diff> {
        let end = self
            .changes
            .partition_point(|entry| entry.timestamp() <= time);
        consolidate_entries(&self.changes[..end])
    }

    pub fn to_collection(&self) -> Collection<T> {
        collection_from_consolidated(self.consolidate())
    }

    pub fn to_collection_as_of(&self, time: Timestamp) -> Collection<T> {
        collection_from_consolidated(self.consolidate_as_of(time))
    }

    /// A new trace with the same clock in which entries sharing both timestamp and data are merged
    /// into one. Merged entries that cancel out are dropped.
    ///
    /// Merging reorders diffs within a timestamp, so a deletion recorded before an insertion of
    /// the same datum at the same time no longer saturates at zero on replay.
    #[must_use]
    pub fn compact(&self) -> Self {
        let mut merged: IndexMap<(Timestamp, T), Diff> = IndexMap::new();
        for entry in &self.changes {
            let diff = merged
                .entry((entry.timestamp(), entry.data().clone()))
                .or_insert(0);
            *diff = diff.saturating_add(entry.diff());
        }
        let changes: Vec<_> = merged
            .into_iter()
            .filter(|(_, diff)| *diff != 0)
            .map(|((timestamp, data), diff)| {
                TimestampedChange::new(Change::new(data, diff), timestamp)
            })
            .collect();
        debug!(
            "Compacted trace from {} to {} entries",
            self.changes.len(),
            changes.len()
        );
        Self {
            timestamp: self.timestamp,
            changes,
        }
    }
}

fn consolidate_entries<T: Eq + Hash + Clone>(
    entries: &[TimestampedChange<T>],
) -> HashMap<T, Diff> {
    let mut counts: HashMap<T, Diff> = HashMap::new();
    for entry in entries {
        let diff = entry.diff();
        if let Some(total) = counts.get_mut(entry.data()) {
            *total = total.saturating_add(diff);
            if *total <= 0 {
                counts.remove(entry.data());
            }
        } else if diff > 0 {
            counts.insert(entry.data().clone(), diff);
        }
    }
    counts
}

fn collection_from_consolidated<T: Eq + Hash>(counts: HashMap<T, Diff>) -> Collection<T> {
    // consolidation never keeps non-positive totals
    Collection::from_positive_counts(counts)
}
