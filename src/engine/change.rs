// Copyright © 2024 Pathway

use std::ops::Neg;

use serde::{Deserialize, Serialize};

use super::error::{ensure_non_negative, Error, Result};

/// Signed multiplicity. Positive values insert, negative values delete.
pub type Diff = isize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insertion,
    Deletion,
    Noop,
}

/// A signed multiplicity delta for a single data value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change<T> {
    data: T,
    diff: Diff,
}

impl<T> Change<T> {
    pub fn new(data: T, diff: Diff) -> Self {
        Self { data, diff }
    }

    pub fn insert(data: T) -> Self {
        Self::new(data, 1)
    }

    pub fn remove(data: T) -> Self {
        Self::new(data, -1)
    }

    /// Inserts `count` copies of `data`. A zero count gives a no-op change.
    pub fn insert_many(data: T, count: Diff) -> Result<Self> {
        ensure_non_negative(count)?;
        Ok(Self::new(data, count))
    }

    /// Removes `count` copies of `data`. A zero count gives a no-op change.
    pub fn remove_many(data: T, count: Diff) -> Result<Self> {
        ensure_non_negative(count)?;
        Ok(Self::new(data, -count))
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn diff(&self) -> Diff {
        self.diff
    }

    pub fn kind(&self) -> ChangeKind {
        match self.diff {
            0 => ChangeKind::Noop,
            d if d > 0 => ChangeKind::Insertion,
            _ => ChangeKind::Deletion,
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.diff > 0
    }

    pub fn is_deletion(&self) -> bool {
        self.diff < 0
    }

    pub fn is_noop(&self) -> bool {
        self.diff == 0
    }

    pub fn magnitude(&self) -> usize {
        self.diff.unsigned_abs()
    }

    /// The change undoing this one. `Diff::MIN` negates to `Diff::MAX`.
    #[must_use]
    pub fn inverse(&self) -> Self
    where
        T: Clone,
    {
        Self::new(self.data.clone(), self.diff.saturating_neg())
    }

    /// Adds two changes to the same data. Fails if the data differ.
    ///
    /// The sum saturates at the `Diff` bounds.
    pub fn plus(self, other: Self) -> Result<Self>
    where
        T: PartialEq,
    {
        if self.data != other.data {
            return Err(Error::ChangeDataMismatch);
        }
        Ok(Self::new(self.data, self.diff.saturating_add(other.diff)))
    }
}

impl<T> Neg for Change<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(self.data, self.diff.saturating_neg())
    }
}
