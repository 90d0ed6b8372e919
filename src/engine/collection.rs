// Copyright © 2024 Pathway

//! Immutable multisets.
//!
//! A [`Collection`] maps distinct elements to strictly positive multiplicities. It has three
//! internal representations: empty, a single element with multiplicity one, and a general
//! multiplicity map. They are interchangeable: equality, hashing and every operator depend only on
//! the multiplicity map a collection denotes. Operators never return a general collection without
//! entries; such results collapse to the empty representation.

mod operators;
mod reduce;

use std::borrow::Borrow;
use std::collections::{hash_map, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::iter;
use std::sync::Arc;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use xxhash_rust::xxh3::Xxh3 as Hasher;

use super::change::{Change, ChangeKind, Diff};
use super::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Empty,
    Singleton,
    General,
}

#[derive(Clone)]
enum Repr<T> {
    Empty,
    Singleton(T),
    General(Arc<HashMap<T, Diff>>),
}

#[derive(Clone)]
pub struct Collection<T> {
    repr: Repr<T>,
}

impl<T> Collection<T> {
    pub fn empty() -> Self {
        Self { repr: Repr::Empty }
    }

    /// A collection holding `element` once.
    pub fn singleton(element: T) -> Self {
        Self {
            repr: Repr::Singleton(element),
        }
    }

    pub fn representation(&self) -> Representation {
        match &self.repr {
            Repr::Empty => Representation::Empty,
            Repr::Singleton(_) => Representation::Singleton,
            Repr::General(_) => Representation::General,
        }
    }

    /// Number of distinct elements.
    pub fn size(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Singleton(_) => 1,
            Repr::General(counts) => counts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Sum of all multiplicities.
    pub fn total_count(&self) -> i128 {
        self.iter().map(|(_, count)| count as i128).sum()
    }

    /// Iterates over distinct elements together with their multiplicities.
    ///
    /// The collection is not consumed, so calling `iter` again yields the same sequence.
    pub fn iter(&self) -> Iter<'_, T> {
        let inner = match &self.repr {
            Repr::Empty => IterInner::Empty,
            Repr::Singleton(element) => IterInner::Singleton(Some(element)),
            Repr::General(counts) => IterInner::General(counts.iter()),
        };
        Iter { inner }
    }

    /// Elements in arbitrary order, each repeated according to its multiplicity.
    pub fn to_list(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter()
            .flat_map(|(element, count)| iter::repeat_n(element.clone(), count.unsigned_abs()))
            .collect()
    }
}

impl<T: Eq + Hash> Collection<T> {
    /// Builds a general collection from a multiplicity map.
    ///
    /// Every multiplicity must be positive. An empty map gives the empty collection.
    pub fn from_counts(counts: HashMap<T, Diff>) -> Result<Self> {
        if let Some(&count) = counts.values().find(|&&count| count <= 0) {
            return Err(Error::NonPositiveMultiplicity(count));
        }
        Ok(Self::from_positive_counts(counts))
    }

    /// Folds `changes` into the empty collection with [`Collection::apply_change`].
    pub fn from_changes(changes: impl IntoIterator<Item = Change<T>>) -> Self
    where
        T: Clone,
    {
        changes
            .into_iter()
            .fold(Self::empty(), |collection, change| {
                collection.apply_change(&change)
            })
    }

    pub(crate) fn from_positive_counts(counts: HashMap<T, Diff>) -> Self {
        // callers combine positive counts with saturating arithmetic, which cannot reach zero
        debug_assert!(counts.values().all(|&count| count > 0));
        if counts.is_empty() {
            Self::empty()
        } else {
            Self {
                repr: Repr::General(Arc::new(counts)),
            }
        }
    }

    pub fn count<Q>(&self, element: &Q) -> Diff
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Singleton(only) => Diff::from(Borrow::<Q>::borrow(only) == element),
            Repr::General(counts) => counts.get(element).copied().unwrap_or(0),
        }
    }

    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.count(element) > 0
    }

    /// Applies a single change.
    ///
    /// An insertion adds one occurrence of the datum. A deletion removes one occurrence, but only
    /// when at least one occurrence remains afterwards; deleting the last occurrence (or an absent
    /// datum) leaves the collection as it is.
    #[must_use]
    pub fn apply_change(&self, change: &Change<T>) -> Self
    where
        T: Clone,
    {
        match change.kind() {
            ChangeKind::Insertion => self.concat(&Self::singleton(change.data().clone())),
            ChangeKind::Deletion => {
                let remaining = self.count(change.data()) - 1;
                if remaining > 0 {
                    let mut counts = self.to_multiplicity_map();
                    counts.insert(change.data().clone(), remaining);
                    Self::from_positive_counts(counts)
                } else {
                    self.clone()
                }
            }
            ChangeKind::Noop => self.clone(),
        }
    }

    pub fn to_set(&self) -> HashSet<T>
    where
        T: Clone,
    {
        self.iter().map(|(element, _)| element.clone()).collect()
    }

    pub fn to_multiplicity_map(&self) -> HashMap<T, Diff>
    where
        T: Clone,
    {
        match &self.repr {
            Repr::General(counts) => counts.as_ref().clone(),
            _ => self
                .iter()
                .map(|(element, count)| (element.clone(), count))
                .collect(),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Eq + Hash> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self
                .iter()
                .all(|(element, count)| other.count(element) == count)
    }
}

impl<T: Eq + Hash> Eq for Collection<T> {}

impl<T: Eq + Hash> Hash for Collection<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // entries are hashed separately and summed, so iteration order does not matter
        let mut combined: u64 = 0;
        for (element, count) in self {
            let mut hasher = Hasher::default();
            element.hash(&mut hasher);
            count.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.digest());
        }
        state.write_usize(self.size());
        state.write_u64(combined);
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T: Eq + Hash> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let mut counts: HashMap<T, Diff> = HashMap::new();
        for element in elements {
            *counts.entry(element).or_insert(0) += 1;
        }
        // a lone occurrence stays in the singleton form, as concatenating onto empty would
        if counts.len() == 1 && counts.values().all(|&count| count == 1) {
            if let Some(element) = counts.into_keys().next() {
                return Self::singleton(element);
            }
            return Self::empty();
        }
        Self::from_positive_counts(counts)
    }
}

impl<T: Eq + Hash, const N: usize> From<[T; N]> for Collection<T> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<T: Eq + Hash> TryFrom<HashMap<T, Diff>> for Collection<T> {
    type Error = Error;

    fn try_from(counts: HashMap<T, Diff>) -> Result<Self> {
        Self::from_counts(counts)
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T> Deserialize<'de> for Collection<T>
where
    T: Deserialize<'de> + Eq + Hash,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let counts = HashMap::<T, Diff>::deserialize(deserializer)?;
        Self::from_counts(counts).map_err(de::Error::custom)
    }
}

pub struct Iter<'a, T> {
    inner: IterInner<'a, T>,
}

enum IterInner<'a, T> {
    Empty,
    Singleton(Option<&'a T>),
    General(hash_map::Iter<'a, T, Diff>),
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            IterInner::Empty => IterInner::Empty,
            IterInner::Singleton(element) => IterInner::Singleton(*element),
            IterInner::General(counts) => IterInner::General(counts.clone()),
        };
        Self { inner }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, Diff);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Empty => None,
            IterInner::Singleton(element) => element.take().map(|element| (element, 1)),
            IterInner::General(counts) => counts.next().map(|(element, &count)| (element, count)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterInner::Empty => (0, Some(0)),
            IterInner::Singleton(element) => {
                let len = usize::from(element.is_some());
                (len, Some(len))
            }
            IterInner::General(counts) => counts.size_hint(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = (&'a T, Diff);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
