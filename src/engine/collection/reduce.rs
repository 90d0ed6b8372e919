use std::hash::Hash;

use itertools::Itertools;

use super::Collection;

impl<T: Eq + Hash + Clone> Collection<T> {
    /// Groups elements by `key` and applies `aggregator` once per distinct key.
    ///
    /// The slice handed to `aggregator` repeats every element according to its multiplicity.
    /// Aggregated values are gathered into a collection the same way [`FromIterator`] does it, so
    /// two keys producing equal values yield a single entry whose multiplicity is the number of
    /// such keys.
    pub fn group_by<K, R, FK, FA>(&self, key: FK, mut aggregator: FA) -> Collection<R>
    where
        K: Eq + Hash,
        R: Eq + Hash,
        FK: FnMut(&T) -> K,
        FA: FnMut(&K, &[T]) -> R,
    {
        if self.is_empty() {
            return Collection::empty();
        }
        self.to_list()
            .into_iter()
            .into_group_map_by(key)
            .iter()
            .map(|(key, group)| aggregator(key, group.as_slice()))
            .collect()
    }

    /// Left-folds every occurrence (repeats included) with `op`. Returns `None` for an empty
    /// collection.
    pub fn reduce<F>(&self, op: F) -> Option<T>
    where
        F: FnMut(T, T) -> T,
    {
        self.to_list().into_iter().reduce(op)
    }
}
