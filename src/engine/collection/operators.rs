use std::collections::HashMap;
use std::hash::Hash;

use super::{Collection, Repr};
use crate::engine::Diff;

// Sums and products of positive counts saturate at `Diff::MAX` so they stay positive.
fn add_count<T: Eq + Hash>(counts: &mut HashMap<T, Diff>, element: T, count: Diff) {
    let total = counts.entry(element).or_insert(0);
    *total = total.saturating_add(count);
}

impl<T: Eq + Hash> Collection<T> {
    /// Relabels every element. Multiplicities of elements with equal images are summed, so the
    /// total count is preserved.
    pub fn map<R, F>(&self, mut logic: F) -> Collection<R>
    where
        R: Eq + Hash,
        F: FnMut(&T) -> R,
    {
        match &self.repr {
            Repr::Empty => Collection::empty(),
            Repr::Singleton(element) => Collection::singleton(logic(element)),
            Repr::General(counts) => {
                let mut result = HashMap::with_capacity(counts.len());
                for (element, &count) in counts.iter() {
                    add_count(&mut result, logic(element), count);
                }
                Collection::from_positive_counts(result)
            }
        }
    }

    /// Keeps the elements satisfying `predicate`, with their multiplicities unchanged.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        match &self.repr {
            Repr::Empty => Self::empty(),
            Repr::Singleton(element) => {
                if predicate(element) {
                    self.clone()
                } else {
                    Self::empty()
                }
            }
            Repr::General(counts) => Self::from_positive_counts(
                counts
                    .iter()
                    .filter(|&(element, _)| predicate(element))
                    .map(|(element, &count)| (element.clone(), count))
                    .collect(),
            ),
        }
    }

    /// Replaces every element `e` of multiplicity `m` by the collection `logic(e)`, scaled by `m`.
    /// Contributions to the same output element are summed.
    pub fn flat_map<R, F>(&self, mut logic: F) -> Collection<R>
    where
        R: Eq + Hash + Clone,
        F: FnMut(&T) -> Collection<R>,
    {
        if let Repr::Singleton(element) = &self.repr {
            return logic(element);
        }
        let mut result = HashMap::new();
        for (element, count) in self {
            for (output, output_count) in &logic(element) {
                add_count(
                    &mut result,
                    output.clone(),
                    count.saturating_mul(output_count),
                );
            }
        }
        Collection::from_positive_counts(result)
    }

    /// Every element once.
    #[must_use]
    pub fn distinct(&self) -> Self
    where
        T: Clone,
    {
        match &self.repr {
            Repr::Empty | Repr::Singleton(_) => self.clone(),
            Repr::General(counts) => Self::from_positive_counts(
                counts.keys().map(|element| (element.clone(), 1)).collect(),
            ),
        }
    }

    /// Multiset union: multiplicities are added per element.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        match (&self.repr, &other.repr) {
            (Repr::Empty, _) => other.clone(),
            (_, Repr::Empty) => self.clone(),
            _ => {
                let (larger, smaller) = if self.size() >= other.size() {
                    (self, other)
                } else {
                    (other, self)
                };
                let mut counts = larger.to_multiplicity_map();
                for (element, count) in smaller {
                    add_count(&mut counts, element.clone(), count);
                }
                Self::from_positive_counts(counts)
            }
        }
    }

    /// Equijoin of `self` and `other`.
    ///
    /// Every pair `(a, b)` with `key(a) == other_key(b)` contributes `count(a) * count(b)` to
    /// `result(a, b)`, saturating at `Diff::MAX`. The `other` side is indexed by key and the
    /// receiver probes that index, so the whole of `other` is held in memory during the join.
    pub fn join<U, K, R, FK, FU, FR>(
        &self,
        other: &Collection<U>,
        mut key: FK,
        mut other_key: FU,
        mut result: FR,
    ) -> Collection<R>
    where
        U: Eq + Hash,
        K: Eq + Hash,
        R: Eq + Hash,
        FK: FnMut(&T) -> K,
        FU: FnMut(&U) -> K,
        FR: FnMut(&T, &U) -> R,
    {
        if self.is_empty() || other.is_empty() {
            return Collection::empty();
        }
        let mut index: HashMap<K, Vec<(&U, Diff)>> = HashMap::with_capacity(other.size());
        for (element, count) in other {
            index
                .entry(other_key(element))
                .or_default()
                .push((element, count));
        }

        let mut output = HashMap::new();
        for (element, count) in self {
            let Some(matches) = index.get(&key(element)) else {
                continue;
            };
            for &(other_element, other_count) in matches {
                add_count(
                    &mut output,
                    result(element, other_element),
                    count.saturating_mul(other_count),
                );
            }
        }
        Collection::from_positive_counts(output)
    }
}
