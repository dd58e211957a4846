//! Grouping and top-k selection shared by every ranking query.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

/// An insertion-ordered aggregation map.
///
/// Entries keep the order in which their key was first seen, which makes the
/// tie-break of [`Tally::top_k`] deterministic for a given input order.
#[derive(Debug, Clone)]
pub struct Tally<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Tally<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Tally<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `items` by `key`, folding each item into its group's value.
    pub fn collect<T, I>(
        items: I,
        key: impl Fn(&T) -> K,
        init: impl Fn() -> V,
        mut fold: impl FnMut(&mut V, &T),
    ) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut tally = Self::new();
        for item in items {
            let value = tally.entry(key(&item), &init);
            fold(value, &item);
        }
        tally
    }

    /// The value for `key`, inserting `init()` on first sight.
    pub fn entry(&mut self, key: K, init: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, init()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }
}

impl<K, V> Tally<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K, V: Ord> Tally<K, V> {
    pub fn top_k(self, k: usize) -> Vec<K> {
        top_k(self.entries, k)
    }
}

/// The `k` keys with the largest values, largest first.
///
/// The sort is stable, so keys with equal values keep their relative order.
pub fn top_k<K, V: Ord>(mut entries: Vec<(K, V)>, k: usize) -> Vec<K> {
    entries.sort_by(|(_, a), (_, b)| b.cmp(a));
    entries.into_iter().take(k).map(|(key, _)| key).collect()
}

/// Share of a group's launches that had a given outcome.
///
/// Kept as an exact `hits / total` pair and ordered by cross multiplication,
/// so ratios such as 1/3 and 2/6 compare equal and the order is total.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Reliability {
    hits: u64,
    total: u64,
}

impl Reliability {
    pub fn new(hits: u64, total: u64) -> Self {
        Self { hits, total }
    }

    pub fn record(&mut self, hit: bool) {
        self.total += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// The ratio as a float. An empty group counts as 0.0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total as f64
    }

    fn terms(&self) -> (u128, u128) {
        if self.total == 0 {
            (0, 1)
        } else {
            (u128::from(self.hits), u128::from(self.total))
        }
    }
}

impl Ord for Reliability {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_hits, a_total) = self.terms();
        let (b_hits, b_total) = other.terms();
        (a_hits * b_total).cmp(&(b_hits * a_total))
    }
}

impl PartialOrd for Reliability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Reliability {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Reliability {}
