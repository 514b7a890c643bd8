// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group items into buckets keyed by a derived value.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::hash::Hash;

use hashbrown::HashMap;

/// A key usable with [`group_by`].
///
/// Keys must be hashable (to find their bucket) and ordered (to sort the buckets). Floats are
/// supported by hashing their bit pattern, with `-0.0` folded onto `0.0`.
pub trait GroupKey: Copy {
    /// Hashable stand-in for the key.
    type Hashed: Hash + Eq;

    /// Returns the hashable stand-in.
    fn hashed(self) -> Self::Hashed;

    /// Total order used to sort keys.
    fn order(&self, other: &Self) -> Ordering;
}

impl GroupKey for f64 {
    type Hashed = u64;

    fn hashed(self) -> u64 {
        if self == 0.0 { 0.0_f64.to_bits() } else { self.to_bits() }
    }

    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

macro_rules! impl_group_key_int {
    ($($ty:ty),*) => {
        $(
            impl GroupKey for $ty {
                type Hashed = $ty;

                fn hashed(self) -> $ty {
                    self
                }

                fn order(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

impl_group_key_int!(u32, u64, usize, i32, i64);

/// Items grouped by key, with keys in ascending order.
#[derive(Clone, Debug)]
pub struct Groups<K: GroupKey, T> {
    keys: Vec<K>,
    buckets: HashMap<K::Hashed, Vec<T>>,
}

impl<K: GroupKey, T> Groups<K, T> {
    /// Keys in ascending order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no item was grouped.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the bucket for `key`.
    pub fn get(&self, key: K) -> Option<&[T]> {
        self.buckets.get(&key.hashed()).map(Vec::as_slice)
    }

    /// Iterates `(key, bucket)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[T])> + '_ {
        self.keys
            .iter()
            .map(|&k| (k, self.get(k).unwrap_or_default()))
    }

    /// Consumes the groups, returning the buckets in ascending key order.
    pub fn into_buckets(mut self) -> Vec<Vec<T>> {
        self.keys
            .iter()
            .map(|k| self.buckets.remove(&k.hashed()).unwrap_or_default())
            .collect()
    }
}

/// Groups `items` by `key`.
///
/// Items keep their encounter order inside each bucket; buckets are ordered by ascending key.
pub fn group_by<K, T, I, F>(items: I, mut key: F) -> Groups<K, T>
where
    K: GroupKey,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> K,
{
    let mut keys = Vec::new();
    let mut buckets: HashMap<K::Hashed, Vec<T>> = HashMap::new();
    for item in items {
        let k = key(&item);
        buckets
            .entry(k.hashed())
            .or_insert_with(|| {
                keys.push(k);
                Vec::new()
            })
            .push(item);
    }
    keys.sort_by(GroupKey::order);
    Groups { keys, buckets }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn keys_are_sorted_and_buckets_keep_encounter_order() {
        let items = vec![(3.0, 'a'), (1.0, 'b'), (3.0, 'c'), (2.0, 'd'), (1.0, 'e')];
        let groups = group_by(items, |&(k, _)| k);

        assert_eq!(groups.keys(), &[1.0, 2.0, 3.0]);
        let names: Vec<Vec<char>> = groups
            .into_buckets()
            .into_iter()
            .map(|b| b.into_iter().map(|(_, c)| c).collect())
            .collect();
        assert_eq!(names, vec![vec!['b', 'e'], vec!['d'], vec!['a', 'c']]);
    }

    #[test]
    fn negative_zero_shares_a_bucket_with_zero() {
        let groups = group_by(vec![0.0_f64, -0.0, 1.0], |&k| k);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get(0.0).map(<[f64]>::len), Some(2));
    }

    #[test]
    fn integer_keys() {
        let groups = group_by(0_u32..7, |&i| i % 3);
        let sizes: Vec<(u32, usize)> = groups.iter().map(|(k, b)| (k, b.len())).collect();
        assert_eq!(sizes, vec![(0, 3), (1, 2), (2, 2)]);
        assert!(groups.get(5).is_none());
    }
}
