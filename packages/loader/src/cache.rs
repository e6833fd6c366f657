//! Keyed memoization for loaded inputs.
//!
//! The cache is an ordinary value: whoever runs a batch of scenarios owns
//! one, and dropping it frees everything it holds.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Memoizes loader results by key. Failed loads are not cached.
#[derive(Debug)]
pub struct LoaderCache<K: Ord, V> {
    entries: BTreeMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Ord, V> Default for LoaderCache<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Ord, V> LoaderCache<K, V> {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, running `load` on a miss.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns on failure. Nothing is stored in
    /// that case, so the next call retries.
    pub fn get_or_try_load<E>(
        &mut self,
        key: K,
        load: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<&V, E> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let value = load(entry.key())?;
                Ok(entry.insert(value))
            }
        }
    }

    /// Drops the entry for `key`, returning it.
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that ran the loader.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache: LoaderCache<String, usize> = LoaderCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let value = cache
                .get_or_try_load("a".to_string(), |key| {
                    calls += 1;
                    Ok::<_, ()>(key.len())
                })
                .unwrap();
            assert_eq!(*value, 1);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache: LoaderCache<u32, u32> = LoaderCache::new();

        assert_eq!(cache.get_or_try_load(1, |_| Err("boom")), Err("boom"));
        assert!(cache.is_empty());

        assert_eq!(cache.get_or_try_load(1, |_| Ok::<_, &str>(7)), Ok(&7));
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn invalidate_and_clear() {
        let mut cache: LoaderCache<u32, u32> = LoaderCache::new();
        cache.get_or_try_load(1, |_| Ok::<_, ()>(10)).unwrap();
        cache.get_or_try_load(2, |_| Ok::<_, ()>(20)).unwrap();

        assert_eq!(cache.invalidate(&1), Some(10));
        assert_eq!(cache.invalidate(&1), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get_or_try_load(2, |_| Ok::<_, ()>(0)), Ok(&20));
        assert_eq!(cache.get_or_try_load(1, |_| Ok::<_, ()>(11)), Ok(&11));
        assert_eq!((cache.hits(), cache.misses()), (1, 3));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 3);
    }
}
