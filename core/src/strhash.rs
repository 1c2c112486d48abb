//! String-keyed index with chained buckets.
//!
//! [`StringTable`] maps owned string keys to `usize` values. It is used for
//! the table-wide path index and for every parent's leaf-name index.
//! Capacity doubles (with a full rehash) once the load factor reaches 0.75.

use std::collections::TryReserveError;

const INITIAL_BUCKETS: usize = 32;

/// Order-sensitive multiplicative string hash (djb2).
pub fn djb2(key: &str) -> u64 {
    key.bytes()
        .fold(5381u64, |h, c| h.wrapping_mul(33).wrapping_add(u64::from(c)))
}

#[derive(Debug, Clone)]
struct Entry {
    key: Box<str>,
    value: usize,
}

/// Hash table from strings to integers.
///
/// # Examples
///
/// ```
/// use cmdtree_core::StringTable;
///
/// let mut table = StringTable::new();
/// table.set("show", 0).unwrap();
/// table.set("show", 3).unwrap();
/// assert_eq!(table.get("show"), Some(3));
/// assert_eq!(table.get("shutdown"), None);
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StringTable {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates an empty table with the initial bucket count.
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); INITIAL_BUCKETS],
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(key: &str, buckets: usize) -> usize {
        (djb2(key) % buckets as u64) as usize
    }

    /// Looks up `key`.
    pub fn get(&self, key: &str) -> Option<usize> {
        let bucket = &self.buckets[Self::bucket_of(key, self.buckets.len())];
        bucket
            .iter()
            .find(|entry| &*entry.key == key)
            .map(|entry| entry.value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `key` or overwrites its value, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] if growing the table fails; the table is
    /// left unchanged in that case.
    pub fn set(&mut self, key: &str, value: usize) -> Result<Option<usize>, TryReserveError> {
        if self.len * 4 >= self.buckets.len() * 3 {
            self.resize(self.buckets.len() * 2)?;
        }

        let idx = Self::bucket_of(key, self.buckets.len());
        let bucket = &mut self.buckets[idx];
        if let Some(entry) = bucket.iter_mut().find(|entry| &*entry.key == key) {
            return Ok(Some(std::mem::replace(&mut entry.value, value)));
        }

        bucket.try_reserve(1)?;
        bucket.push(Entry {
            key: key.into(),
            value,
        });
        self.len += 1;
        Ok(None)
    }

    /// Removes `key`, returning its value. Never allocates.
    pub fn remove(&mut self, key: &str) -> Option<usize> {
        let idx = Self::bucket_of(key, self.buckets.len());
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|entry| &*entry.key == key)?;
        self.len -= 1;
        Some(bucket.swap_remove(pos).value)
    }

    /// Grows the table so that `additional` new keys fit without a resize.
    ///
    /// # Errors
    ///
    /// Returns [`TryReserveError`] if the bucket array cannot be allocated.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let mut size = self.buckets.len();
        while (self.len + additional) * 4 >= size * 3 {
            size *= 2;
        }
        if size != self.buckets.len() {
            self.resize(size)?;
        }
        Ok(())
    }

    fn resize(&mut self, new_size: usize) -> Result<(), TryReserveError> {
        let mut buckets: Vec<Vec<Entry>> = Vec::new();
        buckets.try_reserve_exact(new_size)?;
        buckets.resize_with(new_size, Vec::new);

        for entry in self.buckets.drain(..).flatten() {
            let idx = Self::bucket_of(&entry.key, new_size);
            buckets[idx].push(entry);
        }
        self.buckets = buckets;
        Ok(())
    }

    /// Iterates `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.buckets
            .iter()
            .flatten()
            .map(|entry| (&*entry.key, entry.value))
    }
}
