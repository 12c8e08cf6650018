//! Policy-keyed lookup and dedup structures
//!
//! [`PolicyMap`] buckets entries by the hash an [`EqualityPolicy`] assigns
//! and resolves collisions with the policy's `equals`. Entries are kept in
//! first-insertion order, which is what group-by and join rely on for their
//! output order.

use ahash::AHashMap;

use crate::configuration::IndexConfig;
use crate::equality::{verify_contract, EqualityPolicy, StructuralEquality};
use crate::error::SeqResult;

/// Insertion-ordered map whose key identity is defined by an equality policy
#[derive(Debug, Clone)]
pub struct PolicyMap<K, V, P> {
    policy: P,
    entries: Vec<(K, V)>,
    buckets: AHashMap<u64, Vec<usize>>,
    config: IndexConfig,
}

impl<K, V, P> PolicyMap<K, V, P>
where
    P: EqualityPolicy<K>,
{
    pub fn new(policy: P) -> Self {
        Self::with_config(policy, IndexConfig::default())
    }

    pub fn with_config(policy: P, config: IndexConfig) -> Self {
        Self {
            policy,
            entries: Vec::with_capacity(config.initial_capacity),
            buckets: AHashMap::with_capacity(config.initial_capacity),
            config,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `key` in insertion order, if present
    pub fn slot_of(&self, key: &K) -> Option<usize> {
        let hash = self.policy.hash(key);
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&slot| self.policy.equals(&self.entries[slot].0, key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.slot_of(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.slot_of(key).map(|slot| &self.entries[slot].1)
    }

    /// Entry stored at `slot`, as returned by [`PolicyMap::slot_of`]
    pub fn entry_at(&self, slot: usize) -> Option<(&K, &V)> {
        self.entries.get(slot).map(|(k, v)| (k, v))
    }

    /// Value for `key`, inserting `default()` first if the key is new.
    /// When the key already exists the passed key is dropped and the first
    /// occurrence is kept.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let slot = match self.slot_of(&key) {
            Some(slot) => slot,
            None => self.push_entry(key, default()),
        };
        &mut self.entries[slot].1
    }

    /// Insert `value` under `key` unless an equal key exists.
    /// Returns true when the entry was added.
    ///
    /// With [`IndexConfig::verify_contract`] enabled, every existing key is
    /// checked against `key` first and a broken policy surfaces as
    /// `PolicyMismatch`.
    pub fn try_insert(&mut self, key: K, value: V) -> SeqResult<bool> {
        if self.config.verify_contract {
            for (existing, _) in &self.entries {
                verify_contract(&self.policy, existing, &key)?;
            }
        }
        if self.contains_key(&key) {
            return Ok(false);
        }
        self.push_entry(key, value);
        Ok(true)
    }

    /// Apply `f` to every value, keeping keys, order and policy
    pub fn map_values<W, F>(self, mut f: F) -> PolicyMap<K, W, P>
    where
        F: FnMut(V) -> W,
    {
        PolicyMap {
            policy: self.policy,
            entries: self.entries.into_iter().map(|(k, v)| (k, f(v))).collect(),
            buckets: self.buckets,
            config: self.config,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn push_entry(&mut self, key: K, value: V) -> usize {
        let slot = self.entries.len();
        let hash = self.policy.hash(&key);
        self.buckets.entry(hash).or_default().push(slot);
        self.entries.push((key, value));
        slot
    }
}

impl<K, V, P> IntoIterator for PolicyMap<K, V, P> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Dedup set whose notion of "same item" is an equality policy
///
/// ```
/// use seqkit::equality::KeyEquality;
/// use seqkit::policy_map::PolicySet;
///
/// let mut names = PolicySet::new(KeyEquality::new(|s: &String| s.to_lowercase()));
/// assert!(names.insert("Alice".to_string()).unwrap());
/// assert!(!names.insert("ALICE".to_string()).unwrap());
/// assert_eq!(names.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PolicySet<T, P> {
    map: PolicyMap<T, (), P>,
}

impl<T> PolicySet<T, StructuralEquality>
where
    T: Eq + std::hash::Hash,
{
    /// Set using the structural default policy
    pub fn structural() -> Self {
        Self::new(StructuralEquality)
    }
}

impl<T, P> PolicySet<T, P>
where
    P: EqualityPolicy<T>,
{
    pub fn new(policy: P) -> Self {
        Self::with_config(policy, IndexConfig::default())
    }

    pub fn with_config(policy: P, config: IndexConfig) -> Self {
        Self {
            map: PolicyMap::with_config(policy, config),
        }
    }

    /// Returns true when `item` was new; an equal item already present wins
    pub fn insert(&mut self, item: T) -> SeqResult<bool> {
        self.map.try_insert(item, ())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.map.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn policy(&self) -> &P {
        self.map.policy()
    }

    /// Items in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.map.keys()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.map.into_iter().map(|(item, _)| item).collect()
    }

    /// Insert without contract verification; used where the caller only
    /// needs first-occurrence dedup
    pub(crate) fn insert_unchecked(&mut self, item: T) -> bool {
        if self.map.contains_key(&item) {
            return false;
        }
        self.map.get_or_insert_with(item, || ());
        true
    }
}
