//! Terminal operations
//!
//! Each method here drains one traversal of the sequence eagerly. The result
//! is owned and independent of the source: mutating the source afterwards
//! never changes it. Nothing is memoized, so calling a terminal operation
//! twice traverses twice.

use std::hash::Hash;

use crate::builder::FrozenList;
use crate::equality::{EqualityPolicy, StructuralEquality};
use crate::error::{SeqError, SeqResult};
use crate::policy_map::PolicySet;
use crate::sequence::Seq;

impl<'a, T: 'a> Seq<'a, T> {
    /// Copy every item into a new `Vec`
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Copy every item into a boxed slice sized to the item count
    pub fn to_boxed_slice(&self) -> Box<[T]> {
        self.to_vec().into_boxed_slice()
    }

    /// Copy every item into an immutable list
    pub fn to_frozen(&self) -> FrozenList<T> {
        self.iter().collect()
    }

    /// Dedup into a set using the structural policy
    pub fn to_set(&self) -> PolicySet<T, StructuralEquality>
    where
        T: Eq + Hash,
    {
        self.to_set_with(StructuralEquality)
    }

    /// Dedup into a set under `policy`; the first of each equal run is kept
    pub fn to_set_with<P>(&self, policy: P) -> PolicySet<T, P>
    where
        P: EqualityPolicy<T>,
    {
        let mut set = PolicySet::new(policy);
        for item in self.iter() {
            set.insert_unchecked(item);
        }
        set
    }

    /// First item, failing with `EmptySequence` when there is none
    pub fn first(&self) -> SeqResult<T> {
        self.iter().next().ok_or(SeqError::EmptySequence)
    }

    /// First item, or `default` when there is none
    pub fn first_or_default(&self, default: T) -> T {
        self.iter().next().unwrap_or(default)
    }

    /// First item, or the result of `fallback` when there is none
    pub fn first_or_else<F>(&self, fallback: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.iter().next().unwrap_or_else(fallback)
    }

    /// Number of items in one full traversal
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}
