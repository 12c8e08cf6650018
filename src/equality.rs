//! Equality policies for dedup and grouping structures
//!
//! An [`EqualityPolicy`] is a pluggable `equals` + `hash` pair. Every
//! structure that deduplicates or buckets values (group-by, join indexes,
//! [`crate::policy_map::PolicySet`]) takes exactly one policy at construction
//! and keeps it for its whole lifetime.
//!
//! # Contract
//!
//! `equals(a, b)` must imply `hash(a) == hash(b)`, and both functions must be
//! pure for as long as a structure uses them. A policy that breaks this
//! contract leaves the owning structure's behaviour undefined; it is a
//! documented precondition, checked only on request via [`verify_contract`]
//! or [`crate::configuration::IndexConfig::verify_contract`].
//!
//! Value equality and identity are separate operations here:
//! [`values_equal`] asks the policy, [`same_instance`] and
//! [`same_allocation`] compare addresses.

use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{SeqError, SeqResult};

/// Pluggable equals/hash contract
pub trait EqualityPolicy<T: ?Sized> {
    fn equals(&self, a: &T, b: &T) -> bool;
    fn hash(&self, value: &T) -> u64;
}

/// Default policy: compares every field through `Eq` and hashes through `Hash`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralEquality;

impl<T: Eq + Hash + ?Sized> EqualityPolicy<T> for StructuralEquality {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn hash(&self, value: &T) -> u64 {
        // Fixed seeds keep hashes stable across instances and processes
        let mut hasher = structural_hash_state().build_hasher();
        Hash::hash(value, &mut hasher);
        hasher.finish()
    }
}

fn structural_hash_state() -> ahash::RandomState {
    ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
}

/// A policy built from a plain pair of functions
#[derive(Clone)]
pub struct FnEquality<E, H> {
    equals: E,
    hash: H,
}

impl<E, H> FnEquality<E, H> {
    pub fn new(equals: E, hash: H) -> Self {
        Self { equals, hash }
    }
}

impl<T, E, H> EqualityPolicy<T> for FnEquality<E, H>
where
    T: ?Sized,
    E: Fn(&T, &T) -> bool,
    H: Fn(&T) -> u64,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (self.equals)(a, b)
    }

    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}

/// Compares values by a projected key, e.g. a subset of their fields
///
/// ```
/// use seqkit::equality::{EqualityPolicy, KeyEquality};
///
/// let by_name = KeyEquality::new(|p: &(String, u32)| p.0.clone());
/// let (a, b) = ((String::from("Ana"), 30), (String::from("Ana"), 31));
/// assert!(by_name.equals(&a, &b));
/// ```
pub struct KeyEquality<F, K> {
    project: F,
    _key: PhantomData<fn() -> K>,
}

impl<F: Clone, K> Clone for KeyEquality<F, K> {
    fn clone(&self) -> Self {
        Self {
            project: self.project.clone(),
            _key: PhantomData,
        }
    }
}

impl<F, K> KeyEquality<F, K> {
    pub fn new<T>(project: F) -> Self
    where
        T: ?Sized,
        F: Fn(&T) -> K,
    {
        Self {
            project,
            _key: PhantomData,
        }
    }
}

impl<T, F, K> EqualityPolicy<T> for KeyEquality<F, K>
where
    T: ?Sized,
    F: Fn(&T) -> K,
    K: Eq + Hash,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (self.project)(a) == (self.project)(b)
    }

    fn hash(&self, value: &T) -> u64 {
        EqualityPolicy::<K>::hash(&StructuralEquality, &(self.project)(value))
    }
}

impl<T, P> EqualityPolicy<T> for &P
where
    T: ?Sized,
    P: EqualityPolicy<T> + ?Sized,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (**self).equals(a, b)
    }

    fn hash(&self, value: &T) -> u64 {
        (**self).hash(value)
    }
}

impl<T, P> EqualityPolicy<T> for Arc<P>
where
    T: ?Sized,
    P: EqualityPolicy<T> + ?Sized,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        (**self).equals(a, b)
    }

    fn hash(&self, value: &T) -> u64 {
        (**self).hash(value)
    }
}

/// Value equality under `policy`
pub fn values_equal<T, P>(policy: &P, a: &T, b: &T) -> bool
where
    T: ?Sized,
    P: EqualityPolicy<T> + ?Sized,
{
    policy.equals(a, b)
}

/// Identity check: true only when both references point at the same value
pub fn same_instance<T: ?Sized>(a: &T, b: &T) -> bool {
    std::ptr::eq(a, b)
}

/// Identity check for shared values: true only for clones of one allocation
pub fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Fails with `PolicyMismatch` when `a` and `b` are equal but hash differently
pub fn verify_contract<T, P>(policy: &P, a: &T, b: &T) -> SeqResult<()>
where
    T: ?Sized,
    P: EqualityPolicy<T> + ?Sized,
{
    if !policy.equals(a, b) {
        return Ok(());
    }
    let (left_hash, right_hash) = (policy.hash(a), policy.hash(b));
    if left_hash != right_hash {
        return Err(SeqError::PolicyMismatch {
            left_hash,
            right_hash,
        });
    }
    Ok(())
}
