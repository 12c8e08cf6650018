//! Lazy pipeline operators
//!
//! Every operator here returns a new [`Seq`] that wraps its upstream; no
//! item is read until the result is traversed, and each stage keeps only
//! O(1) state per traversal. The exceptions are the operators that must see
//! a whole input before they can emit anything:
//!
//! - `group_by` drains its upstream on the first pull of each traversal,
//!   because any later item may belong to any key.
//! - `join` and `group_join` drain the *other* (build) side into a key
//!   index at the start of each traversal, then stream the outer side.
//!
//! Output order is always source order: groups appear in first-occurrence
//! order of their key, join rows in outer order and, for one outer item, in
//! build-side order.

use std::hash::Hash;
use std::sync::Arc;

use crate::equality::{EqualityPolicy, StructuralEquality};
use crate::policy_map::{PolicyMap, PolicySet};
use crate::sequence::Seq;

/// A key and the members that share it under the grouping policy
#[derive(Debug, Clone, PartialEq)]
pub struct Group<K, T> {
    key: K,
    members: Arc<[T]>,
}

impl<K, T> Group<K, T> {
    pub fn new(key: K, members: Vec<T>) -> Self {
        Self {
            key,
            members: Arc::from(members),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in source order
    pub fn as_slice(&self) -> &[T] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    /// Members as a lazy sequence
    pub fn members<'b>(&self) -> Seq<'b, T>
    where
        T: Clone + 'b,
    {
        Seq::shared(Arc::clone(&self.members))
    }
}

impl<'a, T: 'a> Seq<'a, T> {
    /// Keep items for which `predicate` holds, in source order
    pub fn filter<F>(&self, predicate: F) -> Seq<'a, T>
    where
        F: Fn(&T) -> bool + 'a,
    {
        let upstream = self.clone();
        let predicate = Arc::new(predicate);
        Seq::from_fn(move || {
            let predicate = Arc::clone(&predicate);
            Box::new(upstream.iter().filter(move |item| predicate(item)))
        })
    }

    /// Transform each item, one output per input
    pub fn map<U, F>(&self, transform: F) -> Seq<'a, U>
    where
        U: 'a,
        F: Fn(T) -> U + 'a,
    {
        let upstream = self.clone();
        let transform = Arc::new(transform);
        Seq::from_fn(move || {
            let transform = Arc::clone(&transform);
            Box::new(upstream.iter().map(move |item| transform(item)))
        })
    }

    /// Slice: take the first `n` items
    pub fn take(&self, n: usize) -> Seq<'a, T> {
        let upstream = self.clone();
        Seq::from_fn(move || Box::new(upstream.iter().take(n)))
    }

    /// Slice: drop the first `n` items
    pub fn skip(&self, n: usize) -> Seq<'a, T> {
        let upstream = self.clone();
        Seq::from_fn(move || Box::new(upstream.iter().skip(n)))
    }

    /// Depth-1 flattening with a result selector
    ///
    /// For each outer item, `to_inner` supplies an inner sequence and every
    /// inner item yields `combine(&outer, inner)`. All of one outer item's
    /// rows come before the next outer item's.
    ///
    /// ```
    /// use seqkit::sequence::Seq;
    ///
    /// let students = Seq::snapshot(vec![("Ana", vec!["C#", "SQL"]), ("Luis", vec!["Java"])]);
    /// let rows = students
    ///     .flat_map(|s| Seq::snapshot(s.1.clone()), |s, course| (s.0, course))
    ///     .to_vec();
    /// assert_eq!(rows, vec![("Ana", "C#"), ("Ana", "SQL"), ("Luis", "Java")]);
    /// ```
    pub fn flat_map<I, O, FI, FC>(&self, to_inner: FI, combine: FC) -> Seq<'a, O>
    where
        I: 'a,
        O: 'a,
        FI: Fn(&T) -> Seq<'a, I> + 'a,
        FC: Fn(&T, I) -> O + 'a,
    {
        let upstream = self.clone();
        let to_inner = Arc::new(to_inner);
        let combine = Arc::new(combine);
        Seq::from_fn(move || {
            let to_inner = Arc::clone(&to_inner);
            let combine = Arc::clone(&combine);
            Box::new(upstream.iter().flat_map(move |outer| {
                let inner = to_inner(&outer);
                let combine = Arc::clone(&combine);
                inner.iter().map(move |item| combine(&outer, item))
            }))
        })
    }

    /// Drop items equal (under the structural policy) to an earlier item
    pub fn distinct(&self) -> Seq<'a, T>
    where
        T: Clone + Eq + Hash,
    {
        self.distinct_with(StructuralEquality)
    }

    /// Drop items equal under `policy` to an earlier item; first occurrence wins
    pub fn distinct_with<P>(&self, policy: P) -> Seq<'a, T>
    where
        T: Clone,
        P: EqualityPolicy<T> + 'a,
    {
        let upstream = self.clone();
        let policy = Arc::new(policy);
        Seq::from_fn(move || {
            let mut seen = PolicySet::new(Arc::clone(&policy));
            Box::new(
                upstream
                    .iter()
                    .filter(move |item| seen.insert_unchecked(item.clone())),
            )
        })
    }

    /// Bucket items by key, one group per distinct key in first-occurrence order
    pub fn group_by<K, KS>(&self, key_selector: KS) -> Seq<'a, Group<K, T>>
    where
        K: Eq + Hash + 'a,
        KS: Fn(&T) -> K + 'a,
    {
        self.group_by_with(key_selector, StructuralEquality)
    }

    /// Like [`Seq::group_by`], with key identity defined by `policy`
    pub fn group_by_with<K, KS, P>(&self, key_selector: KS, policy: P) -> Seq<'a, Group<K, T>>
    where
        K: 'a,
        KS: Fn(&T) -> K + 'a,
        P: EqualityPolicy<K> + 'a,
    {
        let upstream = self.clone();
        let key_selector = Arc::new(key_selector);
        let policy = Arc::new(policy);
        Seq::from_fn(move || {
            let buckets = bucket_by(&upstream, &*key_selector, Arc::clone(&policy));
            log::debug!("group_by produced {} groups", buckets.len());
            Box::new(
                buckets
                    .into_iter()
                    .map(|(key, members)| Group::new(key, members)),
            )
        })
    }

    /// Inner join against `other` on equal keys
    ///
    /// `other` is the build side: it is indexed once per traversal. `self`
    /// is the outer side and is streamed. Each matching pair yields one row;
    /// items without a match on either side yield nothing.
    pub fn join<R, K, O, LK, RK, C>(
        &self,
        other: &Seq<'a, R>,
        left_key: LK,
        right_key: RK,
        combine: C,
    ) -> Seq<'a, O>
    where
        R: 'a,
        K: Eq + Hash + 'a,
        O: 'a,
        LK: Fn(&T) -> K + 'a,
        RK: Fn(&R) -> K + 'a,
        C: Fn(&T, &R) -> O + 'a,
    {
        self.join_with(other, left_key, right_key, combine, StructuralEquality)
    }

    /// Like [`Seq::join`], with key identity defined by `policy`
    pub fn join_with<R, K, O, LK, RK, C, P>(
        &self,
        other: &Seq<'a, R>,
        left_key: LK,
        right_key: RK,
        combine: C,
        policy: P,
    ) -> Seq<'a, O>
    where
        R: 'a,
        K: 'a,
        O: 'a,
        LK: Fn(&T) -> K + 'a,
        RK: Fn(&R) -> K + 'a,
        C: Fn(&T, &R) -> O + 'a,
        P: EqualityPolicy<K> + 'a,
    {
        let outer_side = self.clone();
        let build = other.clone();
        let left_key = Arc::new(left_key);
        let right_key = Arc::new(right_key);
        let combine = Arc::new(combine);
        let policy = Arc::new(policy);
        Seq::from_fn(move || {
            let index = build_lookup(&build, &*right_key, Arc::clone(&policy));
            let no_rows: Arc<[R]> = Arc::from(Vec::new());
            let left_key = Arc::clone(&left_key);
            let combine = Arc::clone(&combine);
            Box::new(outer_side.iter().flat_map(move |outer| {
                let rows = index
                    .get(&left_key(&outer))
                    .map_or_else(|| Arc::clone(&no_rows), Arc::clone);
                let combine = Arc::clone(&combine);
                (0..rows.len()).map(move |i| combine(&outer, &rows[i]))
            }))
        })
    }

    /// Left-preserving join: exactly one output per item of `self`
    ///
    /// `combine` receives each left item with the sequence of its matches
    /// from `other`. A left item with no match still produces a row, paired
    /// with an empty sequence.
    pub fn group_join<R, K, O, LK, RK, C>(
        &self,
        other: &Seq<'a, R>,
        left_key: LK,
        right_key: RK,
        combine: C,
    ) -> Seq<'a, O>
    where
        R: Clone + 'a,
        K: Eq + Hash + 'a,
        O: 'a,
        LK: Fn(&T) -> K + 'a,
        RK: Fn(&R) -> K + 'a,
        C: Fn(T, Seq<'a, R>) -> O + 'a,
    {
        self.group_join_with(other, left_key, right_key, combine, StructuralEquality)
    }

    /// Like [`Seq::group_join`], with key identity defined by `policy`
    pub fn group_join_with<R, K, O, LK, RK, C, P>(
        &self,
        other: &Seq<'a, R>,
        left_key: LK,
        right_key: RK,
        combine: C,
        policy: P,
    ) -> Seq<'a, O>
    where
        R: Clone + 'a,
        K: 'a,
        O: 'a,
        LK: Fn(&T) -> K + 'a,
        RK: Fn(&R) -> K + 'a,
        C: Fn(T, Seq<'a, R>) -> O + 'a,
        P: EqualityPolicy<K> + 'a,
    {
        let outer_side = self.clone();
        let build = other.clone();
        let left_key = Arc::new(left_key);
        let right_key = Arc::new(right_key);
        let combine = Arc::new(combine);
        let policy = Arc::new(policy);
        Seq::from_fn(move || {
            let index = build_lookup(&build, &*right_key, Arc::clone(&policy));
            let left_key = Arc::clone(&left_key);
            let combine = Arc::clone(&combine);
            Box::new(outer_side.iter().map(move |outer| {
                let matches = match index.get(&left_key(&outer)) {
                    Some(rows) => Seq::shared(Arc::clone(rows)),
                    None => Seq::empty(),
                };
                combine(outer, matches)
            }))
        })
    }
}

impl<'a, U: 'a> Seq<'a, Seq<'a, U>> {
    /// Concatenate inner sequences in outer order
    pub fn flatten(&self) -> Seq<'a, U> {
        let upstream = self.clone();
        Seq::from_fn(move || Box::new(upstream.iter().flat_map(|inner| inner.iter())))
    }
}

fn bucket_by<'a, T, K, KS, P>(source: &Seq<'a, T>, key_selector: &KS, policy: P) -> PolicyMap<K, Vec<T>, P>
where
    T: 'a,
    KS: Fn(&T) -> K + ?Sized,
    P: EqualityPolicy<K>,
{
    let mut buckets = PolicyMap::new(policy);
    for item in source.iter() {
        let key = key_selector(&item);
        buckets.get_or_insert_with(key, Vec::new).push(item);
    }
    buckets
}

fn build_lookup<'a, R, K, RK, P>(build: &Seq<'a, R>, right_key: &RK, policy: P) -> PolicyMap<K, Arc<[R]>, P>
where
    R: 'a,
    RK: Fn(&R) -> K + ?Sized,
    P: EqualityPolicy<K>,
{
    let buckets = bucket_by(build, right_key, policy);
    log::trace!("join index built with {} distinct keys", buckets.len());
    buckets.map_values(|rows: Vec<R>| Arc::<[R]>::from(rows))
}
