//! Lazy, re-evaluable sequences
//!
//! A [`Seq`] is a *description* of how to produce items, not the items
//! themselves. Every traversal ([`Seq::iter`]) runs the production logic from
//! the beginning and hands back a fresh pull cursor; nothing is cached
//! between traversals. Operators (see [`crate::pipeline`]) wrap an upstream
//! `Seq` instead of copying it, so building a pipeline does no work.
//!
//! Whether two traversals agree depends on the source: a range or an owned
//! snapshot is deterministic, a [`crate::source::LiveSource`] reflects the
//! owner's list as it is at traversal time.

use std::fmt;
use std::sync::Arc;

/// Pull cursor for one traversal of a [`Seq`]
pub type Cursor<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// A lazy sequence of `T` that can be traversed any number of times
pub struct Seq<'a, T> {
    produce: Arc<dyn Fn() -> Cursor<'a, T> + 'a>,
}

impl<'a, T> Clone for Seq<'a, T> {
    fn clone(&self) -> Self {
        Seq {
            produce: Arc::clone(&self.produce),
        }
    }
}

impl<'a, T> fmt::Debug for Seq<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seq").finish_non_exhaustive()
    }
}

impl<'a, T: 'a> Seq<'a, T> {
    /// Sequence whose traversals are produced by `produce`
    pub fn from_fn<F>(produce: F) -> Self
    where
        F: Fn() -> Cursor<'a, T> + 'a,
    {
        Seq {
            produce: Arc::new(produce),
        }
    }

    /// Sequence that calls `factory` once per traversal
    pub fn from_factory<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::from_fn(move || Box::new(factory().into_iter()))
    }

    /// Start a new traversal
    pub fn iter(&self) -> Cursor<'a, T> {
        (self.produce)()
    }

    /// Create an empty sequence
    pub fn empty() -> Self {
        Self::from_fn(|| Box::new(std::iter::empty()))
    }

    /// Emit a single item
    pub fn once(item: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(move || Box::new(std::iter::once(item.clone())))
    }

    /// Repeat a value indefinitely
    pub fn repeat(item: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(move || Box::new(std::iter::repeat(item.clone())))
    }

    /// Clone `iterable` at the start of each traversal and walk the clone
    ///
    /// Cheap for ranges and other small iterator values; for owned
    /// collections prefer [`Seq::snapshot`], which shares one buffer.
    pub fn from_cloned<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + 'a,
        I::IntoIter: 'a,
    {
        Self::from_factory(move || iterable.clone())
    }

    /// Generate a sequence from a seed and a step function
    ///
    /// The step produces an item and the next state; the sequence ends when
    /// it returns `None`. Each traversal restarts from `init`.
    ///
    /// ```
    /// use seqkit::sequence::Seq;
    ///
    /// let fibonacci = Seq::unfold((0u64, 1u64), |(a, b)| Some((a, (b, a + b))));
    /// assert_eq!(fibonacci.take(10).to_vec(), vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
    /// ```
    pub fn unfold<S, F>(init: S, step: F) -> Self
    where
        S: Clone + 'a,
        F: Fn(S) -> Option<(T, S)> + 'a,
    {
        let step = Arc::new(step);
        Self::from_fn(move || {
            let step = Arc::clone(&step);
            let mut state = Some(init.clone());
            Box::new(std::iter::from_fn(move || {
                let (item, next) = step(state.take()?)?;
                state = Some(next);
                Some(item)
            }))
        })
    }

    /// Items of a shared, immutable buffer, cloned out one at a time
    pub fn shared(items: Arc<[T]>) -> Self
    where
        T: Clone,
    {
        Self::from_fn(move || {
            let items = Arc::clone(&items);
            Box::new((0..items.len()).map(move |i| items[i].clone()))
        })
    }

    /// Take ownership of `items` as a fixed snapshot
    pub fn snapshot(items: Vec<T>) -> Self
    where
        T: Clone,
    {
        Self::shared(Arc::from(items))
    }
}

impl<'a, T: 'a> Seq<'a, &'a T> {
    /// Borrow a slice without copying; yields references into it
    pub fn borrowed(items: &'a [T]) -> Self {
        Self::from_fn(move || Box::new(items.iter()))
    }
}

impl<'a> Seq<'a, i64> {
    /// `count` consecutive integers starting at `start`
    pub fn range(start: i64, count: usize) -> Self {
        let end = i64::try_from(count).map_or(i64::MAX, |count| start.saturating_add(count));
        Self::from_cloned(start..end)
    }
}

impl<'a, 's, T: 'a> IntoIterator for &'s Seq<'a, T> {
    type Item = T;
    type IntoIter = Cursor<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
