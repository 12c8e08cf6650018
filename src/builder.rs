//! Immutable lists and their staged builder
//!
//! [`FrozenList`] is an immutable, cheaply clonable list. There are two ways
//! to grow one:
//!
//! - [`FrozenList::with_item`] returns a new list with one more item. Each
//!   call copies the whole list, so adding `n` items this way costs O(n²).
//!   It exists for one-off additions.
//! - [`ImmutableBuilder`] stages appends in a mutable buffer (amortized O(1)
//!   each) and [`ImmutableBuilder::freeze`] produces the list in one
//!   allocation sized to the final count. Use this for bulk construction.
//!
//! ```
//! use seqkit::builder::ImmutableBuilder;
//!
//! let mut builder = ImmutableBuilder::open();
//! for i in 0..1000 {
//!     builder.append(i).unwrap();
//! }
//! let list = builder.freeze().unwrap();
//! assert_eq!(list.len(), 1000);
//! assert!(builder.append(1000).is_err());
//! ```

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::configuration::BufferConfig;
use crate::error::{SeqError, SeqResult};
use crate::sequence::Seq;

/// Immutable list backed by one shared contiguous allocation
#[derive(PartialEq, Eq, Hash)]
pub struct FrozenList<T> {
    items: Arc<[T]>,
}

impl<T> Clone for FrozenList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> FrozenList<T> {
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// New list with `item` appended; `self` is unchanged.
    ///
    /// Copies every existing item: O(n) per call. Prefer
    /// [`ImmutableBuilder`] when adding more than a handful of items.
    pub fn with_item(&self, item: T) -> Self
    where
        T: Clone,
    {
        let mut items = Vec::with_capacity(self.len() + 1);
        items.extend_from_slice(&self.items);
        items.push(item);
        Self::from_vec(items)
    }

    /// Open builder pre-filled with this list's items
    pub fn to_builder(&self) -> ImmutableBuilder<T>
    where
        T: Clone,
    {
        let mut staged = Vec::with_capacity(self.len().max(BufferConfig::default().initial_capacity));
        staged.extend_from_slice(&self.items);
        ImmutableBuilder {
            state: BuilderState::Open(staged),
            config: BufferConfig::default(),
        }
    }

    /// Items as a lazy sequence sharing this list's storage
    pub fn seq<'a>(&self) -> Seq<'a, T>
    where
        T: Clone + 'a,
    {
        Seq::shared(Arc::clone(&self.items))
    }
}

impl<T> Default for FrozenList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for FrozenList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> Index<usize> for FrozenList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> FromIterator<T> for FrozenList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'l, T> IntoIterator for &'l FrozenList<T> {
    type Item = &'l T;
    type IntoIter = std::slice::Iter<'l, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builder lifecycle: `Open` accepts appends, `Frozen` accepts nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    Open,
    Frozen,
}

enum BuilderState<T> {
    Open(Vec<T>),
    Frozen,
}

/// Staging buffer that is frozen once into a [`FrozenList`]
pub struct ImmutableBuilder<T> {
    state: BuilderState<T>,
    config: BufferConfig,
}

impl<T> ImmutableBuilder<T> {
    /// Fresh builder in the `Open` state with the default buffer configuration
    pub fn open() -> Self {
        Self::with_config(BufferConfig::default())
    }

    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            state: BuilderState::Open(Vec::with_capacity(config.initial_capacity)),
            config,
        }
    }

    pub fn phase(&self) -> BuilderPhase {
        match self.state {
            BuilderState::Open(_) => BuilderPhase::Open,
            BuilderState::Frozen => BuilderPhase::Frozen,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.phase() == BuilderPhase::Frozen
    }

    /// Number of staged items; zero once frozen
    pub fn len(&self) -> usize {
        match &self.state {
            BuilderState::Open(staged) => staged.len(),
            BuilderState::Frozen => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage one item. Fails with `ClosedBuilder` after [`freeze`](Self::freeze).
    pub fn append(&mut self, item: T) -> SeqResult<()> {
        let staged = match &mut self.state {
            BuilderState::Open(staged) => staged,
            BuilderState::Frozen => return Err(SeqError::ClosedBuilder),
        };
        if staged.len() == staged.capacity() {
            let target = self.config.growth_strategy.next_capacity(staged.capacity());
            if let Err(err) = staged.try_reserve_exact(target - staged.len()) {
                log::warn!(
                    "Growth to {} slots failed ({}), falling back to amortized growth",
                    target,
                    err
                );
                staged.try_reserve(1)?;
            }
        }
        staged.push(item);
        Ok(())
    }

    /// Stage every item of `items`, stopping at the first failure
    pub fn extend<I>(&mut self, items: I) -> SeqResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().try_for_each(|item| self.append(item))
    }

    /// Move to `Frozen` and return the staged items as an immutable list.
    ///
    /// One-way: later `append`, `extend` or `freeze` calls fail with
    /// `ClosedBuilder`.
    pub fn freeze(&mut self) -> SeqResult<FrozenList<T>> {
        match std::mem::replace(&mut self.state, BuilderState::Frozen) {
            BuilderState::Open(staged) => {
                log::debug!("Freezing builder with {} items", staged.len());
                Ok(FrozenList::from_vec(staged))
            }
            BuilderState::Frozen => Err(SeqError::ClosedBuilder),
        }
    }
}

impl<T> Default for ImmutableBuilder<T> {
    fn default() -> Self {
        Self::open()
    }
}

impl<T> fmt::Debug for ImmutableBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableBuilder")
            .field("phase", &self.phase())
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
