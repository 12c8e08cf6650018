//! Live, owner-mutable sequence sources
//!
//! A [`LiveSource`] is a growable list with a single owner. Sequences and
//! read-only views taken from it hold a handle to the list rather than a
//! copy, so each traversal sees the list as it is *when the traversal runs*.
//! This is what makes deferred execution observable:
//!
//! ```
//! use seqkit::source::LiveSource;
//!
//! let numbers = LiveSource::from(vec![1, 2, 3, 4, 5]);
//! let evens = numbers.seq().filter(|n| n % 2 == 0);
//! numbers.push(6);
//! assert_eq!(evens.to_vec(), vec![2, 4, 6]);
//! ```
//!
//! Single-threaded only. Mutating the list while a traversal is in progress
//! is allowed but its effect on that traversal is unspecified; no locking is
//! performed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::sequence::Seq;

/// Single-owner growable list that sequences read at traversal time
#[derive(Debug)]
pub struct LiveSource<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Default for LiveSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for LiveSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }
}

impl<T> FromIterator<T> for LiveSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> LiveSource<T> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn push(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) {
        self.items.borrow_mut().extend(items);
    }

    /// Replace the item at `index`; returns the previous item, or `None`
    /// (leaving the list untouched) when out of bounds
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let mut items = self.items.borrow_mut();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, item))
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Copy of the current contents
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }

    /// Read-only view that tracks later mutation by the owner
    pub fn read_only(&self) -> ReadOnlyView<T> {
        ReadOnlyView {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T: Clone + 'static> LiveSource<T> {
    /// Lazy sequence over the list as it stands when each traversal runs
    pub fn seq(&self) -> Seq<'static, T> {
        live_seq(Rc::clone(&self.items))
    }
}

/// Read-only window onto a [`LiveSource`]
///
/// The view cannot mutate the list but is not a snapshot: pushes made through
/// the owning source are visible through it.
#[derive(Debug)]
pub struct ReadOnlyView<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for ReadOnlyView<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> ReadOnlyView<T> {
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }
}

impl<T: Clone + 'static> ReadOnlyView<T> {
    pub fn seq(&self) -> Seq<'static, T> {
        live_seq(Rc::clone(&self.items))
    }
}

// Reads by index so the list is never borrowed across a pull.
fn live_seq<T: Clone + 'static>(items: Rc<RefCell<Vec<T>>>) -> Seq<'static, T> {
    Seq::from_fn(move || {
        let items = Rc::clone(&items);
        let mut index = 0;
        Box::new(std::iter::from_fn(move || {
            let item = items.borrow().get(index).cloned()?;
            index += 1;
            Some(item)
        }))
    })
}
