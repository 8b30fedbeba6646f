//! Bounded experience replay.

use std::collections::{vec_deque, VecDeque};

use rand::{seq::index, Rng};

use crate::{NWinsError, Result};

/// Fixed-capacity FIFO buffer with uniform batch sampling
///
/// Once the buffer is full, every push evicts the oldest entry.
///
/// # Example
///
/// ```
/// use nwins::ReplayBuffer;
///
/// let mut buffer = ReplayBuffer::new(2).unwrap();
/// buffer.push(1);
/// buffer.push(2);
/// buffer.push(3);
/// assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> ReplayBuffer<T> {
    /// Creates an empty buffer
    ///
    /// Fails with [`NWinsError::InvalidArgument`] for a capacity of zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(NWinsError::InvalidArgument(
                "replay buffer capacity must be positive".to_string(),
            ));
        }
        Ok(ReplayBuffer {
            capacity,
            items: VecDeque::with_capacity(capacity),
        })
    }

    /// Appends an item, evicting the oldest one when the buffer is full
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Returns up to `batch_size` distinct entries drawn uniformly without
    /// replacement
    ///
    /// Asking for more entries than the buffer holds returns all of them in
    /// random order.
    pub fn rand_batch<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&T> {
        let amount = batch_size.min(self.items.len());
        index::sample(rng, self.items.len(), amount)
            .into_iter()
            .map(|i| &self.items[i])
            .collect()
    }

    /// Returns the number of stored items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the maximum number of items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from the oldest to the newest item
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Removes all items
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Extend<T> for ReplayBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a ReplayBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
