//! Growable/shrinkable ring-buffer deque used as the dispatch work queue.
//!
//! Capacity is always a power of two so index arithmetic wraps with a mask.
//! A push into a full buffer doubles the capacity; a pop that leaves the
//! buffer less than a quarter full halves it, never going below
//! [`MIN_CAPACITY`]. The deque does no locking of its own: callers serialize
//! access themselves.

use std::fmt;

/// Smallest capacity the buffer ever shrinks to.
pub const MIN_CAPACITY: usize = 4;

pub struct RingDeque<T> {
    buf: Vec<Option<T>>,
    /// Slot of the first element.
    front: usize,
    len: usize,
}

impl<T> RingDeque<T> {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Create a deque able to hold at least `capacity` items before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            buf: Self::empty_slots(capacity),
            front: 0,
            len: 0,
        }
    }

    fn empty_slots(capacity: usize) -> Vec<Option<T>> {
        std::iter::repeat_with(|| None).take(capacity).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buf.len() - 1
    }

    /// Physical slot of the `offset`-th element from the front.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.front + offset) & self.mask()
    }

    fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    fn is_sparse(&self) -> bool {
        self.len > 1 && self.len < self.buf.len() / 4 && self.buf.len() / 2 >= MIN_CAPACITY
    }

    /// Move every element into a fresh buffer of `capacity` slots, front at slot 0.
    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity.is_power_of_two() && capacity >= self.len);
        let mut adjusted = Self::empty_slots(capacity);
        for (i, slot) in adjusted.iter_mut().take(self.len).enumerate() {
            let from = self.slot(i);
            *slot = self.buf[from].take();
        }
        self.buf = adjusted;
        self.front = 0;
    }

    fn grow_if_full(&mut self) {
        if self.is_full() {
            self.resize(self.buf.len() * 2);
        }
    }

    fn shrink_if_sparse(&mut self) {
        if self.is_sparse() {
            self.resize(self.buf.len() / 2);
        }
    }

    pub fn push_back(&mut self, value: T) {
        self.grow_if_full();
        let back = self.slot(self.len);
        self.buf[back] = Some(value);
        self.len += 1;
    }

    pub fn push_front(&mut self, value: T) {
        self.grow_if_full();
        self.front = (self.front + self.buf.len() - 1) & self.mask();
        self.buf[self.front] = Some(value);
        self.len += 1;
    }

    /// Remove the oldest element. `None` means the deque is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buf[self.front].take();
        self.front = (self.front + 1) & self.mask();
        self.len -= 1;
        self.shrink_if_sparse();
        value
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let back = self.slot(self.len - 1);
        let value = self.buf[back].take();
        self.len -= 1;
        self.shrink_if_sparse();
        value
    }

    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.buf[self.front].as_ref()
    }

    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.buf[self.slot(self.len - 1)].as_ref()
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.buf[self.slot(i)].as_ref())
    }
}

impl<T> Default for RingDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for RingDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for RingDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T: fmt::Debug> fmt::Debug for RingDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for RingDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}
