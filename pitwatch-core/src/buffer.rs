//! Fixed-Storage Circular Buffer for Channel Windows
//!
//! ## Overview
//!
//! Each channel keeps its most recent readings in a ring buffer. Storage is
//! an inline array sized by the const generic `N`; the *logical* capacity is
//! chosen at runtime (the channel's window size) and may be anything from 1
//! to `N`. That way the smoker (5 readings) and the food probes (20 readings)
//! share one concrete type and one code path.
//!
//! ```text
//! CircularBuffer<8> with capacity 5, after 7 pushes (v0..v6):
//! ┌────┬────┬────┬────┬────┬────┬────┬────┐
//! │ v5 │ v6 │ v2 │ v3 │ v4 │  - │  - │  - │
//! └────┴────┴────┴────┴────┴────┴────┴────┘
//!            ↑
//!            write_pos = 2 (oldest entry, next overwrite)
//!
//! Logical view (oldest → newest): [v2, v3, v4, v5, v6]
//! ```
//!
//! Slots past the capacity are never touched.
//!
//! ## Operations
//!
//! - `push()`: O(1), overwrites the oldest value once full
//! - `last()` / `first()`: O(1)
//! - `iter()` / `to_vec()`: O(len), oldest to newest
//! - `clear()`: O(1)
//!
//! ## Thread Safety
//!
//! Not thread-safe. The window manager wraps every channel's buffer in its
//! own lock.

/// Ring buffer of readings with inline storage for `N` values
#[derive(Clone, Debug)]
pub struct CircularBuffer<const N: usize> {
    /// Inline storage; only the first `capacity` slots are used
    data: [f32; N],

    /// Index where the next write will occur, always `< capacity`
    write_pos: usize,

    /// Number of valid readings, never more than `capacity`
    len: usize,

    /// Logical capacity, `1..=N`
    capacity: usize,
}

impl<const N: usize> CircularBuffer<N> {
    /// Create an empty buffer using the full inline storage
    pub const fn new() -> Self {
        Self::with_capacity(N)
    }

    /// Create an empty buffer holding at most `capacity` readings
    ///
    /// The capacity is clamped to `1..=N`.
    pub const fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            1
        } else if capacity > N {
            N
        } else {
            capacity
        };

        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
            capacity,
        }
    }

    /// Add a reading, evicting the oldest one if the buffer is full
    pub fn push(&mut self, value: f32) {
        self.data[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.capacity;

        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Number of stored readings
    pub fn len(&self) -> usize {
        self.len
    }

    /// Logical capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Most recent reading
    pub fn last(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        self.get(self.len - 1)
    }

    /// Oldest reading
    pub fn first(&self) -> Option<f32> {
        self.get(0)
    }

    /// Iterate over readings from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Copy readings, oldest first, into inline storage
    pub fn to_vec(&self) -> heapless::Vec<f32, N> {
        // len <= capacity <= N, so every push fits
        self.iter().collect()
    }

    /// Drop every reading
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Reading by logical index (0 = oldest, len-1 = newest)
    ///
    /// Until the buffer wraps, logical and physical indices match. After
    /// that the oldest value sits at `write_pos`:
    ///
    /// ```text
    /// Physical: [D, E, A, B, C]  (write_pos = 2)
    /// Logical:  [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % capacity]
    /// ```
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < self.capacity {
            index
        } else {
            (self.write_pos + index) % self.capacity
        };

        Some(self.data[actual_index])
    }
}

/// Iterator over buffer contents, oldest first
pub struct CircularBufferIter<'a, const N: usize> {
    buffer: &'a CircularBuffer<N>,
    index: usize,
}

impl<'a, const N: usize> Iterator for CircularBufferIter<'a, N> {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, const N: usize> ExactSizeIterator for CircularBufferIter<'a, N> {}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
