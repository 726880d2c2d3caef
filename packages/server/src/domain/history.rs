//! Fixed-capacity circular history of broadcast lines.

use super::line::ChatLine;

/// Ring buffer keeping the most recent `capacity` lines.
///
/// `insert` is O(1) and overwrites the oldest slot once the buffer is full.
/// The buffer never grows after construction.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T = ChatLine> {
    slots: Vec<Option<T>>,
    /// Index of the slot the next insert writes to
    cursor: usize,
    /// Number of occupied slots, saturating at capacity
    len: usize,
}

impl<T: AsRef<[u8]>> HistoryBuffer<T> {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            cursor: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of lines currently retained
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a line, evicting the oldest one when full.
    pub fn insert(&mut self, line: T) {
        let capacity = self.capacity();
        self.slots[self.cursor] = Some(line);
        self.cursor = (self.cursor + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Iterate over the most recent `n` lines, oldest first.
    ///
    /// `n` is clamped to the number of lines present (and so to capacity).
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        let capacity = self.capacity();
        let n = n.min(self.len);
        let start = (self.cursor + capacity - n) % capacity;
        (0..n).filter_map(move |offset| self.slots[(start + offset) % capacity].as_ref())
    }

    /// Concatenation of the most recent `n` lines in chronological order.
    pub fn messages(&self, n: usize) -> Vec<u8> {
        self.recent(n).fold(Vec::new(), |mut out, line| {
            out.extend_from_slice(line.as_ref());
            out
        })
    }
}
