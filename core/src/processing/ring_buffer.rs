use std::collections::VecDeque;

/// Bounded FIFO of samples that evicts the oldest value once full.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RingBuffer {
    /// Storage grows with the pushed values, not with `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: VecDeque::new(),
            capacity,
        }
    }

    /// Appends a value, evicting the oldest beyond capacity. A zero-capacity
    /// buffer stores nothing.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        while self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Changes the capacity, keeping only the most recent values that still fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.values.len() > capacity {
            self.values.pop_front();
        }
        self.capacity = capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// The newest `count` values, oldest first.
    pub fn latest(&self, count: usize) -> Vec<f64> {
        let skip = self.values.len().saturating_sub(count);
        self.values.iter().skip(skip).copied().collect()
    }
}
