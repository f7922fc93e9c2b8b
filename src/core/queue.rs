use std::collections::VecDeque;
use std::error::Error;
use std::fmt;

/// Rejection from a full queue, carrying the element back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bounded queue at capacity")
    }
}

impl<T: fmt::Debug> Error for QueueFull<T> {}

/// Bounded FIFO with non-blocking try semantics. Enqueue past capacity and
/// dequeue from empty both return immediately with a signal instead of
/// waiting, so no caller can stall the simulation loop.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn try_enqueue(&mut self, item: T) -> Result<(), QueueFull<T>> {
        if self.items.len() == self.capacity {
            return Err(QueueFull(item));
        }
        self.items.push_back(item);
        Ok(())
    }

    pub fn try_dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
