use std::collections::BTreeSet;

use crate::consts::NO_ERROR;

/// Synthetic GL errors waiting to be reported ahead of the driver's own.
///
/// Codes are kept as a set and drained smallest first, regardless of the
/// order they were raised in.
#[derive(Debug, Default, Clone)]
pub struct ErrorQueue {
    pending: BTreeSet<u32>,
}

impl ErrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `code`. `NO_ERROR` and already-queued codes are ignored.
    pub fn push(&mut self, code: u32) {
        if code != NO_ERROR {
            self.pending.insert(code);
        }
    }

    /// Removes and returns the smallest queued code.
    pub fn pop(&mut self) -> Option<u32> {
        self.pending.pop_first()
    }

    /// Pops a queued code, or falls back to `driver_error` when empty.
    ///
    /// The fallback is only evaluated when nothing is queued, so live driver
    /// errors stay unconsumed until the synthetic ones drain.
    pub fn next_or_else(&mut self, driver_error: impl FnOnce() -> u32) -> u32 {
        self.pop().unwrap_or_else(driver_error)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{INVALID_ENUM, INVALID_OPERATION};

    #[test]
    fn drains_ascending_then_falls_back() {
        let mut queue = ErrorQueue::new();
        queue.push(5);
        queue.push(2);
        queue.push(9);

        let mut driver = || INVALID_OPERATION;
        assert_eq!(queue.next_or_else(&mut driver), 2);
        assert_eq!(queue.next_or_else(&mut driver), 5);
        assert_eq!(queue.next_or_else(&mut driver), 9);
        assert_eq!(queue.next_or_else(&mut driver), INVALID_OPERATION);
    }

    #[test]
    fn ignores_no_error_and_duplicates() {
        let mut queue = ErrorQueue::new();
        queue.push(NO_ERROR);
        queue.push(INVALID_ENUM);
        queue.push(INVALID_ENUM);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn driver_not_queried_while_queue_non_empty() {
        let mut queue = ErrorQueue::new();
        queue.push(INVALID_ENUM);

        let mut queried = false;
        let code = queue.next_or_else(|| {
            queried = true;
            NO_ERROR
        });
        assert_eq!(code, INVALID_ENUM);
        assert!(!queried);
    }
}
