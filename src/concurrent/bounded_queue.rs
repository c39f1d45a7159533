//! Move-friendly multi-producer, multi-consumer bounded FIFO (spec.md
//! §4.11), grounded on
//! `original_source/include/povu/common/bounded_concurrent_queue.hpp`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct BoundedQueue<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "bounded queue capacity must be at least 1");
        Self {
            capacity,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Blocks while full and not closed. Returns `false` without enqueuing
    /// if the queue is closed.
    pub fn push(&self, value: T) -> bool {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if guard.closed {
                return false;
            }
            if guard.items.len() < self.capacity {
                guard.items.push_back(value);
                self.not_empty.notify_one();
                return true;
            }
            guard = self.not_full.wait(guard).unwrap();
        }
    }

    /// Blocks while empty and not closed. Returns `None` once closed and
    /// drained.
    pub fn pop(&self) -> Option<T> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if let Some(v) = guard.items.pop_front() {
                self.not_full.notify_one();
                return Some(v);
            }
            if guard.closed {
                return None;
            }
            guard = self.not_empty.wait(guard).unwrap();
        }
    }

    /// Wakes all waiters and disables further `push`. Idempotent.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_single_producer_consumer() {
        let q = Arc::new(BoundedQueue::new(4));
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for i in 0..20 {
                    assert!(q.push(i));
                }
                q.close();
            })
        };
        let mut popped = Vec::new();
        while let Some(v) = q.pop() {
            popped.push(v);
        }
        producer.join().unwrap();
        assert_eq!(popped, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn push_after_close_fails_and_pop_drains_then_none() {
        let q: BoundedQueue<u32> = BoundedQueue::new(2);
        assert!(q.push(1));
        q.close();
        assert!(!q.push(2));
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let q: BoundedQueue<u32> = BoundedQueue::new(1);
        q.close();
        q.close();
        assert!(q.is_closed());
    }
}
