//! Fixed-size worker pool plus a task group for joining a batch of tasks and
//! rethrowing the first failure (spec.md §4.12), grounded on
//! `original_source/include/povu/common/thread_pool.hpp`.

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::concurrent::bounded_queue::BoundedQueue;
use crate::error::{PovuError, Result};

type Job = Box<dyn FnOnce() + Send>;

/// Internal job queue depth; workers pull from this independently of any
/// RoV-processing queue the caller builds on top.
const JOB_QUEUE_CAPACITY: usize = 4096;

pub struct ThreadPool {
    queue: Arc<BoundedQueue<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(n_threads: usize) -> Self {
        let queue: Arc<BoundedQueue<Job>> = Arc::new(BoundedQueue::new(JOB_QUEUE_CAPACITY));
        let handles = (0..n_threads.max(1))
            .map(|_| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    while let Some(job) = q.pop() {
                        job();
                    }
                })
            })
            .collect();
        Self { queue, handles }
    }

    /// Fire-and-forget.
    pub fn enqueue<F: FnOnce() + Send + 'static>(&self, f: F) {
        self.queue.push(Box::new(f));
    }

    /// Result-returning; `.wait()` blocks for the value.
    pub fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        self.enqueue(move || {
            let _ = tx.send(f());
        });
        TaskHandle { rx }
    }

    /// Closes the job queue and joins every worker. Jobs already queued
    /// still run; `enqueue`/`submit` after this silently drop the job
    /// (closed `BoundedQueue::push` returns `false`).
    pub fn shutdown(mut self) {
        self.queue.close();
        for h in self.handles.drain(..) {
            let _ = h.join();
        }
    }
}

pub struct TaskHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub fn wait(self) -> T {
        self.rx.recv().expect("worker dropped its result sender")
    }
}

/// Tracks an outstanding count across a batch of tasks submitted to a
/// `ThreadPool`; `wait()` rethrows the first captured error, discarding the
/// rest (spec.md §4.12).
pub struct TaskGroup {
    outstanding: Mutex<usize>,
    cv: Condvar,
    first_error: Mutex<Option<String>>,
}

impl TaskGroup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outstanding: Mutex::new(0),
            cv: Condvar::new(),
            first_error: Mutex::new(None),
        })
    }

    pub fn enqueue<F>(self: &Arc<Self>, pool: &ThreadPool, f: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        *self.outstanding.lock().unwrap() += 1;
        let group = Arc::clone(self);
        pool.enqueue(move || {
            if let Err(e) = f() {
                let mut first = group.first_error.lock().unwrap();
                if first.is_none() {
                    *first = Some(e.to_string());
                }
            }
            let mut n = group.outstanding.lock().unwrap();
            *n -= 1;
            if *n == 0 {
                group.cv.notify_all();
            }
        });
    }

    pub fn wait(&self) -> Result<()> {
        let mut n = self.outstanding.lock().unwrap();
        while *n > 0 {
            n = self.cv.wait(n).unwrap();
        }
        drop(n);
        match self.first_error.lock().unwrap().take() {
            Some(msg) => Err(PovuError::Transient(msg)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn submit_returns_computed_value() {
        let pool = ThreadPool::new(2);
        let handle = pool.submit(|| 2 + 2);
        assert_eq!(handle.wait(), 4);
        pool.shutdown();
    }

    #[test]
    fn task_group_collects_first_error_and_waits_for_all() {
        let pool = ThreadPool::new(2);
        let group = TaskGroup::new();
        let completed = Arc::new(AtomicUsize::new(0));

        for i in 0..5 {
            let completed = Arc::clone(&completed);
            group.enqueue(&pool, move || {
                completed.fetch_add(1, Ordering::SeqCst);
                if i == 2 {
                    Err(PovuError::Transient("boom".into()))
                } else {
                    Ok(())
                }
            });
        }

        let result = group.wait();
        assert_eq!(completed.load(Ordering::SeqCst), 5);
        assert!(result.is_err());
        pool.shutdown();
    }
}
