//! Bounded queue and thread pool used by the variant-calling pipeline
//! (spec.md §4.11, §4.12, §5).

pub mod bounded_queue;
pub mod thread_pool;

pub use bounded_queue::BoundedQueue;
pub use thread_pool::{TaskGroup, TaskHandle, ThreadPool};
