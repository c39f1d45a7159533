//! Input adapters (spec.md §6.3).

pub mod from_gfa;

pub use from_gfa::from_gfa;
