pub mod bidirected;
pub mod refs;
pub mod spanning_tree;
pub mod tree_utils;
pub mod two_way_map;

pub use bidirected::{GenotypeLayout, Orientation, SideNId, Step, VEnd, VariationGraph, Walk};
pub use refs::{Ref, RefFormat, RefStep, Refs};
pub use spanning_tree::SpanningTree;
pub use tree_utils::TreeMeta;
