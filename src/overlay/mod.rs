//! Overlay and allele-slicing layer: mismatch overlays, allele slices,
//! itineraries/expeditions/treks, and the interval tree used to place
//! inversion alternates onto a reference (spec.md §3.7–§3.9, §4.8–§4.9).

pub mod allele;
pub mod interval_tree;
pub mod overlay;

pub use allele::{AlleleSlice, Expedition, Itinerary, Trek, VariantType};
pub use interval_tree::{InsertOutcome, Interval, SliceTree};
pub use overlay::{compute_overlay, StartOverlay};
