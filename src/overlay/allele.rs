//! Allele slice / itinerary / expedition / trek (spec.md §3.8), grounded on
//! `original_source/include/povu/genomics/allele.hpp`.

use fnv::FnvHashMap;

use crate::graph::bidirected::Orientation;
use crate::variation::AlignOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantType {
    Ins,
    Del,
    Sub,
    Inv,
}

impl VariantType {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantType::Ins => "INS",
            VariantType::Del => "DEL",
            VariantType::Sub => "SUB",
            VariantType::Inv => "INV",
        }
    }
}

/// A contiguous slice of one walk that matches a reference over some span
/// (spec.md §3.8).
#[derive(Debug, Clone)]
pub struct AlleleSlice {
    pub walk_idx: usize,
    pub walk_start: usize,
    pub ref_id: u32,
    pub ref_start: usize,
    pub length: usize,
    pub orientation: Orientation,
    pub variant_type: VariantType,
}

/// Ordered list of allele slices for one reference inside one RoV. A length
/// greater than one on a given reference implies tangling (spec.md §3.8).
#[derive(Debug, Clone, Default)]
pub struct Itinerary {
    pub slices: Vec<AlleleSlice>,
}

impl Itinerary {
    pub fn is_tangled(&self) -> bool {
        self.slices.len() > 1
    }
}

/// Per-RoV collection of one itinerary per reference, plus the tangled flag
/// and the pairwise alignments run when tangled (spec.md §3.8).
#[derive(Debug, Clone, Default)]
pub struct Expedition {
    pub itineraries: FnvHashMap<u32, Itinerary>,
    pub tangled: bool,
    pub pairwise_alignments: FnvHashMap<u32, Vec<AlignOp>>,
    /// walk_idx -> ref_ids that traverse it
    pub walk_to_refs: FnvHashMap<usize, Vec<u32>>,
}

impl Expedition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_slice(&mut self, ref_id: u32, slice: AlleleSlice) {
        let walk_idx = slice.walk_idx;
        self.itineraries.entry(ref_id).or_default().slices.push(slice);
        self.walk_to_refs.entry(walk_idx).or_default().push(ref_id);
        self.tangled = self.itineraries.values().any(|itn| itn.is_tangled());
    }
}

/// Per-RoV context grouping ref expeditions and untangling records (spec.md
/// §3.8).
#[derive(Debug, Clone, Default)]
pub struct Trek {
    pub expedition: Expedition,
    pub untangled: Vec<crate::variation::DepthMatrix>,
}
