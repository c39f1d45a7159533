//! RoV generation, vertex ordering and untangling (spec.md §3.6, §4.5–§4.7).

pub mod depth_matrix;
pub mod flanks;
pub mod rov;
pub mod sorted_vertices;

pub use depth_matrix::{build_depth_matrix, reconstruct_race, AlignOp, Cell, DepthMatrix};
pub use flanks::find_flanks;
pub use rov::{build_rovs, enumerate_walks, Rov, MAX_FLUBBLE_STEPS, MAX_UNBLOCK_CTR};
pub use sorted_vertices::sort_vertices;

use crate::error::PovuWarning;
use crate::graph::bidirected::VariationGraph;

/// Finishes an RoV's derived fields (sorted vertices, flanks) in place,
/// then builds its depth matrix (spec.md §4.6–§4.7).
pub fn finish_rov(rov: &mut Rov, source_id: u32) -> DepthMatrix {
    rov.sorted_vertices = sort_vertices(source_id, &rov.walks);
    rov.flanks = find_flanks(&rov.walks);
    build_depth_matrix(&rov.sorted_vertices, &rov.walks)
}

/// Builds and finishes every RoV for `graph`'s PVST (spec.md §4.5–§4.7).
pub fn process_rovs(
    pvst: &crate::pvst::Pvst,
    graph: &VariationGraph,
    warnings: &mut Vec<PovuWarning>,
) -> Vec<(Rov, DepthMatrix)> {
    build_rovs(pvst, graph, warnings)
        .into_iter()
        .map(|mut rov| {
            let source_id = rov.walks[0][0].v_id;
            let dm = finish_rov(&mut rov, source_id);
            (rov, dm)
        })
        .collect()
}
