//! Region of Variation: walk enumeration between a flubble's endpoints
//! (spec.md §3.6, §4.5), grounded on
//! `original_source/include/povu/genomics/untangle.hpp`'s modified-Johnson
//! walk enumerator.

use fnv::FnvHashSet;

use crate::error::PovuWarning;
use crate::graph::bidirected::{Orientation, Step, VEnd, VariationGraph, Walk};
use crate::pvst::{Pvst, Route, RouteParams};

pub const MAX_FLUBBLE_STEPS: usize = 20;
pub const MAX_UNBLOCK_CTR: usize = 1024;

/// A cycle re-entry detected while walking: the walk index at which the
/// repeated vertex was first seen and the index at which it recurred.
pub type CycleMark = (usize, usize);

#[derive(Debug, Clone)]
pub struct Rov {
    pub pvst_idx: usize,
    pub walks: Vec<Walk>,
    pub cycles: Vec<Vec<CycleMark>>,
    pub sorted_vertices: Vec<u32>,
    pub flanks: Vec<(u32, u32)>,
}

fn exit_end(orientation: Orientation) -> VEnd {
    match orientation {
        Orientation::Fwd => VEnd::R,
        Orientation::Rev => VEnd::L,
    }
}

fn orientation_from_entry(end: VEnd) -> Orientation {
    match end {
        VEnd::L => Orientation::Fwd,
        VEnd::R => Orientation::Rev,
    }
}

struct Frame {
    walk: Walk,
    on_walk: FnvHashSet<u32>,
    cycles: Vec<CycleMark>,
}

/// Enumerates walks from `source` to `sink` (spec.md §4.5). `route` only
/// affects which endpoint is treated as the starting point.
pub fn enumerate_walks(
    graph: &VariationGraph,
    source: Step,
    sink: Step,
    route: Route,
    warnings: &mut Vec<PovuWarning>,
) -> (Vec<Walk>, Vec<Vec<CycleMark>>) {
    let (start, goal) = match route {
        Route::S2e => (source, sink),
        Route::E2s => (sink, source),
    };

    let mut completed_walks = Vec::new();
    let mut completed_cycles = Vec::new();

    let mut start_idx = match graph.v_id_to_idx(start.v_id) {
        Some(i) => i,
        None => return (completed_walks, completed_cycles),
    };
    let _ = &mut start_idx;

    let mut stack: Vec<Frame> = vec![Frame {
        walk: vec![start],
        on_walk: {
            let mut s = FnvHashSet::default();
            s.insert(start.v_id);
            s
        },
        cycles: Vec::new(),
    }];
    let mut total_frames_spawned = 1usize;

    while let Some(frame) = stack.pop() {
        let last = *frame.walk.last().unwrap();
        if last.v_id == goal.v_id && frame.walk.len() > 1 {
            completed_walks.push(frame.walk);
            completed_cycles.push(frame.cycles);
            continue;
        }
        if frame.walk.len() >= MAX_FLUBBLE_STEPS {
            warnings.push(PovuWarning::new(
                "rov::enumerate_walks",
                format!(
                    "dropped a walk at the {}-step cap without reaching the sink",
                    MAX_FLUBBLE_STEPS
                ),
            ));
            continue;
        }

        let v_idx = match graph.v_id_to_idx(last.v_id) {
            Some(i) => i,
            None => continue,
        };
        let end = exit_end(last.orientation);
        let vertex = graph.get_vertex_by_idx(v_idx);
        for &e_idx in vertex.get_edges(end) {
            if total_frames_spawned >= MAX_UNBLOCK_CTR {
                warnings.push(PovuWarning::new(
                    "rov::enumerate_walks",
                    format!("pending-frame cap ({}) reached; dropping new branches", MAX_UNBLOCK_CTR),
                ));
                break;
            }
            let edge = graph.get_edge(e_idx);
            let other = edge.get_other_vtx(v_idx, end);
            let other_id = graph.v_idx_to_id(other.v_id).unwrap();
            let next_orientation = orientation_from_entry(other.v_end);
            let next_step = Step::new(other_id, next_orientation);

            let mut next_walk = frame.walk.clone();
            let mut next_cycles = frame.cycles.clone();
            if frame.on_walk.contains(&other_id) {
                let start_pos = next_walk.iter().position(|s| s.v_id == other_id).unwrap();
                next_cycles.push((start_pos, next_walk.len()));
                continue;
            }
            next_walk.push(next_step);
            let mut next_on_walk = frame.on_walk.clone();
            next_on_walk.insert(other_id);

            stack.push(Frame {
                walk: next_walk,
                on_walk: next_on_walk,
                cycles: next_cycles,
            });
            total_frames_spawned += 1;
        }
    }

    (completed_walks, completed_cycles)
}

/// Builds one RoV per PVST node eligible for one (spec.md §3.6, §4.5):
/// leaves, and flubble-like nodes with no flubble-like children. Nodes
/// yielding zero walks are dropped, per the §4.5 failure mode.
pub fn build_rovs(pvst: &Pvst, graph: &VariationGraph, warnings: &mut Vec<PovuWarning>) -> Vec<Rov> {
    let mut rovs = Vec::new();
    for idx in pvst.rov_eligible_nodes() {
        let rp: RouteParams = match pvst.nodes[idx].route_params {
            Some(rp) => rp,
            None => continue,
        };
        let (walks, cycles) =
            enumerate_walks(graph, rp.left_endpoint, rp.right_endpoint, rp.route, warnings);
        if walks.is_empty() {
            warnings.push(PovuWarning::new(
                "rov::build_rovs",
                format!("pvst node {} produced no walks; RoV discarded", idx),
            ));
            continue;
        }
        rovs.push(Rov {
            pvst_idx: idx,
            walks,
            cycles,
            sorted_vertices: Vec::new(),
            flanks: Vec::new(),
        });
    }
    rovs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::VariationGraph;

    fn snp_bubble() -> VariationGraph {
        let mut g = VariationGraph::new();
        let i1 = g.add_vertex(1, "A");
        let i2 = g.add_vertex(2, "C");
        let i3 = g.add_vertex(3, "G");
        let i4 = g.add_vertex(4, "T");
        g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
        g.add_edge(i1, VEnd::R, i3, VEnd::L).unwrap();
        g.add_edge(i2, VEnd::R, i4, VEnd::L).unwrap();
        g.add_edge(i3, VEnd::R, i4, VEnd::L).unwrap();
        g.recompute_tips();
        g
    }

    #[test]
    fn enumerates_both_branches() {
        let g = snp_bubble();
        let mut warnings = Vec::new();
        let (walks, _) = enumerate_walks(
            &g,
            Step::new(1, Orientation::Fwd),
            Step::new(4, Orientation::Fwd),
            Route::S2e,
            &mut warnings,
        );
        assert_eq!(walks.len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn respects_step_cap() {
        let mut g = VariationGraph::new();
        let mut prev = g.add_vertex(0, "A");
        for i in 1..30u32 {
            let next = g.add_vertex(i, "A");
            g.add_edge(prev, VEnd::R, next, VEnd::L).unwrap();
            prev = next;
        }
        g.recompute_tips();
        let mut warnings = Vec::new();
        let (walks, _) = enumerate_walks(
            &g,
            Step::new(0, Orientation::Fwd),
            Step::new(29, Orientation::Fwd),
            Route::S2e,
            &mut warnings,
        );
        assert!(walks.is_empty());
        assert!(!warnings.is_empty());
    }
}
