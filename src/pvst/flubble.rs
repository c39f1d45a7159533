//! Flubble (generic bubble) finding (spec.md §4.3), grounded on
//! `original_source/include/povu/graph/pvst.hpp`'s description of deriving
//! fl_like regions from cycle-equivalence classes.

use fnv::FnvHashSet;

use super::{Pvst, Route, RouteParams, ROOT};
use crate::graph::bidirected::{Orientation, Step, VariationGraph};
use crate::graph::spanning_tree::SpanningTree;

/// One cycle-equivalence class of size >= 2, reduced to the pair of vertex
/// indices that bound its flubble.
struct FlubbleSpan {
    start_idx: u32,
    end_idx: u32,
    depth: u32,
}

/// Picks the two boundary vertices for an equivalence class.
///
/// All tree edges in one class lie on a single root-to-descendant path (a
/// consequence of how the bracket stack propagates up parent chains), so the
/// class spans `[shallowest edge's parent, deepest edge's child]`. When a
/// reference trunk is available, the shallowest and deepest *trunk* vertices
/// touched by the class are preferred over the raw tree-edge endpoints: the
/// trunk is precisely the information the tree-only signature can't recover
/// (see DESIGN.md for the worked example this resolves).
fn span_for_class(
    graph: &VariationGraph,
    st: &SpanningTree,
    class: &[usize],
    trunk: Option<&[Step]>,
) -> FlubbleSpan {
    let mut by_depth: Vec<usize> = class.to_vec();
    by_depth.sort_by_key(|&i| st.pre[st.tree_edges[i].child_idx as usize]);

    let shallow = &st.tree_edges[by_depth[0]];
    let deep = &st.tree_edges[*by_depth.last().unwrap()];
    let mut start_idx = shallow.parent_idx;
    let mut end_idx = deep.child_idx;

    if let Some(trunk) = trunk {
        let touched: FnvHashSet<u32> = class
            .iter()
            .flat_map(|&i| {
                let e = &st.tree_edges[i];
                [e.parent_idx, e.child_idx]
            })
            .collect();
        let trunk_idxs: Vec<u32> = trunk
            .iter()
            .filter_map(|s| graph.v_id_to_idx(s.v_id))
            .filter(|idx| touched.contains(idx))
            .collect();
        if trunk_idxs.len() >= 2 {
            start_idx = trunk_idxs[0];
            end_idx = *trunk_idxs.last().unwrap();
        }
    }

    let depth = st.pre[start_idx as usize].min(st.pre[end_idx as usize]);
    FlubbleSpan {
        start_idx,
        end_idx,
        depth,
    }
}

fn route_params_for(graph: &VariationGraph, span: &FlubbleSpan) -> RouteParams {
    let left_id = graph.v_idx_to_id(span.start_idx).unwrap();
    let right_id = graph.v_idx_to_id(span.end_idx).unwrap();
    RouteParams {
        left_endpoint: Step::new(left_id, Orientation::Fwd),
        right_endpoint: Step::new(right_id, Orientation::Fwd),
        route: Route::S2e,
    }
}

/// Builds the flubble layer of the PVST: one `Flubble` node per
/// cycle-equivalence class of size >= 2, nested under whichever sibling span
/// contains it (spec.md §4.3).
pub fn find_flubbles(graph: &VariationGraph, st: &SpanningTree, trunk: Option<&[Step]>) -> Pvst {
    let mut pvst = Pvst::new();
    let classes = st.equivalence_classes();

    let mut spans: Vec<(FlubbleSpan, &[usize])> = classes
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (span_for_class(graph, st, c, trunk), c.as_slice()))
        .collect();

    // Outermost (shallowest, widest) first so parents are created before
    // their nested children.
    spans.sort_by_key(|(s, _)| s.depth);

    let mut node_for_span: Vec<usize> = Vec::with_capacity(spans.len());
    for (span, _) in &spans {
        let parent = node_for_span
            .iter()
            .rev()
            .find(|&&p| {
                let rp = pvst.nodes[p].route_params.unwrap();
                let p_start = graph.v_id_to_idx(rp.left_endpoint.v_id).unwrap();
                let p_end = graph.v_id_to_idx(rp.right_endpoint.v_id).unwrap();
                st.pre[p_start as usize] <= st.pre[span.start_idx as usize]
                    && st.post[p_end as usize] >= st.post[span.end_idx as usize]
                    && !(p_start == span.start_idx && p_end == span.end_idx)
            })
            .copied()
            .unwrap_or(ROOT);

        let rp = route_params_for(graph, span);
        let idx = pvst.add_node(super::Family::Flubble, rp, parent);
        node_for_span.push(idx);
    }

    pvst.compute_heights();
    pvst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::bidirected::VEnd;

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
    fn trunk_disambiguates_boundary_to_one_four() {
        let g = snp_bubble();
        let trunk = [
            Step::new(1, Orientation::Fwd),
            Step::new(2, Orientation::Fwd),
            Step::new(4, Orientation::Fwd),
        ];
        let st = SpanningTree::build(&g, Some(&trunk)).unwrap();
        let pvst = find_flubbles(&g, &st, Some(&trunk));
        assert!(pvst.nodes.len() >= 2);
        let f = &pvst.nodes[1];
        let rp = f.route_params.unwrap();
        assert_eq!(rp.left_endpoint.v_id, 1);
        assert_eq!(rp.right_endpoint.v_id, 4);
    }

    #[test]
    fn no_flubble_for_acyclic_chain() {
        let mut g = VariationGraph::new();
        let i1 = g.add_vertex(1, "A");
        let i2 = g.add_vertex(2, "C");
        g.add_edge(i1, VEnd::R, i2, VEnd::L).unwrap();
        g.recompute_tips();
        let st = SpanningTree::build(&g, None).unwrap();
        let pvst = find_flubbles(&g, &st, None);
        assert_eq!(pvst.nodes.len(), 1);
    }
}
