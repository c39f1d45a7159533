//! Builds a `VariationGraph` (with its `Refs`) from a parsed GFA1 graph
//! (spec.md §6.3), grounded on how the segment/link/path fields are used in
//! `variants.rs` and `gaf_convert.rs` (`seg.name`, `seg.sequence`,
//! `link.from_segment`/`to_segment`, `path.iter()`).

use gfa::gfa::{Orientation as GfaOrientation, GFA};
use gfa::optfields::OptFields;

use crate::error::{PovuError, Result};
use crate::graph::bidirected::{Orientation, VEnd, VariationGraph};
use crate::graph::refs::{RefStep, Refs, PANSN_DELIM};

fn conv_orient(o: GfaOrientation) -> Orientation {
    match o {
        GfaOrientation::Forward => Orientation::Fwd,
        GfaOrientation::Backward => Orientation::Rev,
    }
}

/// The end a walk exits a vertex from when stepping in `orientation`
/// (mirrors `variation::rov`'s bidirected walk-direction convention).
fn exit_end(orientation: Orientation) -> VEnd {
    match orientation {
        Orientation::Fwd => VEnd::R,
        Orientation::Rev => VEnd::L,
    }
}

/// The end a walk enters a vertex through when stepping in `orientation`.
fn entry_end(orientation: Orientation) -> VEnd {
    match orientation {
        Orientation::Fwd => VEnd::L,
        Orientation::Rev => VEnd::R,
    }
}

/// Converts a parsed GFA1 document into a `VariationGraph`: one vertex per
/// segment, one edge per link, one `Ref` per path with a per-step locus
/// assigned by walking the path in order (spec.md §6.3).
pub fn from_gfa<T: OptFields>(gfa: &GFA<usize, T>) -> Result<VariationGraph> {
    let mut g = VariationGraph::with_capacity(gfa.segments.len(), gfa.links.len());

    for seg in &gfa.segments {
        g.add_vertex(seg.name as u32, seg.sequence.to_string());
    }

    for link in &gfa.links {
        let v1 = g.v_id_to_idx(link.from_segment as u32).ok_or_else(|| PovuError::Input(
            format!("link references unknown segment {}", link.from_segment),
        ))?;
        let v2 = g.v_id_to_idx(link.to_segment as u32).ok_or_else(|| PovuError::Input(
            format!("link references unknown segment {}", link.to_segment),
        ))?;
        g.add_edge(
            v1,
            exit_end(conv_orient(link.from_orient)),
            v2,
            entry_end(conv_orient(link.to_orient)),
        )?;
    }
    g.recompute_tips();

    let mut refs = Refs::with_capacity(gfa.paths.len());
    for path in &gfa.paths {
        let tag = path.path_name.to_string();
        let ref_id = refs.add_ref(&tag, PANSN_DELIM);

        let mut walk = Vec::new();
        let mut locus = 1u32;
        for (seg_id, orient) in path.iter() {
            let v_id = seg_id as u32;
            let v_idx = g.v_id_to_idx(v_id).ok_or_else(|| PovuError::Input(
                format!("path {} references unknown segment {}", tag, v_id),
            ))?;
            let orientation = conv_orient(orient);
            walk.push(RefStep {
                v_id,
                orientation,
                locus,
            });
            g.set_vtx_ref_idx(v_idx, ref_id, walk.len() - 1);
            locus += g.get_vertex_by_idx(v_idx).get_length();
        }

        let r = refs.get_ref_mut(ref_id);
        r.set_length(locus.saturating_sub(1));
        r.set_walk(walk);
    }

    g.add_all_refs(refs);
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_and_entry_ends_are_orientation_complements() {
        assert_eq!(exit_end(Orientation::Fwd), VEnd::R);
        assert_eq!(exit_end(Orientation::Rev), VEnd::L);
        assert_eq!(entry_end(Orientation::Fwd), VEnd::L);
        assert_eq!(entry_end(Orientation::Rev), VEnd::R);
    }
}
