//! `.pvst` file format (spec.md §6.2): one line per node, 5 tab-separated
//! columns, grounded on `original_source/include/povu/graph/pvst.hpp`'s
//! on-disk layout.

use std::fmt;

use super::{Family, Pvst, PvstNode, Route, RouteParams, ROOT};
use crate::error::{PovuError, Result};
use crate::graph::bidirected::{Orientation, Step};

pub const PVST_VERSION: &str = "0.0.3";

pub(crate) fn type_char(f: Family) -> char {
    match f {
        Family::Dummy => 'D',
        Family::Flubble => 'F',
        Family::Tiny => 'T',
        Family::Parallel => 'O',
        Family::Concealed => 'C',
        Family::Smothered => 'S',
        Family::Midi => 'M',
    }
}

fn family_from_char(c: char) -> Option<Family> {
    match c {
        'D' => Some(Family::Dummy),
        'F' => Some(Family::Flubble),
        'T' => Some(Family::Tiny),
        'O' => Some(Family::Parallel),
        'C' => Some(Family::Concealed),
        'S' => Some(Family::Smothered),
        'M' => Some(Family::Midi),
        _ => None,
    }
}

/// The node's textual label, e.g. `>1>4` (spec.md §6.2, §3.10: "variant id
/// (the PVST node's textual label)").
pub(crate) fn encode_label(rp: &RouteParams) -> String {
    format!(
        "{}{}",
        rp.left_endpoint.as_str(),
        rp.right_endpoint.as_str()
    )
}

fn parse_step(s: &str) -> Option<Step> {
    let (orient, rest) = s.split_at(1);
    let orientation = match orient {
        ">" => Orientation::Fwd,
        "<" => Orientation::Rev,
        _ => return None,
    };
    let v_id: u32 = rest.parse().ok()?;
    Some(Step::new(v_id, orientation))
}

fn decode_label(label: &str) -> Option<(Step, Step)> {
    let bytes = label.as_bytes();
    let mid = bytes
        .iter()
        .skip(1)
        .position(|&b| b == b'>' || b == b'<')
        .map(|p| p + 1)?;
    let left = parse_step(&label[..mid])?;
    let right = parse_step(&label[mid..])?;
    Some((left, right))
}

fn route_char(r: Route) -> char {
    match r {
        Route::S2e => 'L',
        Route::E2s => 'R',
    }
}

fn route_from_char(c: char) -> Option<Route> {
    match c {
        'L' => Some(Route::S2e),
        'R' => Some(Route::E2s),
        _ => None,
    }
}

/// Serializes `pvst` as `.pvst` text, header line included.
pub fn write_pvst<W: fmt::Write>(pvst: &Pvst, out: &mut W) -> fmt::Result {
    writeln!(out, "H\t{}\t.\t.\t.", PVST_VERSION)?;

    let order = pvst.reachable_nodes();
    let file_id: std::collections::HashMap<usize, usize> =
        order.iter().enumerate().map(|(fid, &idx)| (idx, fid)).collect();

    for (fid, &idx) in order.iter().enumerate() {
        let node: &PvstNode = &pvst.nodes[idx];
        let label = match &node.route_params {
            Some(rp) => encode_label(rp),
            None => ".".to_string(),
        };
        let children = if node.children.is_empty() {
            ".".to_string()
        } else {
            node.children
                .iter()
                .map(|c| file_id[c].to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        let route = match &node.route_params {
            Some(rp) => route_char(rp.route).to_string(),
            None => ".".to_string(),
        };
        writeln!(out, "{}\t{}\t{}\t{}\t{}", type_char(node.family), fid, label, children, route)?;
    }
    Ok(())
}

/// Parses `.pvst` text back into a `Pvst`.
pub fn parse_pvst(text: &str) -> Result<Pvst> {
    let mut lines = text.lines().filter(|l| !l.is_empty());
    let header = lines.next().ok_or_else(|| PovuError::Input("empty .pvst file".into()))?;
    let hcols: Vec<&str> = header.split('\t').collect();
    if hcols.len() != 5 || hcols[0] != "H" {
        return Err(PovuError::Input("missing .pvst header record".into()));
    }
    if hcols[1] != PVST_VERSION {
        return Err(PovuError::Input(format!(
            "unsupported .pvst version {} (expected {})",
            hcols[1], PVST_VERSION
        )));
    }

    struct Raw {
        family: Family,
        label: String,
        children: String,
        route: String,
    }
    let mut raws: Vec<Raw> = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 5 {
            return Err(PovuError::Input(format!("malformed .pvst record: {}", line)));
        }
        let family = family_from_char(cols[0].chars().next().unwrap_or(' '))
            .ok_or_else(|| PovuError::Input(format!("unknown .pvst type char: {}", cols[0])))?;
        raws.push(Raw {
            family,
            label: cols[2].to_string(),
            children: cols[3].to_string(),
            route: cols[4].to_string(),
        });
    }
    if raws.is_empty() || raws[0].family != Family::Dummy {
        return Err(PovuError::Input("first .pvst record must be the dummy root".into()));
    }

    let mut pvst = Pvst::new();
    // raws are in file-node-id order (0 = dummy, matching `ROOT`). Build
    // nodes first, link children after, since a child's record may precede
    // or follow its parent's in principle (the writer emits parents first,
    // but the format doesn't require it).
    for raw in raws.iter().skip(1) {
        let (left, right) = decode_label(&raw.label)
            .ok_or_else(|| PovuError::Input(format!("bad .pvst label: {}", raw.label)))?;
        let route = route_from_char(raw.route.chars().next().unwrap_or('.'))
            .ok_or_else(|| PovuError::Input(format!("bad .pvst route: {}", raw.route)))?;
        pvst.nodes.push(PvstNode {
            family: raw.family,
            route_params: Some(RouteParams {
                left_endpoint: left,
                right_endpoint: right,
                route,
            }),
            parent: None,
            children: Vec::new(),
            height: 0,
        });
    }

    for (fid, raw) in raws.iter().enumerate() {
        if raw.children == "." {
            continue;
        }
        for child_str in raw.children.split(',') {
            let child_fid: usize = child_str
                .parse()
                .map_err(|_| PovuError::Input(format!("bad child id: {}", child_str)))?;
            if child_fid >= pvst.nodes.len() {
                return Err(PovuError::InvariantViolation {
                    subsystem: "pvst::io".into(),
                    message: format!("child id {} out of range", child_fid),
                });
            }
            pvst.nodes[child_fid].parent = Some(fid);
            pvst.nodes[fid].children.push(child_fid);
        }
    }

    pvst.compute_heights();
    Ok(pvst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_single_flubble() {
        let mut pvst = Pvst::new();
        pvst.add_node(
            Family::Tiny,
            RouteParams {
                left_endpoint: Step::new(1, Orientation::Fwd),
                right_endpoint: Step::new(4, Orientation::Fwd),
                route: Route::S2e,
            },
            ROOT,
        );
        pvst.compute_heights();

        let mut s = String::new();
        write_pvst(&pvst, &mut s).unwrap();
        assert!(s.starts_with("H\t0.0.3\t.\t.\t.\n"));

        let parsed = parse_pvst(&s).unwrap();
        assert_eq!(parsed.nodes.len(), 2);
        assert_eq!(parsed.nodes[1].family, Family::Tiny);
        let rp = parsed.nodes[1].route_params.unwrap();
        assert_eq!(rp.left_endpoint.v_id, 1);
        assert_eq!(rp.right_endpoint.v_id, 4);
    }

    #[test]
    fn rejects_wrong_version() {
        let bad = "H\t0.2\t.\t.\t.\n";
        assert!(parse_pvst(bad).is_err());
    }
}
