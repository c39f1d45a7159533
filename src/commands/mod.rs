//! Subcommand implementations (spec.md §6.1), grounded on the teacher's
//! per-subcommand split in `commands.rs`.

pub mod call;
pub mod decompose;
pub mod gfa2vcf;
pub mod info;

use std::fs;
use std::path::{Path, PathBuf};

use gfa::gfa::GFA;
use gfa::optfields::OptionalFields;
use gfa::parser::GFAParser;

use crate::error::{PovuError, Result};
use crate::graph::bidirected::VariationGraph;
use crate::io::from_gfa;

/// Parses a GFA1 file and builds the core's `VariationGraph` (spec.md
/// §6.3), grounded on `commands.rs`'s `load_gfa` helper.
pub fn load_graph(path: &Path) -> Result<VariationGraph> {
    let parser = GFAParser::new();
    let gfa: GFA<usize, OptionalFields> = parser
        .parse_file(path)
        .map_err(|e| PovuError::Input(format!("failed to parse GFA {}: {}", path.display(), e)))?;
    from_gfa(&gfa)
}

/// Reads every `.pvst` file under `dir`, in directory order.
pub fn load_forest(dir: &Path) -> Result<Vec<crate::pvst::Pvst>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(PovuError::Io)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "pvst").unwrap_or(false))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|p| {
            let text = fs::read_to_string(p).map_err(PovuError::Io)?;
            crate::pvst::io::parse_pvst(&text)
        })
        .collect()
}

/// The reference tags named by whichever of `--prefix-list`/`--path-prefix`/
/// positional `<refs...>` was supplied (XOR-enforced, spec.md §6.1).
pub fn resolve_ref_source(
    prefix_list: &Option<PathBuf>,
    path_prefixes: &[String],
    positional_refs: &[String],
) -> Result<Vec<String>> {
    let supplied = [
        prefix_list.is_some(),
        !path_prefixes.is_empty(),
        !positional_refs.is_empty(),
    ]
    .iter()
    .filter(|&&b| b)
    .count();

    if supplied != 1 {
        return Err(PovuError::Input(
            "exactly one of --prefix-list, --path-prefix, or positional <refs...> is required"
                .into(),
        ));
    }

    if let Some(path) = prefix_list {
        let text = fs::read_to_string(path).map_err(PovuError::Io)?;
        Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    } else if !path_prefixes.is_empty() {
        Ok(path_prefixes.to_vec())
    } else {
        Ok(positional_refs.to_vec())
    }
}

/// The set of ref ids whose tag starts with one of `prefixes`.
pub fn matching_ref_ids(graph: &VariationGraph, prefixes: &[String]) -> Vec<u32> {
    graph
        .refs()
        .iter()
        .filter(|r| prefixes.iter().any(|p| r.tag().starts_with(p.as_str())))
        .map(|r| r.id())
        .collect()
}
