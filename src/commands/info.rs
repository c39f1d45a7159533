//! `info`: graph statistics (spec.md §6.1), grounded on `edges.rs`'s
//! per-vertex degree report.

use std::path::PathBuf;

use structopt::StructOpt;

use crate::error::Result;
use crate::graph::VEnd;

#[derive(StructOpt, Debug)]
pub struct InfoArgs {
    #[structopt(short = "i", long = "input-gfa", parse(from_os_str))]
    pub input_gfa: PathBuf,

    #[structopt(short = "t", long = "print_tips")]
    pub print_tips: bool,
}

pub fn info(args: &InfoArgs) -> Result<()> {
    let graph = super::load_graph(&args.input_gfa)?;

    println!("vertices\t{}", graph.vtx_count());
    println!("edges\t{}", graph.edge_count());
    println!("refs\t{}", graph.refs().ref_count());
    println!("components\t{}", graph.componetize().len());

    if args.print_tips {
        println!("tips");
        for t in graph.tips() {
            let end = match t.v_end {
                VEnd::L => "L",
                VEnd::R => "R",
            };
            println!("{}\t{}", t.v_id, end);
        }
    }

    Ok(())
}
