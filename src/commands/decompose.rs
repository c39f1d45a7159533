//! `decompose`: GFA → PVST files, one per connected component (spec.md
//! §4.2–§4.4, §5 "PVST decomposition parallelises per connected component").

use std::fs;
use std::path::PathBuf;

use structopt::clap::AppSettings;
use structopt::StructOpt;

use crate::concurrent::ThreadPool;
use crate::error::{PovuError, Result};
use crate::graph::{SpanningTree, Step};
use crate::pvst::{flubble, subflubbles};

/// `-h` is claimed by `--hairpins`; clap's auto `-h/--help` is disabled on
/// this subcommand (the top-level `povu --help` still works).
#[derive(StructOpt, Debug)]
#[structopt(setting = AppSettings::DisableHelpFlags)]
pub struct DecomposeArgs {
    #[structopt(short = "i", long = "input-gfa", parse(from_os_str))]
    pub input_gfa: PathBuf,

    #[structopt(short = "o", long = "output-dir", parse(from_os_str))]
    pub output_dir: PathBuf,

    #[structopt(short = "h", long = "hairpins")]
    pub hairpins: bool,

    #[structopt(short = "s", long = "subflubbles")]
    pub subflubbles: bool,
}

/// Each component's own trunk: the first reference's walk that enters it,
/// or `None` if the component carries no reference.
fn pick_trunk(component: &crate::graph::VariationGraph) -> Option<Vec<Step>> {
    component
        .refs()
        .iter()
        .next()
        .map(|r| r.walk().iter().map(|s| s.step()).collect())
}

pub fn decompose(args: &DecomposeArgs, threads: usize, progress: bool) -> Result<()> {
    if args.hairpins {
        log::warn!("hairpin detection was requested but is not implemented; ignoring --hairpins");
    }

    let graph = super::load_graph(&args.input_gfa)?;
    fs::create_dir_all(&args.output_dir).map_err(PovuError::Io)?;

    let components = graph.componetize();
    let bar = crate::util::progress_bar(components.len(), progress);
    let pool = ThreadPool::new(threads);
    let group = crate::concurrent::TaskGroup::new();

    for (idx, component) in components.into_iter().enumerate() {
        let output_dir = args.output_dir.clone();
        let subflubbles_on = args.subflubbles;
        let bar = bar.clone();
        group.enqueue(&pool, move || -> Result<()> {
            let trunk = pick_trunk(&component);
            let trunk_opt = trunk.as_deref();
            let st = SpanningTree::build(&component, trunk_opt)?;
            let mut pvst = flubble::find_flubbles(&component, &st, trunk_opt);
            if subflubbles_on {
                subflubbles::refine(&mut pvst, &st, &component);
            }
            pvst.compute_heights();

            let mut text = String::new();
            crate::pvst::io::write_pvst(&pvst, &mut text)
                .map_err(|e| PovuError::InvariantViolation {
                    subsystem: "pvst::io".into(),
                    message: e.to_string(),
                })?;
            let path = output_dir.join(format!("component_{}.pvst", idx));
            fs::write(&path, text).map_err(PovuError::Io)?;
            log::info!("wrote {}", path.display());
            bar.inc(1);
            Ok(())
        });
    }

    let result = group.wait();
    bar.finish_and_clear();
    pool.shutdown();
    result
}
