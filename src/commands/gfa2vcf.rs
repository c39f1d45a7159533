//! `gfa2vcf`: GFA → VCF directly, decompose and call in one pass (spec.md
//! §6.1) sharing a temp directory for the intermediate `.pvst` forest
//! (spec.md §6.4: "removed on success").

use std::path::PathBuf;

use structopt::clap::AppSettings;
use structopt::StructOpt;

use crate::error::Result;

use super::call::{self, CallArgs};
use super::decompose::{self, DecomposeArgs};

/// `-h` is claimed by `--hairpins`; see `DecomposeArgs`.
#[derive(StructOpt, Debug)]
#[structopt(setting = AppSettings::DisableHelpFlags)]
pub struct Gfa2VcfArgs {
    #[structopt(short = "i", long = "input-gfa", parse(from_os_str))]
    pub input_gfa: PathBuf,

    #[structopt(short = "o", long = "output-dir", parse(from_os_str))]
    pub output_dir: Option<PathBuf>,

    #[structopt(long = "stdout")]
    pub stdout: bool,

    #[structopt(short = "h", long = "hairpins")]
    pub hairpins: bool,

    #[structopt(short = "s", long = "subflubbles")]
    pub subflubbles: bool,

    #[structopt(short = "c", long = "chunk-size", default_value = "100")]
    pub chunk_size: usize,

    #[structopt(short = "q", long = "queue-length", default_value = "4")]
    pub queue_length: usize,

    #[structopt(short = "r", long = "prefix-list", parse(from_os_str))]
    pub prefix_list: Option<PathBuf>,

    #[structopt(short = "P", long = "path-prefix")]
    pub path_prefix: Vec<String>,

    #[structopt(name = "refs")]
    pub refs: Vec<String>,
}

pub fn gfa2vcf(args: &Gfa2VcfArgs, threads: usize, progress: bool) -> Result<()> {
    let tmp = tempdir()?;

    let decompose_args = DecomposeArgs {
        input_gfa: args.input_gfa.clone(),
        output_dir: tmp.clone(),
        hairpins: args.hairpins,
        subflubbles: args.subflubbles,
    };
    decompose::decompose(&decompose_args, threads, progress)?;

    let call_args = CallArgs {
        input_gfa: args.input_gfa.clone(),
        forest_dir: tmp.clone(),
        output_dir: args.output_dir.clone(),
        stdout: args.stdout,
        chunk_size: args.chunk_size,
        queue_length: args.queue_length,
        prefix_list: args.prefix_list.clone(),
        path_prefix: args.path_prefix.clone(),
        refs: args.refs.clone(),
    };
    let result = call::call(&call_args, threads, progress);

    if result.is_ok() {
        let _ = std::fs::remove_dir_all(&tmp);
    }
    result
}

/// A fresh directory under the OS temp root, named after the process id so
/// concurrent runs don't collide (spec.md §6.4).
fn tempdir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("povu-{}", std::process::id()));
    std::fs::create_dir_all(&dir).map_err(crate::error::PovuError::Io)?;
    Ok(dir)
}
