use structopt::StructOpt;

use povu::commands::call::CallArgs;
use povu::commands::decompose::DecomposeArgs;
use povu::commands::gfa2vcf::Gfa2VcfArgs;
use povu::commands::info::InfoArgs;
use povu::commands::{call, decompose, gfa2vcf, info};
use povu::error::PovuError;

#[derive(StructOpt, Debug)]
enum Command {
    /// GFA → VCF (decompose + call)
    Gfa2vcf(Gfa2VcfArgs),
    /// GFA → PVST files
    Decompose(DecomposeArgs),
    /// PVST + GFA → VCF
    Call(CallArgs),
    /// Graph statistics
    Info(InfoArgs),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "povu", about = "Pangenome-variation engine")]
struct Opt {
    /// Logging verbosity: 0 = error, 1 = warn, 2 = info, 3 = debug, 4+ = trace.
    #[structopt(short, long, default_value = "2")]
    verbosity: u8,

    /// Worker-thread count for the spanning-tree/PVST/VCF pools.
    #[structopt(short, long, default_value = "4")]
    threads: usize,

    /// Show a progress bar for long-running subcommands.
    #[structopt(long)]
    progress: bool,

    #[structopt(subcommand)]
    command: Command,
}

fn level_filter(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(opt: &Opt) -> povu::error::Result<()> {
    match &opt.command {
        Command::Gfa2vcf(args) => gfa2vcf::gfa2vcf(args, opt.threads, opt.progress),
        Command::Decompose(args) => decompose::decompose(args, opt.threads, opt.progress),
        Command::Call(args) => call::call(args, opt.threads, opt.progress),
        Command::Info(args) => info::info(args),
    }
}

fn main() {
    let opt = Opt::from_args();

    env_logger::Builder::new()
        .filter_level(level_filter(opt.verbosity))
        .init();

    if let Err(e) = run(&opt) {
        let subsystem = match &e {
            PovuError::Input(_) => "input",
            PovuError::InvariantViolation { subsystem, .. } => subsystem.as_str(),
            PovuError::CapacityBreach { subsystem, .. } => subsystem.as_str(),
            PovuError::Transient(_) => "concurrent",
            PovuError::Io(_) => "io",
        };
        eprintln!("povu: {}: {}", subsystem, e);
        std::process::exit(1);
    }
}
