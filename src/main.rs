use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use portbench::bench::BenchRegistry;
use portbench::codegen::{Backend, BackendRegistry};
use portbench::config::ToolchainSet;
use portbench::generate;

#[derive(Parser)]
#[command(
    name = "portbench",
    version,
    about = "Generate performance-portability micro-benchmarks for many parallel programming models"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate benchmark sources, utility headers and Makefiles
    Generate {
        /// Output directory for the generated tree
        #[arg(default_value = "generated")]
        out: PathBuf,
        /// Generate only the named benchmarks (default: all)
        #[arg(short, long)]
        bench: Vec<String>,
        /// Generate only the named backends (default: all)
        #[arg(long)]
        backend: Vec<String>,
        /// Toolchain configuration file overriding the built-in defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the available benchmarks and backends
    List,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            out,
            bench,
            backend,
            config,
        } => cmd_generate(out, &bench, &backend, config),
        Command::List => cmd_list(),
    }
}

fn cmd_generate(out: PathBuf, bench: &[String], backend: &[String], config: Option<PathBuf>) {
    let benches = match select_benches(bench) {
        Ok(b) => b,
        Err(e) => fail(&e),
    };
    let backends = match select_backends(backend) {
        Ok(b) => b,
        Err(e) => fail(&e),
    };

    let toolchains = match config {
        Some(path) => match ToolchainSet::load(&path) {
            Ok(t) => t,
            Err(e) => fail(&e),
        },
        None => ToolchainSet::default(),
    };

    if let Err(e) = generate::write_all(&out, &benches, &backends, &toolchains) {
        fail(&e);
    }
    eprintln!(
        "Generated {} benchmark(s) for {} backend(s) in {}",
        benches.all().len(),
        backends.all().len(),
        out.display()
    );
}

fn select_benches(names: &[String]) -> portbench::Result<BenchRegistry> {
    let catalogue = BenchRegistry::default_set();
    if names.is_empty() {
        return Ok(catalogue);
    }
    let selected = names
        .iter()
        .map(|n| catalogue.lookup(n).map(Clone::clone))
        .collect::<portbench::Result<Vec<_>>>()?;
    Ok(BenchRegistry::new(selected))
}

fn select_backends(names: &[String]) -> portbench::Result<BackendRegistry> {
    let all = BackendRegistry::default_set();
    if names.is_empty() {
        return Ok(all);
    }
    let selected = names
        .iter()
        .map(|n| all.lookup(n))
        .collect::<portbench::Result<Vec<Backend>>>()?;
    Ok(BackendRegistry::new(selected))
}

fn cmd_list() {
    println!("benchmarks:");
    for bench in BenchRegistry::default_set().all() {
        println!(
            "  {:<16} {}-dimensional, defaults: {}",
            bench.name,
            bench.dimensionality,
            bench.default_parameters.join(" ")
        );
    }
    println!();
    println!("backends:");
    for backend in BackendRegistry::default_set().all() {
        println!("  {:<16} {}", backend.short_name(), backend.display_name());
    }
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("error: {e}");
    process::exit(1);
}
