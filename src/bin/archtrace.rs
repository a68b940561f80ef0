//! Archtrace CLI: recover architecture-to-code trace links.
//!
//! Usage:
//!   archtrace link --architecture arch.json --code code.json [--config cfg.yaml] [--output links.json]
//!   archtrace evaluate --architecture arch.json --code code.json --gold gold.csv

use archtrace::{
    evaluate, standard_tree, ArchitectureModel, CodeModel, Evaluation, GoldStandard, TraceConfig, TraceResult,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "archtrace",
    version,
    about = "Architecture-to-code trace link recovery"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standard tree and write the recovered trace links
    Link {
        #[command(flatten)]
        run: RunArgs,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the standard tree and score its links against a gold standard
    Evaluate {
        #[command(flatten)]
        run: RunArgs,
        /// CSV file with an `architecture_id,code_id` header; a `code_id` may
        /// name a directory such as `shop/orders/`
        #[arg(long)]
        gold: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Architecture model (JSON)
    #[arg(long)]
    architecture: PathBuf,
    /// Code model (JSON)
    #[arg(long)]
    code: PathBuf,
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Flat configuration override, e.g. `NameResemblance::preprocessing=split`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
    /// Minimum confidence of an exported link
    #[arg(long)]
    threshold: Option<f64>,
}

/// Install the fmt subscriber. `ARCHTRACE_LOG` filters, defaulting to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ARCHTRACE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RunArgs) -> Result<TraceConfig, String> {
    TraceConfig::layered(args.config.as_deref(), &args.overrides, args.threshold)
        .map_err(|e| format!("cannot load configuration: {}", e))
}

fn run_models(args: &RunArgs, config: &TraceConfig) -> TraceResult<(Evaluation, ArchitectureModel, CodeModel)> {
    let architecture = ArchitectureModel::from_json_file(&args.architecture)?;
    let code = CodeModel::from_json_file(&args.code)?;
    let tree = standard_tree(config)?;
    let evaluation = config.executor().run(&tree, &architecture, &code)?;
    Ok((evaluation, architecture, code))
}

fn run(args: &RunArgs, config: &TraceConfig) -> TraceResult<Evaluation> {
    run_models(args, config).map(|(evaluation, _, _)| evaluation)
}

fn cmd_link(args: &RunArgs, output: Option<&PathBuf>) -> i32 {
    let config = match load_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let report = run(args, &config).and_then(|evaluation| config.exporter()?.report(&evaluation));
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let written = match output {
        Some(path) => report.write_json(path).map(|()| {
            eprintln!("Wrote {} trace links to {}", report.links.len(), path.display());
        }),
        None => report.to_json().map(|json| println!("{}", json)),
    };
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_evaluate(args: &RunArgs, gold_path: &PathBuf) -> i32 {
    let config = match load_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let gold = match GoldStandard::from_csv_file(gold_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: cannot load gold standard '{}': {}", gold_path.display(), e);
            return 1;
        }
    };
    let outcome = run_models(args, &config).and_then(|(evaluation, architecture, code)| {
        let links = config.exporter()?.export_evaluation(&evaluation)?;
        let gold = gold.enroll(&architecture, &code)?;
        Ok((links, gold, evaluation.repo().len()))
    });
    match outcome {
        Ok((links, gold, candidates)) => {
            let metrics = evaluate(&links, &gold, candidates);
            println!("{:<10} {:>8}", "LINKS", links.len());
            println!("{:<10} {:>8}", "GOLD", gold.len());
            println!("{:<10} {:>8}", "CANDIDATES", candidates);
            println!("{}", "-".repeat(19));
            println!("{:<10} {:>8.3}", "PRECISION", metrics.precision);
            println!("{:<10} {:>8.3}", "RECALL", metrics.recall);
            println!("{:<10} {:>8.3}", "F1", metrics.f1);
            println!("{:<10} {:>8.3}", "ACCURACY", metrics.accuracy);
            println!("{:<10} {:>8.3}", "SPECIFICITY", metrics.specificity);
            println!("{:<10} {:>8.3}", "PHI", metrics.phi_coefficient);
            println!("{:<10} {:>8.3}", "PHI/MAX", metrics.phi_over_phi_max);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match &cli.command {
        Commands::Link { run, output } => cmd_link(run, output.as_ref()),
        Commands::Evaluate { run, gold } => cmd_evaluate(run, gold),
    };
    std::process::exit(code);
}
