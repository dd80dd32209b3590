use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};

use sanger_typer::report::{typing_report, typing_summary};
use sanger_typer::types::{Consensus, ReferenceSet};
use sanger_typer::{
    assemble_consensuses, discover_inputs, load_consensus_dir, load_reference_set,
    type_consensuses, AssemblyResults, FileDecoder, PipelineConfig, Result,
};

/// Consensus assembly and reference typing of Sanger read pairs.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// TOML file overriding the default pipeline settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads (defaults to one per core).
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pair trace files by sample and write one consensus per pair.
    Assemble {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Type previously written consensus files against reference databases.
    Type {
        /// Directory holding `Consensus_<id>.fasta` files.
        #[arg(short, long)]
        consensus: PathBuf,
        #[arg(long)]
        trimmed_db: PathBuf,
        #[arg(long)]
        untrimmed_db: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Assemble, then type the fresh consensus sequences.
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        trimmed_db: PathBuf,
        #[arg(long)]
        untrimmed_db: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn spinner(color: &str, message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&format!("{{spinner:.{color}}} {{msg}}"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner
}

fn assemble(input: &Path, output: &Path, config: &PipelineConfig) -> Result<AssemblyResults> {
    let bar = spinner("blue", "Gathering trace files...");
    let files = discover_inputs(input)?;
    bar.finish_with_message(format!("Found {} input file(s).", files.len()));

    let bar = spinner("green", "Assembling read pairs...");
    let results = assemble_consensuses(&files, &FileDecoder::from_config(config), config)?;
    bar.finish_with_message(format!(
        "Assembled {} consensus sequence(s).",
        results.consensuses.len()
    ));

    let bar = spinner("yellow", "Writing consensus files...");
    fs::create_dir_all(output)?;
    for (name, fasta) in results.get_consensus_fasta() {
        fs::write(output.join(name), fasta)?;
    }
    fs::write(output.join("quality_report.tsv"), results.get_quality_report())?;
    fs::write(output.join("assembly_summary.txt"), results.get_summary())?;
    bar.finish_with_message("Consensus files created.");

    Ok(results)
}

fn load_references(
    trimmed_db: &Path,
    untrimmed_db: Option<&Path>,
) -> Result<(ReferenceSet, Option<ReferenceSet>)> {
    let bar = spinner("blue", "Loading reference databases...");
    let trimmed = load_reference_set(trimmed_db)?;
    let untrimmed = untrimmed_db.map(load_reference_set).transpose()?;
    bar.finish_with_message("Reference databases loaded.");
    Ok((trimmed, untrimmed))
}

fn type_and_write(
    consensuses: &[Consensus],
    trimmed: &ReferenceSet,
    untrimmed: Option<&ReferenceSet>,
    output: &Path,
    config: &PipelineConfig,
) -> Result<()> {
    let bar = spinner("green", "Typing consensus sequences...");
    let results = type_consensuses(consensuses, trimmed, untrimmed, config)?;
    bar.finish_with_message(format!("Typed {} sample(s).", results.len()));

    let bar = spinner("yellow", "Writing typing reports...");
    fs::create_dir_all(output)?;
    fs::write(output.join("typing_report.csv"), typing_report(&results))?;
    let summary = typing_summary(&results);
    fs::write(output.join("typing_summary.txt"), &summary)?;
    bar.finish_with_message("Typing reports created.");

    print!("{summary}");
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    config.validate()?;

    if let Some(n) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            log::warn!("Could not size the thread pool: {e}");
        }
    }

    match args.command {
        Command::Assemble { input, output } => {
            let results = assemble(&input, &output, &config)?;
            print!("{}", results.get_summary());
        }
        Command::Type {
            consensus,
            trimmed_db,
            untrimmed_db,
            output,
        } => {
            let (trimmed, untrimmed) = load_references(&trimmed_db, untrimmed_db.as_deref())?;
            let consensuses = load_consensus_dir(&consensus, config.default_quality)?;
            type_and_write(&consensuses, &trimmed, untrimmed.as_ref(), &output, &config)?;
        }
        Command::Run {
            input,
            trimmed_db,
            untrimmed_db,
            output,
        } => {
            // fail on a bad database before spending time on assembly
            let (trimmed, untrimmed) = load_references(&trimmed_db, untrimmed_db.as_deref())?;
            let results = assemble(&input, &output, &config)?;
            print!("{}", results.get_summary());
            type_and_write(
                &results.consensuses,
                &trimmed,
                untrimmed.as_ref(),
                &output,
                &config,
            )?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
