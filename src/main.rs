use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use argh::FromArgs;
use log::{LevelFilter, error, info};
use regather::text::{read_centroids, write_centroids, write_pairs};
use regather::{AggregatorConfig, Checkpoint, Result, Round, Tolerance};

#[derive(FromArgs)]
/// Aggregation step of map/reduce k-means.
struct Args {
    /// print debug logs
    #[argh(switch, short = 'v')]
    verbose: bool,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Init(InitArgs),
    Reduce(ReduceArgs),
    Inspect(InspectArgs),
}

#[derive(FromArgs)]
/// Write a checkpoint from a centroid list.
#[argh(subcommand, name = "init")]
struct InitArgs {
    /// centroid list, one `<id> <v1,v2,...>` per line
    #[argh(option)]
    centroids: PathBuf,
    /// checkpoint directory
    #[argh(option)]
    checkpoint: PathBuf,
    /// number of checkpoint partitions
    #[argh(option, default = "1")]
    tasks: usize,
}

#[derive(FromArgs)]
/// Run one aggregation round over assignment output.
#[argh(subcommand, name = "reduce")]
struct ReduceArgs {
    /// assignment output, one `<id> <label> <v1,v2,...>` per line
    #[argh(option)]
    input: PathBuf,
    /// checkpoint directory, read and then replaced
    #[argh(option)]
    checkpoint: PathBuf,
    /// where to write the re-keyed points, stdout if omitted
    #[argh(option)]
    output: Option<PathBuf>,
    /// number of aggregation tasks
    #[argh(option, default = "1")]
    tasks: usize,
    /// max centroid shift that still counts as converged, 0 means exact
    #[argh(option, default = "0.0")]
    tolerance: f32,
}

#[derive(FromArgs)]
/// Print the centroids of a checkpoint.
#[argh(subcommand, name = "inspect")]
struct InspectArgs {
    /// checkpoint directory
    #[argh(option)]
    checkpoint: PathBuf,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn init(args: InitArgs) -> Result<()> {
    let centroids = read_centroids(open(&args.centroids)?)?;
    let checkpoint = Checkpoint::write_all(&args.checkpoint, &centroids, args.tasks)?;
    info!(
        "wrote {} centroids to {}",
        checkpoint.len(),
        args.checkpoint.display()
    );
    Ok(())
}

fn reduce(args: ReduceArgs) -> Result<()> {
    let config = AggregatorConfig::new(&args.checkpoint)
        .with_tasks(args.tasks)
        .with_tolerance(Tolerance::new(args.tolerance)?);
    let round = Round::new(config)?;

    let (outcome, movement) = round.run_assignments(open(&args.input)?)?;

    match args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_pairs(&mut out, &outcome.pairs)?;
            out.flush()?;
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            write_pairs(&mut out, &outcome.pairs)?;
            out.flush()?;
        }
    }

    info!(
        "max shift {}, {} clusters unchanged",
        movement.max_shift(),
        movement.converged_count()
    );
    eprintln!(
        "converged {}/{}",
        outcome.tally.value(),
        outcome.clusters()
    );
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let checkpoint = Checkpoint::read(&args.checkpoint)?;
    let mut out = BufWriter::new(io::stdout().lock());
    write_centroids(&mut out, checkpoint.centroids())?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logforth::builder()
        .dispatch(|d| d.filter(level).append(logforth::append::Stderr::default()))
        .apply();

    let result = match args.command {
        Command::Init(args) => init(args),
        Command::Reduce(args) => reduce(args),
        Command::Inspect(args) => inspect(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
