use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;

use haxball_corpus::chunk::{ChunkStream, ChunkWriter};
use haxball_corpus::codec;
use haxball_corpus::core::{CorpusConfig, Error, Result};
use haxball_corpus::features::FEATURE_LAYOUT_VERSION;
use haxball_corpus::pipeline::{prepare_corpus, CorpusLoader, JsonlSession};

#[derive(Parser, Debug)]
#[command(author, version, about = "Haxball session corpus toolkit", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (-q warn, -qq error)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record JSON-lines sessions into a corpus file
    Prepare(PrepareArgs),
    /// Report the chunks and matches of a corpus without building features
    Inspect(InspectArgs),
    /// Build feature vectors from a corpus
    Features(FeaturesArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; explicit flags override its values
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Players every stored frame must have
    #[arg(long, value_name = "N")]
    players: Option<usize>,

    /// Drop matches whose largest tick is below this
    #[arg(long = "min-ticks", value_name = "TICKS")]
    min_ticks: Option<u32>,

    /// Team id flagged with 1 in the feature vector
    #[arg(long = "team-one", value_name = "ID")]
    team_one: Option<i32>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<CorpusConfig> {
        let mut config = match (&self.config, self.players) {
            (Some(path), _) => CorpusConfig::load(path)?,
            (None, Some(players)) => CorpusConfig::new(players),
            (None, None) => {
                return Err(Error::InvalidConfig(
                    "either --config or --players is required".into(),
                ))
            }
        };
        if let Some(players) = self.players {
            config.expected_player_count = players;
        }
        if let Some(ticks) = self.min_ticks {
            config = config.with_minimum_ticks(ticks);
        }
        if let Some(team) = self.team_one {
            config = config.with_team_one(team);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct PrepareArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Session files, one tick event per line
    #[arg(required = true, value_name = "SESSION")]
    sessions: Vec<PathBuf>,

    /// Corpus file to write (replaced if present)
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Corpus file to read
    #[arg(required = true, value_name = "CORPUS")]
    corpus: PathBuf,
}

#[derive(Args, Debug)]
struct FeaturesArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Corpus file to read
    #[arg(required = true, value_name = "CORPUS")]
    corpus: PathBuf,

    /// Write examples as JSON lines to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Examples buffered between the loader thread and the writer
    #[arg(long, value_name = "COUNT", default_value_t = haxball_corpus::pipeline::DEFAULT_LOADER_CAPACITY)]
    buffer: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Prepare(args) => run_prepare(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Features(args) => run_features(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        _ => Some(LevelFilter::Error),
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    let config = args.config.resolve()?;

    let sources = args
        .sessions
        .iter()
        .map(|path| Ok(JsonlSession::new(BufReader::new(File::open(path)?))))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = ChunkWriter::new(BufWriter::new(File::create(&args.output)?));
    let stats = prepare_corpus(sources, &config, &mut writer)?;

    log::info!(
        "{} of {} sessions written to {} ({} bytes); {} empty, {} too short, {} failed",
        stats.written,
        stats.sessions,
        args.output.display(),
        stats.bytes,
        stats.empty,
        stats.too_short,
        stats.failed
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let mut stream = ChunkStream::new(File::open(&args.corpus)?);
    let mut chunks = 0usize;
    let mut matches = 0usize;
    let mut frames = 0usize;
    let mut malformed = 0usize;
    let mut max_tick = None;

    for chunk in stream.by_ref() {
        let chunk = chunk?;
        chunks += 1;
        match codec::decode(&chunk) {
            Ok(m) => {
                matches += 1;
                frames += m.len();
                max_tick = max_tick.max(m.max_tick());
            }
            Err(e) => {
                log::warn!("chunk {}: {}", chunks, e);
                malformed += 1;
            }
        }
    }

    println!("corpus:     {}", args.corpus.display());
    println!("bytes:      {}", stream.bytes_read());
    println!("chunks:     {}", chunks);
    println!("matches:    {}", matches);
    println!("malformed:  {}", malformed);
    println!("frames:     {}", frames);
    if let Some(tick) = max_tick {
        println!("max tick:   {}", tick);
    }
    match stream.warning() {
        Some(warning) => println!("tail:       {}", warning),
        None => println!("tail:       clean"),
    }
    Ok(())
}

fn run_features(args: FeaturesArgs) -> Result<()> {
    let config = args.config.resolve()?;
    log::info!(
        "feature layout v{}: {} values per example",
        FEATURE_LAYOUT_VERSION,
        config.feature_len()
    );

    let (examples, handle) = CorpusLoader::new(config).spawn(args.corpus.clone(), args.buffer)?;

    let mut out = match &args.output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };
    let mut written = 0usize;
    for example in examples {
        if let Some(out) = out.as_mut() {
            serde_json::to_writer(&mut *out, &example)?;
            out.write_all(b"\n")?;
        }
        written += 1;
    }
    if let Some(mut out) = out {
        out.flush()?;
    }

    let stats = handle
        .join()
        .map_err(|_| Error::Io(std::io::Error::other("loader thread panicked")))??;

    log::info!(
        "{} examples from {} frames in {} matches ({} skipped matches, {} skipped frames, {} skipped examples)",
        written,
        stats.frames,
        stats.matches,
        stats.skipped_matches,
        stats.skipped_frames,
        stats.skipped_examples
    );
    Ok(())
}
