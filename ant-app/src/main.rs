mod app;

use ant_core::{Layout, StandardPhase};
use ant_experiment::{
    DataSink, ExperimentConfig, ExperimentSession, JsonLinesSink, Participant, SessionSummary,
    SimulatedHost, TrialConfig,
};
use ant_render::{FontArc, Palette};
use ant_timing::{HighPrecisionTimer, ManualTimer};
use anyhow::{Context, Result, anyhow};
use app::{WindowHost, WindowOptions};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Attention Network Test
#[derive(Parser, Debug)]
#[command(name = "ant", version, about = "Attention Network Test", long_about = None)]
struct Cli {
    /// JSON experiment configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trial records, one JSON object per line
    #[arg(short, long, default_value = "ant_results.jsonl")]
    output: PathBuf,

    /// TrueType font for instructions and feedback
    #[arg(long)]
    font: Option<PathBuf>,

    /// Seed for trial order and cue onsets
    #[arg(long)]
    seed: Option<u64>,

    /// Trial timing preset; overrides the config file's trial section
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Run headless against a simulated participant
    #[arg(long)]
    simulate: bool,

    /// Open a 1280x720 window instead of going fullscreen
    #[arg(long)]
    windowed: bool,

    /// Log filter, used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Minimal,
    Enhanced,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn load_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    match cli.variant {
        Some(Variant::Minimal) => config.trial = TrialConfig::minimal(),
        Some(Variant::Enhanced) => config.trial = TrialConfig::enhanced(),
        None => {}
    }
    config.validate()?;
    Ok(config)
}

fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    FontArc::try_from_vec(bytes).with_context(|| format!("parsing font {}", path.display()))
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run_simulated(
    config: ExperimentConfig,
    seed: Option<u64>,
    sink: &mut dyn DataSink,
) -> Result<SessionSummary> {
    let timer = ManualTimer::new();
    let screen = (1280, 720);
    let layout = Layout::new(screen, config.display.px_per_degree);
    let participant_rng = rng(seed.map(|s| s.wrapping_add(1)));
    let mut host = SimulatedHost::new(timer.clone(), layout, Participant::default(), participant_rng);
    let mut session: ExperimentSession<StandardPhase, _, _> =
        ExperimentSession::new(config, screen, timer, rng(seed))?;
    Ok(session.run(&mut host, sink)?)
}

fn run_windowed(
    config: ExperimentConfig,
    cli: &Cli,
    sink: &mut dyn DataSink,
) -> Result<Option<SessionSummary>> {
    let font = cli.font.as_deref().map(load_font).transpose()?;
    if font.is_none() {
        warn!("no --font given; instructions and feedback will not be shown");
    }
    let timer = HighPrecisionTimer::new();
    let options = WindowOptions {
        title: "ANT".into(),
        fullscreen: !cli.windowed,
        px_per_degree: config.display.px_per_degree,
        palette: Palette {
            background: config.display.background,
            foreground: config.display.foreground,
        },
        font,
    };
    let mut host = WindowHost::open(options, timer.clone())?;
    let mut session: ExperimentSession<StandardPhase, _, _> =
        ExperimentSession::new(config, host.screen(), timer, rng(cli.seed))?;

    match session.run(&mut host, sink) {
        Ok(summary) => Ok(Some(summary)),
        Err(e) if e.is_abort() => {
            warn!(saved = session.records().len(), "session aborted");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    info!("ANT v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let file = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let mut sink = JsonLinesSink::new(BufWriter::new(file));

    let summary = if cli.simulate {
        Some(run_simulated(config, cli.seed, &mut sink)?)
    } else {
        run_windowed(config, &cli, &mut sink)?
    };

    info!(
        records = sink.written(),
        output = %cli.output.display(),
        "results written"
    );
    if let Some(summary) = summary {
        let s = &summary.scores;
        info!(
            accuracy = s.accuracy,
            alerting_ms = ?s.alerting_ms,
            orienting_ms = ?s.orienting_ms,
            executive_ms = ?s.executive_ms,
            "session complete"
        );
    }
    Ok(())
}
