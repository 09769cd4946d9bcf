// CLI entry point for the listening garden.
//
// Runs one garden session headlessly. Each stdin line is an utterance (see
// `input.rs` for the format and slash commands); the garden grows, weathers
// and talks to the shared endpoint exactly as the installation would, and
// the final canvas can be written out as SVG.
//
// Two clocks:
// - realtime (default): frames at `--fps` against the wall clock until stdin
//   closes or `/quit`;
// - `--simulate-ms N`: stdin is read up front, one line every `--line-gap-ms`
//   of simulated time, and N milliseconds of frames run as fast as possible.
//
// Usage:
//   garden [OPTIONS] < utterances.txt
//     --config <PATH>        JSON config (defaults for anything missing)
//     --endpoint <URL>       Shared garden endpoint; enables the remote garden
//     --svg-out <PATH>       Write the final canvas here

mod host;
mod input;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use garden_core::{GardenConfig, GardenSession};
use garden_remote::{RemoteClient, RemoteConfig};

use crate::host::Host;
use crate::input::Input;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "garden", about = "A garden that grows from what it hears")]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// PRNG seed (default: from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Shared garden endpoint; setting it enables the remote garden
    #[arg(long, env = "GARDEN_ENDPOINT")]
    endpoint: Option<String>,

    /// Shared garden id
    #[arg(long)]
    garden_id: Option<String>,

    /// Secret sent with every request
    #[arg(long, env = "GARDEN_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Ask for plain JSON instead of JSONP on GET requests
    #[arg(long)]
    no_jsonp: bool,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "800")]
    height: f64,

    /// Frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Run this many milliseconds of simulated time instead of the wall clock
    #[arg(long)]
    simulate_ms: Option<u64>,

    /// Simulated gap between stdin lines
    #[arg(long, default_value = "1000")]
    line_gap_ms: u64,

    /// Print session events to stdout as JSON lines
    #[arg(long)]
    events: bool,

    /// Write the final canvas as SVG
    #[arg(long)]
    svg_out: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;
    let seed = cli.seed.unwrap_or_else(clock_seed);
    let remote = match (&cli.endpoint, config.remote.enabled) {
        (Some(endpoint), true) => {
            let mut remote = RemoteConfig::new(endpoint.clone());
            remote.use_jsonp = !cli.no_jsonp;
            Some(RemoteClient::spawn(remote).context("starting remote client")?)
        }
        _ => None,
    };

    let start = wall_clock_ms();
    let session = GardenSession::new(config, seed, (cli.width, cli.height), start)
        .context("starting garden session")?;
    let mut host = Host::new(session, remote, cli.events);

    let end = match cli.simulate_ms {
        Some(duration) => run_simulated(&mut host, &cli, start, duration)?,
        None => run_realtime(&mut host, &cli),
    };
    host.finish(end);

    if let Some(path) = &cli.svg_out {
        std::fs::write(path, host.session().snapshot_svg())
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    let stats = host.stats();
    tracing::info!(
        plants = host.session().garden().len(),
        utterances = stats.utterances,
        frames = stats.frames,
        requests_sent = stats.requests_sent,
        requests_failed = stats.requests_failed,
        "done"
    );
    Ok(())
}

/// Config file (or defaults), then command-line overrides.
fn build_config(cli: &Cli) -> anyhow::Result<GardenConfig> {
    let mut config = match &cli.config {
        Some(path) => GardenConfig::load(path)?,
        None => GardenConfig::default(),
    };
    if cli.endpoint.is_some() {
        config.remote.enabled = true;
    }
    if let Some(id) = &cli.garden_id {
        config.remote.garden_id = id.clone();
    }
    if let Some(secret) = &cli.secret {
        config.remote.secret = secret.clone();
    }
    if config.remote.enabled && cli.endpoint.is_none() {
        tracing::warn!("remote garden enabled in config but no --endpoint given; staying local");
        config.remote.enabled = false;
    }
    config.validate()?;
    Ok(config)
}

fn frame_ms(fps: u32) -> u64 {
    1000 / u64::from(fps.clamp(1, 1000))
}

/// Wall-clock frames until stdin closes or `/quit`. Returns the end time.
fn run_realtime(host: &mut Host, cli: &Cli) -> u64 {
    let default_confidence = host.session().config().growth.default_confidence;
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let frame = Duration::from_millis(frame_ms(cli.fps));
    loop {
        let now = wall_clock_ms();
        let mut stdin_closed = false;
        loop {
            match rx.try_recv() {
                Ok(line) => {
                    if let Some(input) = Input::parse(&line, default_confidence) {
                        host.apply(input, now);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    stdin_closed = true;
                    break;
                }
            }
        }
        host.tick(now);
        if stdin_closed || host.quit_requested() {
            return now;
        }
        std::thread::sleep(frame);
    }
}

/// Simulated frames from `start` for `duration` ms. Returns the end time.
fn run_simulated(host: &mut Host, cli: &Cli, start: u64, duration: u64) -> anyhow::Result<u64> {
    let default_confidence = host.session().config().growth.default_confidence;
    let lines: Vec<String> = std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<_, _>>()
        .context("reading stdin")?;
    let mut inputs = lines
        .iter()
        .filter_map(|line| Input::parse(line, default_confidence))
        .enumerate()
        .map(|(i, input)| (start + i as u64 * cli.line_gap_ms, input))
        .peekable();

    let step = frame_ms(cli.fps);
    let end = start + duration;
    let mut now = start;
    while now <= end {
        while let Some((_, input)) = inputs.next_if(|(at, _)| *at <= now) {
            host.apply(input, now);
        }
        host.tick(now);
        if host.quit_requested() {
            break;
        }
        now += step;
    }
    Ok(now.min(end))
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["garden"]).unwrap();
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert_eq!((cli.width, cli.height), (1280.0, 800.0));
        assert_eq!(cli.fps, 30);
        assert!(cli.simulate_ms.is_none());
    }

    #[test]
    fn endpoint_enables_remote_and_overrides_apply() {
        let cli = Cli::try_parse_from([
            "garden",
            "--endpoint",
            "https://example.test/exec",
            "--garden-id",
            "lobby",
            "--secret",
            "shh",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert!(config.remote.enabled);
        assert_eq!(config.remote.garden_id, "lobby");
        assert_eq!(config.remote.secret, "shh");
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }

    #[test]
    fn frame_length_is_clamped() {
        assert_eq!(frame_ms(30), 33);
        assert_eq!(frame_ms(0), 1000);
        assert_eq!(frame_ms(5000), 1);
    }
}
