//! Guahh CLI: interactive question answering over a local corpus.
//!
//! Thin wrapper over the `guahh` library crate.
//!
//! Logging: `--verbose` shows engine activity on stderr; `RUST_LOG` overrides.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use guahh::{Answer, Engine, EngineConfig, NoKnowledge, load_payload};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Guahh: answers questions from a small local corpus, writing new text when
/// no stored answer fits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Corpus payload: a .json array or .jsonl with one record per line.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// PRNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Engine config file (JSON). Unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling temperature; overrides the config file.
    #[arg(long)]
    temperature: Option<f64>,

    /// Nucleus mass in (0, 1]; overrides the config file.
    #[arg(long)]
    top_p: Option<f64>,

    /// Print each answer as one JSON object per line.
    #[arg(long)]
    json: bool,

    /// Log engine activity to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(top_p) = args.top_p {
        config.top_p = top_p;
    }
    config.validate()?;

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    });

    let payload = match &args.corpus {
        Some(path) => Some(
            load_payload(path)
                .with_context(|| format!("failed to load corpus {}", path.display()))?,
        ),
        None => None,
    };

    let mut engine = Engine::new(config, SmallRng::seed_from_u64(seed), NoKnowledge);
    if !engine.init(payload) {
        tracing::warn!("no corpus given; every question will get the not-ready reply");
    }
    tracing::debug!(seed, "engine ready");

    converse(&mut engine, args.json).await
}

/// Greet, then answer stdin line by line until EOF, `quit` or `exit`.
async fn converse(engine: &mut Engine<SmallRng>, json: bool) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Guahh: Hello! Ask me anything.")?;
    stdout.flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        let answer = engine.answer(trimmed).await;
        print_answer(&mut stdout, &answer, json)?;
        stdout.flush()?;
    }

    Ok(())
}

fn print_answer(out: &mut impl Write, answer: &Answer, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(answer)?)?;
        return Ok(());
    }

    writeln!(out, "Guahh: {}", answer.text)?;
    if !answer.sources.is_empty() {
        writeln!(out, "  [{}]", answer.sources)?;
    }
    Ok(())
}
