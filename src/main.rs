//! scribe - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use git2::Repository;

use scribe::analysis::Classifier;
use scribe::config::{Config, CONFIG_FILE};
use scribe::git::{collect_changes, stage_and_commit};
use scribe::metrics::{load_summary, JsonlMetricsSink, NullMetricsSink, MetricsSink, METRICS_FILE};
use scribe::synth::{BackendChain, OpenRouterClient, Synthesizer};

/// Classify pending changes and commit them with a generated message.
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Classify pending changes and commit them with a generated message")]
#[command(version)]
struct Cli {
    /// Path to the git repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Path to the config file (relative paths resolve against the repo)
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Write a commented starter config file and exit
    #[arg(long)]
    setup: bool,

    /// Classify and print the message without committing
    #[arg(long)]
    dry_run: bool,

    /// Print the classification rationale before the message
    #[arg(long)]
    explain: bool,

    /// Print aggregate generation metrics and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = if cli.config.is_absolute() {
        cli.config.clone()
    } else {
        cli.repo.join(&cli.config)
    };

    if cli.setup {
        Config::write_default(&config_path)
            .context("Failed to write the starter config file")?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    if cli.stats {
        return print_stats(&cli.repo);
    }

    // Step 1: Load configuration
    let config = Config::load(&config_path).context("Failed to load configuration")?;
    let dry_run = cli.dry_run || config.dry_run;

    // Step 2: Open the repository and collect pending changes
    let repo = Repository::open(&cli.repo)
        .context("Not a git repository. Run scribe from within a git repository.")?;
    let changes = collect_changes(&repo).context("Failed to collect working tree changes")?;

    println!(
        "Found {} changed files (+{} -{})",
        changes.staged_paths.len() + changes.untracked_paths.len(),
        changes.additions,
        changes.deletions
    );

    // Step 3: Classify
    let classifier = Classifier::with_root(&cli.repo);
    let classification = classifier.classify(
        &changes.diff_text,
        &changes.staged_paths,
        &changes.untracked_paths,
    );

    if cli.explain {
        println!("{}", classifier.explain(&classification));
    }

    // Step 4: Synthesize the message
    let api_key = config
        .require_api_key()
        .context("A generation backend requires an API key")?;
    let backend = OpenRouterClient::new(
        api_key.to_string(),
        config.site_url.clone(),
        config.site_name.clone(),
    );
    let metrics: Box<dyn MetricsSink> = if dry_run {
        Box::new(NullMetricsSink)
    } else {
        Box::new(JsonlMetricsSink::new(cli.repo.join(METRICS_FILE)))
    };
    let mut synthesizer = Synthesizer::new(
        Box::new(backend),
        BackendChain::new(&config.model),
        metrics,
        config.language.clone(),
    );
    let message = synthesizer.synthesize(&classification).await;

    // Step 5: Commit (unless dry run)
    if dry_run {
        println!("[dry run] {message}");
        return Ok(());
    }

    let oid = stage_and_commit(&repo, &message).context("Failed to create commit")?;
    println!("{message}");
    println!("Committed as {oid}");

    Ok(())
}

fn print_stats(repo: &std::path::Path) -> Result<()> {
    match load_summary(&repo.join(METRICS_FILE)).context("Failed to read metrics")? {
        None => println!("No generation metrics recorded yet."),
        Some(summary) => {
            println!("Generations: {}", summary.total);
            println!("Success rate: {:.0}%", summary.success_rate * 100.0);
            println!("Average confidence: {:.2}", summary.avg_confidence);
            println!("Average latency: {:.2}s", summary.avg_elapsed_seconds);
            println!("Top categories:");
            for (category, count) in &summary.common_categories {
                println!("  {category}: {count}");
            }
        }
    }
    Ok(())
}
