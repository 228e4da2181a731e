use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use m2bridge_pom::ArtifactCoordinate;
use m2bridge_resolve::{
    resolve_roots, resolve_scan, LocalRepo, ProgressSink, ResolveContext, ResolveStats,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "m2bridge", version, about = "Collect a project's artifact coordinates from the local Maven repository")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the artifact closure of one or more root descriptors
    Resolve(ResolveArgs),
    /// Scan directory trees for descriptors and resolve everything found
    Scan(ScanArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Root descriptor files (pom.xml)
    #[arg(required = true)]
    poms: Vec<PathBuf>,
    /// Local repository root (defaults to MAVEN_REPO_LOCAL, then ~/.m2/repository)
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Emit JSON suitable for pipelines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ScanArgs {
    /// Directories to scan for descriptors and binary artifacts
    #[arg(required = true)]
    dirs: Vec<PathBuf>,
    /// Local repository root (defaults to MAVEN_REPO_LOCAL, then ~/.m2/repository)
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Emit JSON suitable for pipelines
    #[arg(long)]
    json: bool,
}

/// The record the upload/check pipeline consumes: a coordinate annotated
/// with its preferred local file (binary over descriptor) and whether that
/// file exists.
#[derive(Debug, Serialize)]
struct LocatedArtifact {
    #[serde(flatten)]
    coordinate: ArtifactCoordinate,
    local_path: PathBuf,
    exists: bool,
}

struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, percentage: Option<u32>, message: &str) {
        match percentage {
            Some(pct) => tracing::info!(pct, "{message}"),
            None => tracing::info!("{message}"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Resolve(args) => {
            let repo = LocalRepo::discover(args.repo);
            let progress = LogProgress;
            let mut ctx = ResolveContext::with_progress(repo, &progress);
            resolve_roots(&args.poms, &mut ctx)?;
            report(ctx, args.json)
        }
        Command::Scan(args) => {
            let repo = LocalRepo::discover(args.repo);
            let progress = LogProgress;
            let mut ctx = ResolveContext::with_progress(repo, &progress);
            resolve_scan(&args.dirs, &mut ctx)?;
            report(ctx, args.json)
        }
    }
}

fn report(ctx: ResolveContext<'_>, json: bool) -> Result<i32> {
    let stats = ctx.stats();
    let repo = ctx.repo().clone();
    let located: Vec<LocatedArtifact> = ctx
        .into_coordinates()
        .into_iter()
        .map(|coordinate| {
            let found = repo.locate(&coordinate);
            let exists = found.is_some();
            // Missing artifacts still report the path the upload pipeline
            // would need to populate.
            let local_path = found.unwrap_or_else(|| repo.artifact_path(&coordinate));
            LocatedArtifact {
                coordinate,
                local_path,
                exists,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&located)?);
    } else {
        for artifact in &located {
            let marker = if artifact.exists { "" } else { " (missing)" };
            println!(
                "{}\t{:?}\t{}{marker}",
                artifact.coordinate,
                artifact.coordinate.source,
                artifact.local_path.display()
            );
        }
        print_summary(&located, stats);
    }

    Ok(0)
}

fn print_summary(located: &[LocatedArtifact], stats: ResolveStats) {
    let present = located.iter().filter(|a| a.exists).count();
    eprintln!(
        "{} coordinates ({} present locally, {} dropped, {} descriptors skipped)",
        located.len(),
        present,
        stats.dropped,
        stats.skipped_descriptors
    );
}
