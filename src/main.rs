//! `changelog` CLI - conventional changelog generator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use changelog::{Changelog, LinkStyle};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Conventional changelog generator.
#[derive(Debug, Parser)]
#[command(name = "changelog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate the changelog for a version
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// The version to be written to the changelog
    #[arg(short = 'v', long = "version")]
    release: String,

    /// Which file to read the current changelog from and prepend the new
    /// changelog's contents to [default: CHANGELOG.md]
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Allows issues and commit hashes to be linked to the actual commit.
    /// Usually used with github repositories
    #[arg(short, long)]
    repository: Option<String>,

    /// Which commit the changelog should start at. By default, uses previous
    /// tag, or if no previous tag the first commit
    #[arg(short, long)]
    start: Option<String>,

    /// Which commit the changelog should end at
    #[arg(short, long, default_value = "HEAD")]
    end: String,

    /// Hyperlink style for commits and issues [github, gitlab, stash, cgit,
    /// gitweb]
    #[arg(long)]
    link_style: Option<LinkStyle>,

    /// Subtitle shown next to the version
    #[arg(long)]
    subtitle: Option<String>,

    /// Use a smaller header, for patch releases
    #[arg(long)]
    patch: bool,

    /// Configuration file [default: .changelog.toml when present]
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    debug!(?cli, "parsed arguments");
    match cli.command {
        Commands::Generate(args) => generate(args),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut changelog = match args.config {
        Some(ref path) => Changelog::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Changelog::with_default_config().context("failed to load configuration")?,
    };

    changelog = changelog.version(args.release).to(args.end).dated_today();
    if let Some(file) = args.file {
        changelog = changelog.file(file);
    }
    if let Some(repo) = args.repository {
        changelog = changelog.repository(repo);
    }
    if let Some(start) = args.start {
        changelog = changelog.from(start);
    }
    if let Some(style) = args.link_style {
        changelog = changelog.link_style(style);
    }
    if let Some(subtitle) = args.subtitle {
        changelog = changelog.subtitle(subtitle);
    }
    if args.patch {
        changelog = changelog.patch_ver(true);
    }

    changelog
        .write_changelog()
        .with_context(|| format!("failed to update {}", changelog.file.display()))?;

    println!("Wrote {}", changelog.file.display());
    Ok(())
}
