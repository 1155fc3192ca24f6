use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use symsync_branch::{BranchRegistry, SyncConfig, SyncOutcome};

#[derive(Parser)]
#[command(name = "symsync")]
#[command(about = "Keep a debug symbol store in step with the build server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, default_value = "symsync.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the latest (or a given) build into the symbol store
    Sync(SyncArgs),
    /// List the builds published for a branch
    Builds(BranchArgs),
    /// List the symbols of one build
    Symbols(SymbolsArgs),
    /// Forget the persisted branch record
    Delete(BranchArgs),
}

#[derive(Args)]
struct BranchArgs {
    /// Branch name on the build server
    #[arg(long)]
    build_name: String,

    /// Branch name in the symbol store
    #[arg(long)]
    store_name: String,
}

#[derive(Args)]
struct SyncArgs {
    #[command(flatten)]
    branch: BranchArgs,

    /// Build version to publish instead of the build server's latest
    #[arg(long, default_value = "")]
    build: String,
}

#[derive(Args)]
struct SymbolsArgs {
    #[command(flatten)]
    branch: BranchArgs,

    /// Build id assigned by the symbol store
    build_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = SyncConfig::load(&cli.config)
        .await
        .with_context(|| format!("load config {}", cli.config.display()))?;
    let config = Arc::new(config);

    match cli.command {
        Commands::Sync(args) => run_sync(args, config).await,
        Commands::Builds(args) => run_builds(args, config).await,
        Commands::Symbols(args) => run_symbols(args, config).await,
        Commands::Delete(args) => run_delete(args, config).await,
    }
}

async fn open_branch(args: &BranchArgs, config: Arc<SyncConfig>) -> Result<BranchRegistry> {
    let branch = BranchRegistry::new(&args.build_name, &args.store_name, config);
    if let Err(err) = branch.load().await {
        if !err.is_not_found() {
            return Err(err).context("load branch snapshot");
        }
        log::info!("No snapshot for {}, starting fresh", args.store_name);
    }
    Ok(branch)
}

async fn run_sync(args: SyncArgs, config: Arc<SyncConfig>) -> Result<()> {
    let branch = open_branch(&args.branch, config).await?;
    // Seed the registry so already published versions are recognized.
    if let Err(err) = branch.parse_builds(|_| Ok(())).await {
        if !err.is_not_found() {
            return Err(err).context("read build history");
        }
    }

    let outcome = branch
        .add_build(&args.build)
        .await
        .with_context(|| format!("sync branch {}", args.branch.store_name))?;
    branch.persist().await.context("persist branch")?;

    match outcome {
        SyncOutcome::AlreadyCurrent(version) => println!("up to date: {version}"),
        SyncOutcome::AlreadyPublished(build) => {
            println!("already published: {} ({})", build.version, build.id)
        }
        SyncOutcome::Published(build) => println!("published: {} ({})", build.version, build.id),
    }
    Ok(())
}

async fn run_builds(args: BranchArgs, config: Arc<SyncConfig>) -> Result<()> {
    let branch = open_branch(&args, config).await?;
    let total = branch
        .parse_builds(|build| {
            println!(
                "{}\t{}\t{}\t{}",
                build.id, build.date, build.version, build.comment
            );
            Ok(())
        })
        .await
        .context("read build history")?;
    log::info!("{total} builds for {}", args.store_name);
    Ok(())
}

async fn run_symbols(args: SymbolsArgs, config: Arc<SyncConfig>) -> Result<()> {
    let branch = open_branch(&args.branch, config).await?;
    branch
        .parse_builds(|_| Ok(()))
        .await
        .context("read build history")?;
    let total = branch
        .parse_symbols(&args.build_id, |symbol| {
            println!(
                "{}\t{}\t{}\t{}",
                symbol.hash, symbol.arch, symbol.name, symbol.path
            );
            Ok(())
        })
        .await
        .with_context(|| format!("read symbols of build {}", args.build_id))?;
    log::info!("{total} symbols in build {}", args.build_id);
    Ok(())
}

async fn run_delete(args: BranchArgs, config: Arc<SyncConfig>) -> Result<()> {
    let branch = open_branch(&args, config).await?;
    branch.delete().await.context("delete branch snapshot")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_accepts_explicit_build() {
        let cli = Cli::try_parse_from([
            "symsync",
            "--config",
            "custom.toml",
            "sync",
            "--build-name",
            "UDPv6.5U2",
            "--store-name",
            "Titanium",
            "--build",
            "4175.2-538",
        ])
        .expect("parse");
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.branch.store_name, "Titanium");
        assert_eq!(args.build, "4175.2-538");
    }

    #[test]
    fn symbols_requires_build_id() {
        assert!(Cli::try_parse_from([
            "symsync",
            "symbols",
            "--build-name",
            "b",
            "--store-name",
            "s",
        ])
        .is_err());
    }
}
