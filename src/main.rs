use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build;
mod commands;
mod config;
mod util;

#[derive(Parser)]
#[command(version, about = "Build a static site from markdown and HTML pages")]
struct Args {
    /// The path to the configuration file (default: .belbo.toml)
    #[arg(short, long, global = true)]
    config_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// The command to execute; without one the site is built and then
    /// served when `local_server` is enabled
    #[command(subcommand)]
    command: Option<BelboCommand>,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value_t = commands::serve::DEFAULT_PORT)]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: commands::serve::DEFAULT_PORT,
            open: false,
        }
    }
}

#[derive(Subcommand)]
enum BelboCommand {
    /// Build the site
    Build,

    /// Build the site and serve it on a local port
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config_file = args.config_file.as_deref();
    match args.command {
        Some(BelboCommand::Build) => {
            commands::build::run(config_file)?;
        }
        Some(BelboCommand::Serve(serve_args)) => {
            commands::serve::run(config_file, &serve_args).await?;
        }
        None => {
            let site = commands::build::run(config_file)?;
            if site.local_server {
                commands::serve::serve(&site.output_dir, &ServeArgs::default()).await?;
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
