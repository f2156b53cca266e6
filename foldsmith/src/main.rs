use anyhow::Result;
use clap::Parser;
use foldsmith::cli::{Cli, Commands};
use foldsmith::{AppContext, commands, resolve_data_dir};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let data_dir = resolve_data_dir(cli.data_dir.clone());
    let cx = AppContext::new(&data_dir);

    match cli.command {
        Commands::New(args) => commands::handle_new(args, &cx).await?,
        Commands::Project(args) => commands::handle_project(args, &cx).await?,
        Commands::Group(args) => commands::handle_group(args, &cx).await?,
        Commands::Template(args) => commands::handle_template(args, &cx).await?,
    }

    Ok(())
}

/// Sets up the subscriber from `-v`/`-q`; `RUST_LOG` overrides both.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
