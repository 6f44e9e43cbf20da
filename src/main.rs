// ABOUTME: Entry point for the craftpod CLI application.
// ABOUTME: Parses arguments, initializes tracing, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use craftpod::error::Result;
use craftpod::output::Output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.no_gui {
        tracing::debug!("--no-gui has no effect; the terminal is the only interface");
    }

    let mut output = Output::new(cli.global.output_mode());
    let result = run(cli, &mut output).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let args = cli.global;
    match cli.command.unwrap_or(Commands::Start) {
        Commands::Start => commands::start(&args, output).await,
        Commands::Stop => commands::stop(&args, output).await,
        Commands::Restart => commands::restart(&args, output).await,
        Commands::Logs { follow, tail } => commands::logs(&args, follow, tail, output).await,
        Commands::Status => commands::status(&args, output).await,
        Commands::Doctor => commands::doctor(&args, output).await,
        Commands::Config { action } => {
            commands::config(&args, action.unwrap_or(ConfigAction::Show), output)
        }
    }
}
