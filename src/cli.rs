// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, the global choice overrides, and output flags.

use clap::{Args, Parser, Subcommand};
use craftpod::config::OverrideRecord;
use craftpod::output::OutputMode;
use craftpod::types::{Audio, Display, Gpu, Runtime};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "craftpod")]
#[command(about = "Run the game launcher in a container with host GPU, display, and audio")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate the host and start the launcher container (default)
    Start,

    /// Stop and remove the launcher container
    Stop,

    /// Stop the launcher container, then start it again
    Restart,

    /// Show container logs
    Logs {
        /// Follow log output
        #[arg(short, long)]
        follow: bool,

        /// Number of lines to show from the end of the logs
        #[arg(long)]
        tail: Option<u32>,
    },

    /// Show whether the launcher container is running
    Status,

    /// Show detected hardware and validate the system without starting anything
    Doctor,

    /// Inspect or reset saved preferences
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print saved preferences (default)
    Show,
    /// Print the preference file location
    Path,
    /// Delete the preference file
    Reset,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Container runtime: podman, docker
    #[arg(long, global = true)]
    pub runtime: Option<Runtime>,

    /// GPU type: nvidia, amd, none
    #[arg(long, global = true)]
    pub gpu: Option<Gpu>,

    /// Display server: x11, wayland
    #[arg(long, global = true)]
    pub display: Option<Display>,

    /// Audio system: pulseaudio, none
    #[arg(long, global = true)]
    pub audio: Option<Audio>,

    /// Start the container in the background
    #[arg(short, long, global = true)]
    pub detached: bool,

    /// Recreate the container even if its configuration is unchanged
    #[arg(long, global = true)]
    pub force_recreate: bool,

    /// Skip the confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Accepted for compatibility; the terminal is the only interface
    #[arg(long, global = true, hide = true)]
    pub no_gui: bool,

    /// Save the command-line choices as preferences
    #[arg(long, global = true)]
    pub save: bool,

    /// Preference file to use instead of the per-user default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the compose fragment files
    #[arg(long, global = true, value_name = "DIR")]
    pub compose_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only results and problems
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> OverrideRecord {
        OverrideRecord {
            runtime: self.runtime,
            gpu: self.gpu,
            display: self.display,
            audio: self.audio,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    /// Extra arguments for `compose up`.
    pub fn up_args(&self) -> Vec<String> {
        let mut args = vec!["up".to_string()];
        if self.detached {
            args.push("-d".to_string());
        }
        if self.force_recreate {
            args.push("--force-recreate".to_string());
        }
        args
    }
}
