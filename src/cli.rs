use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

// ///////////// //
// CLI interface //
// ///////////// //

/// printboard - Status board and unlock kiosk for a fleet of 3D printers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Treat every moment as inside the free access window.
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connects to the server and runs the kiosk, reading touches from stdin.
    Run,
    /// Tells whether the free access window is active.
    Window {
        /// Local wall-clock time to check instead of now, e.g. 2026-10-23T18:31:00.
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Prints the channel topics in use.
    Topics,
}
