mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "deskmate",
    version,
    about = "Launches DesktopMate as a desktop overlay and supervises it from the system tray"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch DesktopMate and supervise it from the tray (default)
    Run,
    /// Show whether DesktopMate is running
    Status,
    /// List the DesktopMate windows the locator would consider
    Windows,
    /// Create the default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(),
        Commands::Status => commands::status::execute(),
        Commands::Windows => commands::windows::execute(),
        Commands::Init { force } => commands::init::execute(force),
        Commands::Config => commands::config::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
