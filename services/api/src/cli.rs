use crate::command::{run_check, CheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use compliance_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Compliance Portal",
    about = "Run consent-gated background checks with an append-only audit trail",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a single check from the command line and print the receipt
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args).await,
    }
}
