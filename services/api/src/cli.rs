use crate::batch::{run_batch, RunArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use seat_allocation::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Seat Allocation Service",
    about = "Run seat allocation processes over HTTP or from the command line",
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
    /// Run one allocation process and print a summary
    Run(RunArgs),
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
        Command::Run(args) => run_batch(args),
    }
}
