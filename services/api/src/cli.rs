use crate::demo::{run_assess, run_batch_demo, AssessArgs, BatchDemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use matru_raksha::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MatruRaksha",
    about = "Maternal risk assessment and ASHA care coordination service",
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
    /// Score a single set of vitals offline and print the outcome
    Assess(AssessArgs),
    /// Seed a sample cohort, run one batch re-assessment and print the results
    Batch(BatchDemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Disable the periodic batch re-assessment clock
    #[arg(long)]
    pub(crate) no_batch: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch_demo(args),
    }
}
