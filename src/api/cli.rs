use crate::api::commands::{
    run_check_config, run_levy, run_max_loan, CheckConfigArgs, LevyArgs, MaxLoanArgs,
};
use crate::api::server;
use crate::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "realty-finance",
    about = "Regulatory levy, debt-ratio, and maximum-loan calculations over HTTP or the command line",
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
    /// Compute the maximum loan an applicant qualifies for
    MaxLoan(MaxLoanArgs),
    /// Evaluate a named levy schedule against a base value
    Levy(LevyArgs),
    /// Validate a regulatory configuration document without starting the service
    CheckConfig(CheckConfigArgs),
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
        Command::MaxLoan(args) => run_max_loan(args),
        Command::Levy(args) => run_levy(args),
        Command::CheckConfig(args) => run_check_config(args),
    }
}
