use crate::demo::{run_allocate, run_demo, AllocateArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intern_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Internship Allocation Engine",
    about = "Score students against companies and allocate internship positions",
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
    /// Allocate students from CSV exports and print the run report
    Allocate(AllocateArgs),
    /// Run the pipeline over the bundled five-student roster
    Demo(DemoArgs),
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
        Command::Allocate(args) => run_allocate(args),
        Command::Demo(args) => run_demo(args),
    }
}
