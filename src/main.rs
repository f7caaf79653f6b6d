mod cli;

use clap::{Parser, Subcommand};

use cli::analyze::AnalyzeArgs;
use cli::parse::ParseArgs;
use cli::recurrences::RecurrencesArgs;

#[derive(Parser)]
#[command(
    name = "bigo",
    version,
    about = "Static verifier for asymptotic time-complexity claims"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a source file and pretty-print its AST
    Parse(ParseArgs),
    /// Run the VC generator and print each function's enumerated paths
    Recurrences(RecurrencesArgs),
    /// Verify the cost templates declared in a source file
    Analyze(AnalyzeArgs),
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Parse(args) => cli::parse::cmd_parse(args),
        Command::Recurrences(args) => cli::recurrences::cmd_recurrences(args),
        Command::Analyze(args) => cli::analyze::cmd_analyze(args),
    }
}
