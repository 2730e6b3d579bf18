mod cli;

use clap::Parser;
use conlog_core::BuildResult;

fn main() {
    cli::install_signal_handlers();

    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(result) => std::process::exit(result.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(BuildResult::Failure.exit_code());
        }
    }
}
