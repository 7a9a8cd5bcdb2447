use colored::Colorize;
use mrake::RakeError;
use std::process;

fn main() {
    match mrake::cli::run() {
        Ok(()) => {}
        Err(RakeError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("{}", "mrake aborted!".red().bold());
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
