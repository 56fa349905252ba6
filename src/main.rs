//! secret-pusher: merge a local .env file into an AWS Secrets Manager secret

use std::process::ExitCode;

use secret_pusher::cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
