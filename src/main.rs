use carprice::cli::Cli;
use carprice::logging::{self, *};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log = DEFAULT.new(o!("function" => "main"));
    debug!(log, "start"; "version" => env!("CARGO_PKG_VERSION"));

    let code = match carprice::cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(log, "failed"; "error" => %err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    };
    logging::flush();
    code
}
