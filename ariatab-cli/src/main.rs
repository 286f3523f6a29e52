use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    ariatab_cli::run().await
}
