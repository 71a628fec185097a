use clap::Parser;
use quantsig::cli::{run, Cli};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    quantsig::logging::init();
    run(Cli::parse()).await
}
