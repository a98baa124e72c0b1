use clap::Parser;
use global_actions_cli::Cli;
use global_actions_cli::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_main(Cli::parse()).await
}
