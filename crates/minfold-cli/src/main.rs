use clap::Parser;
use minfold_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = run(cli).await;
    std::process::exit(minfold_cli::exit_code(&result));
}
