// src/main.rs

use assetline::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("assetline error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
