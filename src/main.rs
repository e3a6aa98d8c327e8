// src/main.rs

use dirmirror::{cli, logging, run_sync};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("dirmirror error: {err}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run_sync(args, None).await?;
    Ok(())
}
