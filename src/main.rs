use clap::Parser;

use docstore::cli;
use docstore::error::Result;
use docstore::storage::StorageClient;

use docstore::cli::Args;
use docstore::config::load_storage_config;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_storage_config(args.root.clone(), args.media_prefix.clone())?;
    let client = StorageClient::new(config)?;
    cli::run(args, client).await?;
    Ok(())
}
