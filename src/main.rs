use anyhow::Result;
use biochat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
