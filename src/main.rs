#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = bandboard::run().await {
        eprintln!("bandboard fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
