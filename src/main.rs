#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = coursedesk::run().await {
        eprintln!("coursedesk fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
