#[tokio::main]
async fn main() -> anyhow::Result<()> {
    proplayer_server::run().await
}
