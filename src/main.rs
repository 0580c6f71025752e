#[tokio::main]
async fn main() -> anyhow::Result<()> {
    altitrack_lib::run().await
}
