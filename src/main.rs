#[tokio::main]
async fn main() -> anyhow::Result<()> {
    position_journal_lib::run().await
}
