use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    carbon_buddy::logging::init();
    carbon_buddy::run().await
}
