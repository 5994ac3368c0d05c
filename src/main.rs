use anyhow::Context;
use coinex_client::{CoinexClient, DepthLimit, DepthStreams, ExchangeConfig};
use std::time::Duration;
use tracing::{info, warn};

const MARKET: &str = "BTCUSD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Credentials are optional; without them only public topics work.
    let config = ExchangeConfig::from_env("COINEX").unwrap_or_else(|_| ExchangeConfig::read_only());

    let client = CoinexClient::builder(config)
        .futures_only()
        .connect()
        .await
        .context("failed to connect to the futures stream")?;
    let futures = client.futures();

    let book = futures
        .depth_query(MARKET, DepthLimit::L5, "0")
        .await
        .context("depth query failed")?;
    info!(market = MARKET, "Order book: {}", book);

    futures
        .deals_subscribe([MARKET], |params| info!("Deals update: {}", params))
        .await
        .context("deals subscription failed")?;

    tokio::time::sleep(Duration::from_secs(10)).await;

    if let Err(e) = futures.deals_unsubscribe().await {
        warn!("Unsubscribe failed: {}", e);
    }
    client.close().await;
    Ok(())
}
