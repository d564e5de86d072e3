//! Example: stream one-minute candles for BTCUSD
//!
//! Connects to the live market data feed, prints every frame (heartbeats
//! included) and keeps the stream alive until Ctrl+C.
//!
//! Run with: cargo run --example stream_candles
//!
//! Requires GEMINI_API_KEY and GEMINI_API_SECRET. Set GEMINI_MODE=live for
//! production; the default is sandbox. RUST_LOG=gemini_ws=debug shows
//! reconnects and subscription replay.

use gemini_sdk::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let gemini = Gemini::from_env()?;
    println!("Streaming BTCUSD candles from {} ...", gemini.mode());

    let heartbeats = Arc::new(AtomicU64::new(0));
    let counter = heartbeats.clone();

    let socket = gemini
        .socket(format!("{}/BTCUSD", MARKET_DATA_PATH))
        .subscribe(Subscription::market_data("candles_1m", ["BTCUSD"]))
        .on_heartbeat(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .on_close(|| println!("[closed]"))
        .on_error(|err| eprintln!("[error] {}", err))
        .connect(|frame| println!("{}", frame))?;

    tokio::signal::ctrl_c().await?;
    println!(
        "\nShutting down after {} connection(s), {} heartbeat(s)",
        socket.connections(),
        heartbeats.load(Ordering::Relaxed)
    );
    socket.close().await;

    Ok(())
}
