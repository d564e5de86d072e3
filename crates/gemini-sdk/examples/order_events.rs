//! Example: private order events
//!
//! Opens the authenticated order events stream and prints every frame.
//! The stream is re-signed and re-opened automatically if the server goes
//! quiet, so leaving this running across network blips is fine.
//!
//! Run with: cargo run --example order_events
//!
//! Requires GEMINI_API_KEY and GEMINI_API_SECRET (optional GEMINI_MODE).

use gemini_sdk::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let gemini = Gemini::from_env()?;

    // Tighter watchdog than the default
    let reconnect = ReconnectConfig::default()
        .with_watchdog_interval(Duration::from_secs(3))
        .with_retry_delay(Duration::from_secs(2));

    let socket = gemini
        .socket(ORDER_EVENTS_PATH)
        .reconnect_config(reconnect)
        .on_close(|| println!("[closed]"))
        .on_error(|err| eprintln!("[error] {}", err))
        .connect(|frame| println!("{}", frame))?;

    println!("Listening on {} (Ctrl+C to stop)", socket.url());

    tokio::signal::ctrl_c().await?;
    socket.close().await;

    Ok(())
}
