//! Example: REST API calls
//!
//! Fetches a ticker and symbol rules, lists balances, then places a small
//! maker-or-cancel limit order far below the market.
//!
//! Run with: cargo run --example rest_trading
//!
//! NOTE: Uses the sandbox unless GEMINI_MODE=live. Requires GEMINI_API_KEY
//! and GEMINI_API_SECRET for the private calls.

use gemini_sdk::prelude::*;
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Gemini REST API Example ===\n");

    let gemini = Gemini::from_env()?;
    let api = gemini.api();

    // ========================================================================
    // PUBLIC ENDPOINTS
    // ========================================================================

    println!("--- Public Market Data ---\n");

    let ticker = api.get_ticker("BTCUSD").await?;
    println!("  Best Bid:   ${}", ticker.bid);
    println!("  Best Ask:   ${}", ticker.ask);
    println!("  Mid Price:  ${}", ticker.mid_price());
    println!("  Spread:     ${}", ticker.spread());

    let details = api.get_symbol_details("btcusd").await?;
    println!(
        "  {} tick size {}, minimum order {}",
        details.symbol, details.tick_size, details.min_order_size
    );

    // ========================================================================
    // PRIVATE ENDPOINTS
    // ========================================================================

    println!("\n--- Account ---\n");

    match api.get_balances().await {
        Ok(balances) => {
            for balance in balances.iter().filter(|b| !b.amount.is_zero()) {
                println!("  {}: {} (available {})", balance.currency, balance.amount, balance.available);
            }
        }
        Err(e) => println!("  Failed to get balances: {}", e),
    }

    println!("\n--- Trading ---\n");

    let price = (ticker.bid * dec!(0.5)).round_dp(2);
    let order = NewOrderRequest::limit("btcusd", OrderSide::Buy, details.min_order_size, price)
        .with_option(OrderExecutionOption::MakerOrCancel);

    match api.new_order(&order).await {
        Ok(status) => println!(
            "  Order {} live={} cancelled={}",
            status.order_id, status.is_live, status.is_cancelled
        ),
        Err(e) if e.is_retryable() => println!("  Temporary failure, try again: {}", e),
        Err(e) => println!("  Rejected [{}]: {}", e.reason(), e.message()),
    }

    Ok(())
}
