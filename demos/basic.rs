//! # Basic bus example
//!
//! Three subscriptions, one producer, and a slow consumer that runs out of backlog.
//!
//! ## Run
//! ```bash
//! RUST_LOG=fanbus=debug cargo run --example basic
//! ```

use std::time::Duration;

use fanbus::{Bus, BusConfig};
use tracing_subscriber::EnvFilter;

/// Payloads carried on this bus, one variant per message kind.
#[derive(Debug)]
enum Quote {
    /// kind = "price"
    Price { symbol: &'static str, cents: u64 },
    /// kind = "halt"
    Halt,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "fanbus=warn".into()))
        .init();

    let bus: Bus<Quote> = Bus::new(BusConfig::with_capacity(4));
    bus.start();

    let feed = bus.subscribe("feed").await?;
    let mut ticker = bus.subscribe("ticker").await?;
    let mut archive = bus.subscribe("archive").await?;

    let consumer = tokio::spawn(async move {
        loop {
            let msg = ticker.receive().await?;
            match &msg.payload {
                Quote::Price { symbol, cents } => println!("[ticker] {symbol} {cents}c"),
                Quote::Halt => break,
            }
        }
        Ok::<_, fanbus::BusError>(ticker)
    });

    for (symbol, cents) in [("ACME", 1200), ("ACME", 1210), ("INIT", 310), ("ACME", 1190)] {
        feed.publish("price", Quote::Price { symbol, cents }).await?;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    feed.publish("halt", Quote::Halt).await?;

    let ticker = consumer.await??;

    // archive never drained: it kept capacity - 1 messages and missed the rest
    println!("{bus}");
    loop {
        match archive.receive_timeout(Duration::from_millis(10)).await {
            Ok(msg) => println!("[archive] {} {:?}", msg.kind, msg.payload),
            Err(err) if err.is_retryable() => {
                println!("[archive] drained ({})", err.as_label());
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    println!("{ticker}");

    bus.shutdown().await;
    Ok(())
}
