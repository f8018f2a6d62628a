//! Continuous inventory monitor
//!
//! Prints every tag until Ctrl-C, then stops the inventory.

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use uhfprime::{InventoryRequest, Reader, ReaderEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var("READER_HOST").unwrap_or_else(|_| "192.168.1.190".to_string());
    let port: u16 = std::env::var("READER_PORT")
        .unwrap_or_else(|_| "2022".to_string())
        .parse()
        .context("READER_PORT must be a port number")?;

    let reader = Reader::new(host, port);
    let mut events = reader.subscribe();

    reader.connect().await?;
    println!("✓ Connected to {}", reader.remote_addr());

    reader.start_inventory(InventoryRequest::continuous()).await?;
    println!("✓ Inventory running, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(ReaderEvent::TagReported(tag)) => println!("{}", tag),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    eprintln!("Missed {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    reader.stop_inventory().await?;
    println!("✓ Inventory stopped");

    reader.disconnect().await;
    Ok(())
}
