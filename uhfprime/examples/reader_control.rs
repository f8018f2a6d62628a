//! Reader control example
//!
//! Dumps the reader parameters and pulses the relay.

use std::time::Duration;
use tokio::time::{sleep, timeout};
use uhfprime::{Reader, RelayAction};

#[tokio::main]
async fn main() -> uhfprime::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let host = std::env::var("READER_HOST").unwrap_or_else(|_| "192.168.1.190".to_string());

    let reader = Reader::new(host, 2022).with_address(0xFF);
    reader.connect().await?;

    println!("Reader connected!");

    // The session has no reply timeout of its own
    match timeout(Duration::from_secs(3), reader.get_all_parameters()).await {
        Ok(params) => {
            let params = params?;
            println!("Parameters: {}", params);
            println!("Antennas: {:?}", params.antennas());
        }
        Err(_) => println!("No reply to GET_ALL_PARAM"),
    }

    println!("Opening relay...");
    reader.pulse_relay(RelayAction::Open).await?;
    sleep(Duration::from_secs(1)).await;

    println!("Closing relay...");
    reader.pulse_relay(RelayAction::Close).await?;

    println!("Done!");

    reader.disconnect().await;

    Ok(())
}
