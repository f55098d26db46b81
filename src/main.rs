use spreadlog::SpreadlogError;
use spreadlog::client::PriceClient;
use spreadlog::config::fetch_config;
use spreadlog::history::{InMemoryPriceHistory, collect_current_prices, read_price_history};

#[tokio::main]
async fn main() -> Result<(), SpreadlogError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    // A missing .env file is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();

    let app_config = fetch_config()?;
    let client = PriceClient::from_config(&app_config.robinhood)?;
    let store = InMemoryPriceHistory::new();

    let recorded = collect_current_prices(&client, &store, &app_config.symbols).await;
    tracing::info!(
        recorded = recorded.len(),
        requested = app_config.symbols.len(),
        "Collection pass finished"
    );

    for (symbol, entries) in read_price_history(&store).await? {
        println!("{symbol}");
        for entry in entries {
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }

    Ok(())
}
