use std::error::Error;

use ai_llm_service::telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env when present.
    // A missing file is fine; an unreadable or invalid one is not.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    telemetry::init(telemetry::env_filter_or("info"))?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting prof-reviews backend");

    api::start().await?;

    Ok(())
}
