use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use vista::resolver::cooldown::{CooldownTracker, SystemClock};
use vista::resolver::{get_provider_list, ImageResolver};
use vista::server::run_server;

/// Bounds every provider round trip so one hung provider can't stall the
/// fallback chain
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PORT: u16 = 8080;

async fn run() -> anyhow::Result<()> {
    let client = Arc::new(Client::builder().timeout(PROVIDER_TIMEOUT).build()?);
    let providers = get_provider_list(&client);
    let resolver = Arc::new(ImageResolver::new(
        providers,
        CooldownTracker::new(Arc::new(SystemClock)),
    ));
    let port = vista::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    run_server(resolver, port).await;
    Ok(())
}

#[tokio::main]
async fn main() {
    better_panic::install();
    vista::dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(_) => {}
        Err(err) => eprintln!("{:?}", err),
    };
}
