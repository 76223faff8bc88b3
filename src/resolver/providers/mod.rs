use std::sync::Arc;

use reqwest::Client;
use strum::IntoEnumIterator;

pub use pexels::*;
pub use pixabay::*;
pub use providers::*;
pub use unsplash::*;

pub mod pexels;
pub mod pixabay;
mod providers;
pub mod unsplash;

pub type ProviderList = Vec<Arc<dyn Provider>>;

/// Builds one instance of every known provider. Credentials are read from
/// the environment here, unconfigured providers still get constructed so
/// the chain can re-check them on every resolution.
pub fn get_provider_list(client: &Arc<Client>) -> ProviderList {
    AllProviders::iter()
        .map(|provider_type| {
            let input = ProviderInput {
                client: Arc::clone(client),
            };
            let provider: Arc<dyn Provider> = match provider_type {
                AllProviders::UnsplashSearch => Arc::new(UnsplashSearch::new(input)),
                AllProviders::PexelsSearch => Arc::new(PexelsSearch::new(input)),
                AllProviders::PixabaySearch => Arc::new(PixabaySearch::new(input)),
            };
            provider
        })
        .collect()
}
