use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use log::info;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::request::HttpError;

/// A search url is only transparently available to providers
#[derive(Debug, Clone)]
pub struct SearchUrl(pub String);

/// How the requested photo should be framed. Card-style callers want
/// landscape shots, the gallery wants portrait ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Parameter value understood by unsplash and pexels. Pixabay spells
    /// these differently and maps them itself.
    pub fn api_value(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// A single image lookup as seen by providers
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub orientation: Orientation,
    pub count: usize,
}

impl SearchQuery {
    /// One landscape image, the shape every card endpoint asks for
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            orientation: Orientation::Landscape,
            count: 1,
        }
    }

    /// A page worth of portrait images for gallery rendering
    pub fn gallery(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            orientation: Orientation::Portrait,
            count: 10,
        }
    }
}

/// What a provider round trip produced. Failures that should simply move
/// the chain along are modelled as [`ProviderFailure`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one image, best available resolution first
    Hits(Vec<String>),
    /// The provider answered but had nothing for this query
    Empty,
    /// The provider told us to back off
    RateLimited,
}

#[derive(Error, Debug)]
pub enum ProviderFailure {
    #[error("Error formatting URL")]
    Url,
    #[error("Provider has no credential loaded")]
    MissingCredential,
    #[error("Failed to process response from request")]
    Http(#[from] HttpError),
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(err: reqwest::Error) -> Self {
        ProviderFailure::Http(HttpError::ReqwestError(err))
    }
}

pub type SharedCredentials = Arc<RwLock<Option<String>>>;

/// Reads a provider key out of the environment once at construction.
/// A missing or empty variable leaves the provider permanently skipped
/// rather than failing requests at call time.
pub fn credentials_from_env(var: &str) -> SharedCredentials {
    let value = env::var(var).ok().filter(|key| !key.is_empty());
    if value.is_none() {
        info!("{} is not set, not initializing its provider", var);
    }
    Arc::new(RwLock::new(value))
}

pub struct ProviderInput {
    pub client: Arc<Client>,
}

/// Providers represent a single stock photo search API that can resolve
/// free text into image urls
#[async_trait]
pub trait Provider: Sync + Send {
    fn new(input: ProviderInput) -> Self
    where
        Self: Sized;

    /// a string that uniquely identifies this provider
    fn id(&self) -> AllProviders;

    /// Whether the provider has the credential it needs to be queried.
    /// Unconfigured providers are never sent requests
    fn configured(&self) -> bool;

    /// How long the provider is benched after signalling a rate limit
    fn cooldown_window(&self) -> Duration {
        Duration::hours(1)
    }

    /// Resolve the query into the provider's search endpoint url
    fn search_url(&self, query: &SearchQuery) -> Result<SearchUrl, ProviderFailure>;

    /// Run the search for one query and classify the response
    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, ProviderFailure>;
}

#[derive(Display, Debug, Hash, Copy, Clone, Serialize, EnumString, EnumIter, PartialEq, Eq)]
pub enum AllProviders {
    #[strum(serialize = "unsplash.search")]
    UnsplashSearch,
    #[strum(serialize = "pexels.search")]
    PexelsSearch,
    #[strum(serialize = "pixabay.search")]
    PixabaySearch,
}
