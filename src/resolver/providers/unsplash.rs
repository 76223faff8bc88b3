use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::request::{parse_successful_response, request_default_headers};

use super::*;

const URL_ROOT: &str = "https://api.unsplash.com/search/photos";

const ACCESS_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";

#[derive(Debug, Deserialize)]
pub struct UnsplashImageUrls {
    pub regular: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashResult {
    pub urls: UnsplashImageUrls,
}

#[derive(Debug, Deserialize)]
pub struct UnsplashResponse {
    #[serde(default)]
    pub results: Vec<UnsplashResult>,
}

pub struct UnsplashSearch {
    pub client: Arc<Client>,
    pub credentials: SharedCredentials,
}

fn collect_hits(response: UnsplashResponse) -> SearchOutcome {
    let urls = response
        .results
        .into_iter()
        .map(|result| result.urls.regular)
        .collect::<Vec<_>>();
    if urls.is_empty() {
        SearchOutcome::Empty
    } else {
        SearchOutcome::Hits(urls)
    }
}

#[async_trait]
impl Provider for UnsplashSearch {
    fn new(input: ProviderInput) -> Self
    where
        Self: Sized,
    {
        Self {
            client: Arc::clone(&input.client),
            credentials: credentials_from_env(ACCESS_KEY_VAR),
        }
    }
    fn id(&self) -> AllProviders {
        AllProviders::UnsplashSearch
    }
    fn configured(&self) -> bool {
        self.credentials.read().is_some()
    }

    fn search_url(&self, query: &SearchQuery) -> Result<SearchUrl, ProviderFailure> {
        let key = self
            .credentials
            .read()
            .clone()
            .ok_or(ProviderFailure::MissingCredential)?;
        let params = vec![
            ("query", query.text.clone()),
            ("orientation", query.orientation.api_value().to_owned()),
            ("per_page", query.count.to_string()),
            ("client_id", key),
        ];
        let url = Url::parse_with_params(URL_ROOT, &params)
            .ok()
            .ok_or(ProviderFailure::Url)?;
        Ok(SearchUrl(url.as_str().to_owned()))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, ProviderFailure> {
        let url = self.search_url(query)?;
        let response = self
            .client
            .get(&url.0)
            .headers(request_default_headers())
            .send()
            .await?;
        let status = response.status();
        // unsplash reports an exhausted demo quota as a 403, not a 429
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchOutcome::RateLimited);
        }
        let response_json = parse_successful_response::<UnsplashResponse>(response).await?;
        Ok(collect_hits(response_json))
    }
}
