use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::request::{parse_successful_response, request_default_headers};

use super::*;

const URL_ROOT: &str = "https://api.pexels.com/v1/search";

const API_KEY_VAR: &str = "PEXELS_API_KEY";

#[derive(Debug, Deserialize)]
pub struct PexelsPhotoSrc {
    pub large: String,
}

#[derive(Debug, Deserialize)]
pub struct PexelsPhoto {
    pub src: PexelsPhotoSrc,
}

#[derive(Debug, Deserialize)]
pub struct PexelsResponse {
    #[serde(default)]
    pub photos: Vec<PexelsPhoto>,
}

pub struct PexelsSearch {
    pub client: Arc<Client>,
    pub credentials: SharedCredentials,
}

fn collect_hits(response: PexelsResponse) -> SearchOutcome {
    let urls = response
        .photos
        .into_iter()
        .map(|photo| photo.src.large)
        .collect::<Vec<_>>();
    if urls.is_empty() {
        SearchOutcome::Empty
    } else {
        SearchOutcome::Hits(urls)
    }
}

#[async_trait]
impl Provider for PexelsSearch {
    fn new(input: ProviderInput) -> Self
    where
        Self: Sized,
    {
        Self {
            client: Arc::clone(&input.client),
            credentials: credentials_from_env(API_KEY_VAR),
        }
    }
    fn id(&self) -> AllProviders {
        AllProviders::PexelsSearch
    }
    fn configured(&self) -> bool {
        self.credentials.read().is_some()
    }

    fn search_url(&self, query: &SearchQuery) -> Result<SearchUrl, ProviderFailure> {
        // pexels takes its key in a header, the url carries only the search
        let params = vec![
            ("query", query.text.clone()),
            ("per_page", query.count.to_string()),
            ("orientation", query.orientation.api_value().to_owned()),
        ];
        let url = Url::parse_with_params(URL_ROOT, &params)
            .ok()
            .ok_or(ProviderFailure::Url)?;
        Ok(SearchUrl(url.as_str().to_owned()))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, ProviderFailure> {
        let key = self
            .credentials
            .read()
            .clone()
            .ok_or(ProviderFailure::MissingCredential)?;
        let url = self.search_url(query)?;
        let response = self
            .client
            .get(&url.0)
            .headers(request_default_headers())
            .header(AUTHORIZATION, key)
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchOutcome::RateLimited);
        }
        let response_json = parse_successful_response::<PexelsResponse>(response).await?;
        Ok(collect_hits(response_json))
    }
}
