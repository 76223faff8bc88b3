use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::request::{parse_successful_response, request_default_headers};

use super::*;

const URL_ROOT: &str = "https://pixabay.com/api/";

const API_KEY_VAR: &str = "PIXABAY_API_KEY";

/// pixabay rejects per_page values below this
const MINIMUM_PAGE_SIZE: usize = 3;

#[derive(Debug, Deserialize)]
pub struct PixabayHit {
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PixabayResponse {
    #[serde(default)]
    pub hits: Vec<PixabayHit>,
}

pub struct PixabaySearch {
    pub client: Arc<Client>,
    pub credentials: SharedCredentials,
}

fn orientation_value(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Landscape => "horizontal",
        Orientation::Portrait => "vertical",
    }
}

fn collect_hits(response: PixabayResponse) -> SearchOutcome {
    let urls = response
        .hits
        .into_iter()
        .map(|hit| hit.large_image_url)
        .collect::<Vec<_>>();
    if urls.is_empty() {
        SearchOutcome::Empty
    } else {
        SearchOutcome::Hits(urls)
    }
}

#[async_trait]
impl Provider for PixabaySearch {
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
        AllProviders::PixabaySearch
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
            ("key", key),
            ("q", query.text.clone()),
            ("image_type", "photo".to_owned()),
            ("orientation", orientation_value(query.orientation).to_owned()),
            ("per_page", query.count.max(MINIMUM_PAGE_SIZE).to_string()),
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
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchOutcome::RateLimited);
        }
        let response_json = parse_successful_response::<PixabayResponse>(response).await?;
        Ok(collect_hits(response_json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_results() {
        let payload = r#"{
            "total": 4692,
            "totalHits": 500,
            "hits": [
                {
                    "id": 195893,
                    "pageURL": "https://pixabay.com/en/blossom-bloom-flower-195893/",
                    "largeImageURL": "https://pixabay.com/get/large.jpg",
                    "previewURL": "https://cdn.pixabay.com/photo/preview.jpg"
                }
            ]
        }"#;
        let response = serde_json::from_str::<PixabayResponse>(payload).unwrap();
        assert_eq!(
            collect_hits(response),
            SearchOutcome::Hits(vec!["https://pixabay.com/get/large.jpg".to_owned()])
        );
    }

    #[test]
    fn single_image_requests_keep_the_minimum_page_size() {
        let provider = PixabaySearch {
            client: Arc::new(Client::new()),
            credentials: Arc::new(parking_lot::RwLock::new(Some("k".to_owned()))),
        };
        let url = provider
            .search_url(&SearchQuery::single("Paris France landmark travel"))
            .unwrap();
        assert!(url.0.contains("per_page=3"));
        assert!(url.0.contains("orientation=horizontal"));
        assert!(url.0.contains("image_type=photo"));
    }
}
