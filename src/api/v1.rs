use std::iter::once;
use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::Json;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::api::{AppError, Context};
use crate::resolver::SearchQuery;

#[derive(Serialize)]
pub struct ImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Serialize)]
pub struct GalleryResponse {
    pub images: Vec<String>,
}

#[derive(Deserialize)]
pub struct CountryImageParams {
    country: Option<String>,
}

pub async fn v1_country_image(
    Query(params): Query<CountryImageParams>,
    Extension(state): Extension<Arc<Context>>,
) -> Result<Json<ImageResponse>, AppError> {
    let country = params
        .country
        .filter(|country| !country.trim().is_empty())
        .ok_or(AppError::MissingParam("country"))?;
    let query = SearchQuery::single(format!("{} landscape nature", country));
    let image_url = state.resolver.resolve(&query).await;
    Ok(Json(ImageResponse { image_url }))
}

#[derive(Deserialize)]
pub struct CityImageParams {
    city: Option<String>,
    country: Option<String>,
}

/// The country is optional context, skipping it entirely beats searching
/// for a dangling space
fn city_query_text(city: String, country: Option<String>) -> String {
    once(city)
        .chain(
            country
                .into_iter()
                .filter(|country| !country.trim().is_empty()),
        )
        .chain(once("landmark travel".to_owned()))
        .join(" ")
}

pub async fn v1_city_image(
    Query(params): Query<CityImageParams>,
    Extension(state): Extension<Arc<Context>>,
) -> Result<Json<ImageResponse>, AppError> {
    let city = params
        .city
        .filter(|city| !city.trim().is_empty())
        .ok_or(AppError::MissingParam("city"))?;
    let query = SearchQuery::single(city_query_text(city, params.country));
    let image_url = state.resolver.resolve(&query).await;
    Ok(Json(ImageResponse { image_url }))
}

#[derive(Deserialize)]
pub struct PlaceGalleryParams {
    query: Option<String>,
}

pub async fn v1_place_gallery(
    Query(params): Query<PlaceGalleryParams>,
    Extension(state): Extension<Arc<Context>>,
) -> Result<Json<GalleryResponse>, AppError> {
    let text = params
        .query
        .filter(|query| !query.trim().is_empty())
        .ok_or(AppError::MissingParam("query"))?;
    let images = state
        .resolver
        .resolve_gallery(&SearchQuery::gallery(text))
        .await;
    Ok(Json(GalleryResponse { images }))
}
