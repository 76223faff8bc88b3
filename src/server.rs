use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{AddExtensionLayer, Router};
use log::info;

use crate::api::v1::{v1_city_image, v1_country_image, v1_place_gallery};
use crate::api::Context;
use crate::resolver::ImageResolver;

pub async fn run_server(resolver: Arc<ImageResolver>, port: u16) {
    info!("Starting server");
    let ctx = Arc::new(Context { resolver });
    let router = Router::new()
        .route("/v1/country-image", get(v1_country_image))
        .route("/v1/city-image", get(v1_city_image))
        .route("/v1/place-gallery", get(v1_place_gallery))
        .layer(AddExtensionLayer::new(ctx));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .await
        .unwrap();
}
