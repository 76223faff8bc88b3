use std::convert::Infallible;
use std::sync::Arc;

use axum::body::{Bytes, Full};
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::resolver::ImageResolver;

pub mod v1;

pub struct Context {
    pub resolver: Arc<ImageResolver>,
}

/// The resolver itself has no error path, the only thing handlers can
/// reject is a missing query parameter
pub enum AppError {
    MissingParam(&'static str),
}

impl IntoResponse for AppError {
    type Body = Full<Bytes>;
    type BodyError = Infallible;

    fn into_response(self) -> Response<Self::Body> {
        let (status, error_message) = match self {
            AppError::MissingParam(name) => {
                (StatusCode::BAD_REQUEST, format!("{} is required", name))
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
