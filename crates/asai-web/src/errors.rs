use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use asai_providers::ProviderError;

use super::page::error_page;

pub(super) fn bad_gateway_response(err: &ProviderError) -> Response {
    (StatusCode::BAD_GATEWAY, Html(error_page(&err.to_string()))).into_response()
}
