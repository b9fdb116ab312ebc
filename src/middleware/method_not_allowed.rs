use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Gives the bare 405 raised by the router a `detail` body, keeping its
/// `Allow` header.
pub async fn method_not_allowed_detail(method: Method, response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut detailed = AppError::MethodNotAllowed(method.to_string()).into_response();
    if let Some(allow) = allow {
        detailed.headers_mut().insert(header::ALLOW, allow);
    }
    detailed
}
