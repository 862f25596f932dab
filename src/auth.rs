use actix_web::http::header::HeaderMap;
use base64::{engine::general_purpose, Engine as _};

use crate::config::BasicAuth;
use crate::error::ApiError;

/// Gate an endpoint on the configured credential. No configured credential
/// means the endpoint is open.
pub fn authorize(headers: &HeaderMap, expected: Option<&BasicAuth>) -> Result<(), ApiError> {
    match expected {
        Some(auth) => check_basic_auth(headers, auth),
        None => Ok(()),
    }
}

/// Check the `Authorization: Basic` header against the configured credential.
/// Any missing or malformed header is a plain 401, no detail leaks.
pub fn check_basic_auth(headers: &HeaderMap, expected: &BasicAuth) -> Result<(), ApiError> {
    let header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let encoded = header.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::Unauthorized)?;
    let credentials = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

    let (username, password) = credentials.split_once(':').ok_or(ApiError::Unauthorized)?;

    if username == expected.username && password == expected.password {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
