// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub message: String,
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        ApiError {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// An upstream provider call failed.
    pub fn external_error(message: impl Into<String>) -> Self {
        ApiError {
            message: message.into(),
            status: StatusCode::BAD_GATEWAY,
        }
    }

    /// The caller sent a value outside the accepted set.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
