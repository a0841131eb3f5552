use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of users matched or affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 3)]
    pub count: u64,
}

impl From<u64> for CountResponse {
    fn from(count: u64) -> Self {
        Self { count }
    }
}

/// Empty 204 response for successful writes by id
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
