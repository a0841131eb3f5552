//! Shared request/response types for the HTTP layer.

mod pagination;
mod response;

pub use pagination::PaginationParams;
pub use response::{CountResponse, NoContent};
