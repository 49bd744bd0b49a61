//! HTTP surface: the axum router and its route handlers.

pub mod chat_routes;
pub mod http;
pub mod registry_routes;
