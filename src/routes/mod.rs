pub mod api;
pub mod auth_middleware;
pub mod cors;

pub use api::create_routes;
