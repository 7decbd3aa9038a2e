//! HTTP surface for the three views: catalog/home, player and admin.

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, start_http_server, AppContext};
