//! Dragon Mart Online backend: accounts with bearer-token auth, a product
//! catalogue, and order intake over a JSON HTTP API.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod orders;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
