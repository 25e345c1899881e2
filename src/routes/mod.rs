use axum::{
    extract::FromRequest,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_role};
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

pub mod auth;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;

/// `axum::Json` whose rejections come back as JSON 400s.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/products", get(products::list_products))
        .route("/api/products/seed", post(products::seed_products));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/checkout", post(checkout::checkout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // layers run bottom-up: the token is verified before the role is checked
    let admin_routes = Router::new()
        .route("/api/orders", get(orders::list_orders_with_owner))
        .route_layer(middleware::from_fn_with_state(Role::Admin, require_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback(health::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
