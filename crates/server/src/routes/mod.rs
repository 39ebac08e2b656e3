pub mod angles;
pub mod branding;
pub mod clients;
pub mod expenses;
pub mod flow;
pub mod immersion;
pub mod scripts;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(angles::router())
        .merge(branding::router())
        .merge(clients::router())
        .merge(expenses::router())
        .merge(flow::router())
        .merge(immersion::router())
        .merge(scripts::router())
}
