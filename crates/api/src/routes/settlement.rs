//! Route definitions for outsource-team settlements and customer settlement
//! payments.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{customer_settlement, settlement};
use crate::state::AppState;

/// Routes mounted at `/settlements` (admin only).
///
/// ```text
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// POST   /{id}/payments                 -> add_payment
/// PUT    /{id}/payments/{payment_id}    -> update_payment
/// DELETE /{id}/payments/{payment_id}    -> delete_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(settlement::create))
        .route(
            "/{id}",
            get(settlement::get_by_id)
                .put(settlement::update)
                .delete(settlement::delete),
        )
        .route("/{id}/payments", post(settlement::add_payment))
        .route(
            "/{id}/payments/{payment_id}",
            put(settlement::update_payment).delete(settlement::delete_payment),
        )
}

/// Routes mounted at `/customer-settlements` (admin only).
///
/// ```text
/// POST   /{id}/payments                 -> add_payment
/// PUT    /{id}/payments/{payment_id}    -> update_payment
/// DELETE /{id}/payments/{payment_id}    -> delete_payment
/// ```
pub fn customer_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/payments", post(customer_settlement::add_payment))
        .route(
            "/{id}/payments/{payment_id}",
            put(customer_settlement::update_payment).delete(customer_settlement::delete_payment),
        )
}
