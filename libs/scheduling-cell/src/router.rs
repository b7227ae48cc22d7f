// libs/scheduling-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post, delete},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, SchedulingState};

pub fn scheduling_routes(state: SchedulingState) -> Router {
    // Every scheduling operation acts on behalf of a signed-in operator
    let protected_routes = Router::new()
        .route("/slots", get(handlers::get_slots))
        .route("/dates/{date}", get(handlers::get_date_status))
        .route("/bookings", post(handlers::create_booking))
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/today", get(handlers::todays_appointments))
        .route("/appointments/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/appointments/{appointment_id}", delete(handlers::delete_appointment))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
