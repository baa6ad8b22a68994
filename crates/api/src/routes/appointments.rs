//! Route definitions for appointment booking, mounted at `/appointments`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, appointments};
use crate::state::AppState;

/// ```text
/// GET    /available                      -> list_open_times
/// GET    /slots-with-availability        -> slots_with_availability
/// GET    /check                          -> check_slot
/// POST   /book                           -> book_slot
/// POST   /promote                        -> promote_hold
/// DELETE /cancel/{slot_id}               -> cancel_slot
/// GET    /user-slots                     -> list_user_slots
/// GET    /{id}                           -> get_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/available", get(appointments::list_open_times))
        .route(
            "/slots-with-availability",
            get(appointments::slots_with_availability),
        )
        .route("/check", get(appointments::check_slot))
        .route("/book", post(appointments::book_slot))
        .route("/promote", post(appointments::promote_hold))
        .route("/cancel/{slot_id}", delete(appointments::cancel_slot))
        .route("/user-slots", get(appointments::list_user_slots))
        .route("/{id}", get(appointments::get_booking))
        .nest("/admin", admin_router())
}

/// Admin routes mounted at `/appointments/admin`.
///
/// ```text
/// GET  /time-slots                  -> list_time_slots
/// PUT  /time-slots/update           -> update_time_slot
/// GET  /availability                -> slot_usage
/// GET  /schedule                    -> get_schedule
/// PUT  /schedule/{day_of_week}      -> update_schedule_day
/// POST /complete/{order_item_id}    -> complete_order_item
/// ```
fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/time-slots", get(admin::list_time_slots))
        .route("/time-slots/update", put(admin::update_time_slot))
        .route("/availability", get(admin::slot_usage))
        .route("/schedule", get(admin::get_schedule))
        .route("/schedule/{day_of_week}", put(admin::update_schedule_day))
        .route("/complete/{order_item_id}", post(admin::complete_order_item))
}
