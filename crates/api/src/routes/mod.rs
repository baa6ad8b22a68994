pub mod appointments;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /appointments/available                        legacy open times (public)
/// /appointments/slots-with-availability          per-slot status (public)
/// /appointments/check                            single-slot check (public)
/// /appointments/book                             book (auth)
/// /appointments/promote                          confirm cart hold (auth)
/// /appointments/cancel/{slot_id}                 cancel (auth, owner or admin)
/// /appointments/user-slots                       caller's bookings (auth)
/// /appointments/{id}                             one booking (auth, owner or admin)
///
/// /appointments/admin/time-slots                 list catalog (admin)
/// /appointments/admin/time-slots/update          update capacity (admin)
/// /appointments/admin/availability               raw counts (admin)
/// /appointments/admin/schedule                   weekly schedule (admin)
/// /appointments/admin/schedule/{day_of_week}     open/close a day (admin)
/// /appointments/admin/complete/{order_item_id}   complete order item (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/appointments", appointments::router())
}
