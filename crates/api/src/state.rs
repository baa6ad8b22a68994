use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::{AvailabilityProjector, BookingEngine};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tailor_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for booking lifecycle events.
    pub event_bus: Arc<tailor_events::EventBus>,
}

impl AppState {
    /// The booking engine bound to this state's pool, bus and lock timeout.
    pub fn booking_engine(&self) -> BookingEngine<'_> {
        BookingEngine::new(
            &self.pool,
            &self.event_bus,
            self.config.booking_lock_timeout_ms,
        )
    }

    /// The read-only availability projector over this state's pool.
    pub fn availability(&self) -> AvailabilityProjector<'_> {
        AvailabilityProjector::new(&self.pool)
    }
}
