//! Appointment services.
//!
//! - [`booking::BookingEngine`] -- the only writer to the booking ledger.
//! - [`availability::AvailabilityProjector`] -- read-only per-date projection
//!   of catalog, calendar and ledger.
//!
//! Handlers stay thin: they parse input, pick the caller identity, and call
//! into these services.

pub mod availability;
pub mod booking;

pub use availability::AvailabilityProjector;
pub use booking::BookingEngine;
