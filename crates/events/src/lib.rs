//! Appointment event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`AppointmentEvent`] -- booking lifecycle event envelope that
//!   notification services subscribe to.
//! - [`EventLog`] -- background subscriber that records every event in the
//!   structured log.
//!
//! Publishing is fire-and-forget: a missing or lagging subscriber never
//! affects the booking that produced the event.

pub mod bus;
pub mod log;

pub use bus::{AppointmentEvent, EventBus};
pub use log::EventLog;
