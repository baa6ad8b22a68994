//! Domain primitives for the tailor shop appointment service.
//!
//! This crate has zero internal dependencies so the repository layer, the
//! HTTP server and any future tooling can all share the same rules for
//! slot capacity, calendar checks and booking state transitions.

pub mod appointment;
pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod error;
pub mod roles;
pub mod types;
