//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the request payloads that mutate it

pub mod appointment;
pub mod shop_schedule;
pub mod status;
pub mod time_slot;
