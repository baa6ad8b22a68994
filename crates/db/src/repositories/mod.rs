//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any `PgExecutor` where the call is also made from
//! inside a transaction) as the first argument.

pub mod appointment_repo;
pub mod shop_schedule_repo;
pub mod time_slot_repo;

pub use appointment_repo::AppointmentRepo;
pub use shop_schedule_repo::ShopScheduleRepo;
pub use time_slot_repo::TimeSlotRepo;
