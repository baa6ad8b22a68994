pub mod admin;
pub mod appointments;
