//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Appointment booking lifecycle (`appointment_statuses`).
    AppointmentStatus {
        Booked = 1,
        Completed = 2,
        Cancelled = 3,
    }
}

define_status_enum! {
    /// Whether a booking consumes capacity (`appointment_hold_states`).
    HoldState {
        /// Cart-stage soft hold.
        Unconfirmed = 1,
        /// Linked to an order item, or booked directly.
        Confirmed = 2,
    }
}

#[cfg(test)]
mod tests {
    use tailor_core::appointment::{
        HOLD_CONFIRMED, HOLD_UNCONFIRMED, STATUS_BOOKED, STATUS_CANCELLED, STATUS_COMPLETED,
    };

    use super::*;

    #[test]
    fn appointment_status_ids_match_core() {
        assert_eq!(AppointmentStatus::Booked.id(), STATUS_BOOKED);
        assert_eq!(AppointmentStatus::Completed.id(), STATUS_COMPLETED);
        assert_eq!(AppointmentStatus::Cancelled.id(), STATUS_CANCELLED);
    }

    #[test]
    fn hold_state_ids_match_core() {
        assert_eq!(HoldState::Unconfirmed.id(), HOLD_UNCONFIRMED);
        assert_eq!(StatusId::from(HoldState::Confirmed), HOLD_CONFIRMED);
    }
}
