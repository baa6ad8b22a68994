//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tailor_core::types::DbId;
use tokio::sync::broadcast;

pub const APPOINTMENT_BOOKED: &str = "appointment.booked";
pub const APPOINTMENT_CONFIRMED: &str = "appointment.confirmed";
pub const APPOINTMENT_CANCELLED: &str = "appointment.cancelled";
pub const APPOINTMENT_COMPLETED: &str = "appointment.completed";

// ---------------------------------------------------------------------------
// AppointmentEvent
// ---------------------------------------------------------------------------

/// Something happened to a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentEvent {
    /// Dot-separated event name, e.g. `"appointment.booked"`.
    pub event_type: String,

    pub booking_id: DbId,

    /// Customer who owns the booking.
    pub owner_id: DbId,

    /// User whose request caused the event, when different from the owner.
    pub actor_user_id: Option<DbId>,

    /// Event-specific details (date, time, service type, ...).
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl AppointmentEvent {
    pub fn new(event_type: impl Into<String>, booking_id: DbId, owner_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            booking_id,
            owner_id,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<AppointmentEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: AppointmentEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
