//! Structured-log subscriber for appointment events.
//!
//! [`EventLog`] consumes the [`EventBus`](crate::bus::EventBus) broadcast
//! channel and writes one `tracing` record per event. It runs as a
//! long-lived background task and exits when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::AppointmentEvent;

pub struct EventLog;

impl EventLog {
    /// Run the logging loop until the channel closes.
    pub async fn run(mut receiver: broadcast::Receiver<AppointmentEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        booking_id = event.booking_id,
                        owner_id = event.owner_id,
                        actor_user_id = ?event.actor_user_id,
                        payload = %event.payload,
                        "Appointment event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event log shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{EventBus, APPOINTMENT_BOOKED};

    #[tokio::test]
    async fn exits_when_bus_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(EventLog::run(bus.subscribe()));

        bus.publish(AppointmentEvent::new(APPOINTMENT_BOOKED, 1, 2));
        drop(bus);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("event log should stop after the bus closes")
            .unwrap();
    }
}
