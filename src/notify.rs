//! Best-effort appointment notifications.
//!
//! Delivery (email, push, ...) is an external collaborator. Notifications
//! fire after the triggering transaction commits; a failed send is logged
//! and swallowed, never propagated into the state change.

use thiserror::Error;

use crate::models::Appointment;

#[derive(Error, Debug)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget notifier consumed by the booking engine.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        appointment: &Appointment,
        subject: &str,
        intro_message: &str,
    ) -> Result<(), NotifyError>;
}

/// Default notifier: writes the notification to the log. Stands in for
/// the out-of-process email sender in development and tests.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(
        &self,
        appointment: &Appointment,
        subject: &str,
        _intro_message: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            appointment_id = %appointment.id,
            date = %appointment.date,
            time = %appointment.time,
            subject,
            "appointment notification"
        );
        Ok(())
    }
}

/// Send a notification, swallowing any failure.
pub fn send_best_effort(
    notifier: &dyn Notifier,
    appointment: &Appointment,
    subject: &str,
    intro_message: &str,
) {
    if let Err(e) = notifier.notify(appointment, subject, intro_message) {
        tracing::warn!(appointment_id = %appointment.id, error = %e, "notification dropped");
    }
}
