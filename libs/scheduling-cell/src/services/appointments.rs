// libs/scheduling-cell/src/services/appointments.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use shared_models::auth::AuthSession;

use crate::models::{AppointmentQuery, FollowUpDecision, ScheduledAppointment, StoreError};
use crate::services::notifications::{Notification, NotificationSink};
use crate::services::store::AppointmentStore;

/// Operations the schedule screens perform on existing appointments.
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    pub async fn list(
        &self,
        session: &AuthSession,
        query: &AppointmentQuery,
    ) -> Result<Vec<ScheduledAppointment>, StoreError> {
        self.store.list(session, query).await
    }

    pub async fn find(
        &self,
        session: &AuthSession,
        appointment_id: &str,
    ) -> Result<ScheduledAppointment, StoreError> {
        self.store
            .list(session, &AppointmentQuery::default())
            .await?
            .into_iter()
            .find(|appointment| appointment.appointment_id == appointment_id)
            .ok_or_else(|| StoreError::NotFound(appointment_id.to_string()))
    }

    /// Appointments falling on `today` in local time, earliest first.
    pub async fn todays_schedule(
        &self,
        session: &AuthSession,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledAppointment>, StoreError> {
        let mut todays: Vec<ScheduledAppointment> = self
            .store
            .list(session, &AppointmentQuery::default())
            .await?
            .into_iter()
            .filter(|appointment| appointment.local_date() == Some(today))
            .collect();

        todays.sort_by_key(|appointment| appointment.appointment_date);
        debug!("{} appointments scheduled for {}", todays.len(), today);
        Ok(todays)
    }

    pub async fn complete(
        &self,
        session: &AuthSession,
        appointment: &ScheduledAppointment,
        decision: FollowUpDecision,
    ) -> Result<(), StoreError> {
        if appointment.is_completed() {
            warn!("Appointment {} is already completed", appointment.appointment_id);
            return Err(StoreError::Rejected("Appointment is already completed".to_string()));
        }

        if let Err(error) = self.store.complete(session, &appointment.appointment_id, &decision).await {
            self.notifier.notify(
                Notification::error("Failed to complete appointment").with_description("Please try again."),
            );
            return Err(error);
        }

        let notification = match decision {
            FollowUpDecision::Required(date) => Notification::success(
                "Appointment completed and follow-up scheduled!",
            )
            .with_description(format!(
                "{}'s appointment marked complete. Follow-up set for {}.",
                appointment.patient_name,
                date.format("%-m/%-d/%Y"),
            )),
            FollowUpDecision::NotRequired => Notification::success("Appointment completed!")
                .with_description(format!("{}'s appointment status updated.", appointment.patient_name)),
        };
        self.notifier.notify(notification);

        info!("Appointment {} completed", appointment.appointment_id);
        Ok(())
    }

    pub async fn delete(
        &self,
        session: &AuthSession,
        appointment: &ScheduledAppointment,
    ) -> Result<(), StoreError> {
        match self.store.delete(session, &appointment.appointment_id).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "{}'s appointment has been deleted",
                    appointment.patient_name
                )));
                info!("Appointment {} deleted", appointment.appointment_id);
                Ok(())
            }
            Err(error) => {
                self.notifier.notify(Notification::error("Failed to delete appointment"));
                Err(error)
            }
        }
    }
}
