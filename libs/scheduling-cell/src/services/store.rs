// libs/scheduling-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_api_client::AdminApiClient;
use shared_config::AppConfig;
use shared_models::auth::AuthSession;

use crate::models::{
    AppointmentListResponse, AppointmentQuery, AppointmentRecord, AppointmentStatus,
    CompleteAppointmentPayload, CreateAppointmentPayload, FollowUpDecision,
    ScheduledAppointment, StoreError,
};

/// Appointment records owned outside this crate.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, session: &AuthSession, record: &AppointmentRecord) -> Result<(), StoreError>;

    async fn list(&self, session: &AuthSession, query: &AppointmentQuery) -> Result<Vec<ScheduledAppointment>, StoreError>;

    async fn complete(
        &self,
        session: &AuthSession,
        appointment_id: &str,
        decision: &FollowUpDecision,
    ) -> Result<(), StoreError>;

    async fn delete(&self, session: &AuthSession, appointment_id: &str) -> Result<(), StoreError>;
}

/// Local midnight of `date`, as an instant.
fn start_of_local_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
}

/// The admin API treats `end_date` as an instant, so the whole last day is
/// covered by sending the following day.
fn exclusive_end(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

// ==============================================================================
// ADMIN API STORE
// ==============================================================================

pub struct HttpAppointmentStore {
    client: AdminApiClient,
    duration_minutes: u32,
    preferred_channel: String,
}

impl HttpAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: AdminApiClient::new(config),
            duration_minutes: config.appointment_duration_minutes,
            preferred_channel: config.preferred_channel.clone(),
        }
    }

    pub fn payload_for(&self, record: &AppointmentRecord) -> CreateAppointmentPayload {
        CreateAppointmentPayload {
            appointment_date: record.start_date_time,
            duration_minutes: self.duration_minutes,
            name: record.patient_name.clone(),
            email: record.email.clone(),
            preferred_channel: Some(self.preferred_channel.clone()),
            service_name: record.service_name.clone(),
            notes: record.notes.clone().filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[async_trait]
impl AppointmentStore for HttpAppointmentStore {
    async fn create(&self, session: &AuthSession, record: &AppointmentRecord) -> Result<(), StoreError> {
        debug!("Creating appointment for {} with {}", record.patient_name, record.provider);

        let body = serde_json::to_value(self.payload_for(record))
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        let _: Value = self.client.request(
            Method::POST,
            "/api/v1/admin/appointments",
            Some(session.bearer_token()),
            Some(body),
        ).await?;

        Ok(())
    }

    async fn list(&self, session: &AuthSession, query: &AppointmentQuery) -> Result<Vec<ScheduledAppointment>, StoreError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(start) = query.start_date {
            params.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = query.end_date.and_then(exclusive_end) {
            params.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(provider) = &query.provider {
            params.push(("provider_id", provider.clone()));
        }

        let response: AppointmentListResponse = self.client.request_with_query(
            Method::GET,
            "/api/v1/admin/appointments",
            Some(session.bearer_token()),
            &params,
            None,
        ).await?;

        debug!("Listed {} appointments", response.appointments.len());
        Ok(response.appointments)
    }

    async fn complete(
        &self,
        session: &AuthSession,
        appointment_id: &str,
        decision: &FollowUpDecision,
    ) -> Result<(), StoreError> {
        let payload = CompleteAppointmentPayload {
            next_follow_up_date: decision.follow_up_date().and_then(start_of_local_day),
        };
        let body = serde_json::to_value(payload).map_err(|e| StoreError::Rejected(e.to_string()))?;

        let path = format!("/api/v1/admin/appointments/{}/complete", appointment_id);
        let _: Value = self.client.request(
            Method::POST,
            &path,
            Some(session.bearer_token()),
            Some(body),
        ).await?;

        Ok(())
    }

    async fn delete(&self, session: &AuthSession, appointment_id: &str) -> Result<(), StoreError> {
        let path = format!("/api/v1/admin/appointments/{}", appointment_id);
        let _: Value = self.client.request(
            Method::DELETE,
            &path,
            Some(session.bearer_token()),
            None,
        ).await?;

        Ok(())
    }
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Debug, Clone)]
pub struct StoredAppointment {
    pub appointment: ScheduledAppointment,
    pub record: AppointmentRecord,
    pub next_follow_up: Option<NaiveDate>,
}

/// Keeps appointments in process memory, with the admin API's filtering rules.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<StoredAppointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn appointments(&self) -> Vec<StoredAppointment> {
        self.appointments.read().await.clone()
    }

    pub async fn get(&self, appointment_id: &str) -> Option<StoredAppointment> {
        self.appointments
            .read()
            .await
            .iter()
            .find(|stored| stored.appointment.appointment_id == appointment_id)
            .cloned()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, _session: &AuthSession, record: &AppointmentRecord) -> Result<(), StoreError> {
        let appointment = ScheduledAppointment {
            appointment_id: Uuid::new_v4().simple().to_string(),
            patient_name: record.patient_name.clone(),
            appointment_date: Some(record.start_date_time),
            service_name: Some(record.service_name.clone()),
            status: AppointmentStatus::Booked,
        };

        info!("Stored appointment {} for {}", appointment.appointment_id, record.patient_name);
        self.appointments.write().await.push(StoredAppointment {
            appointment,
            record: record.clone(),
            next_follow_up: None,
        });
        Ok(())
    }

    async fn list(&self, _session: &AuthSession, query: &AppointmentQuery) -> Result<Vec<ScheduledAppointment>, StoreError> {
        let start = query.start_date.and_then(start_of_local_day);
        // Same upper bound the admin API applies to the `end_date` it is sent.
        let end = query.end_date.and_then(exclusive_end).and_then(start_of_local_day);

        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .map(|stored| &stored.appointment)
            .filter(|appointment| match (start, appointment.appointment_date) {
                (Some(bound), Some(at)) => at >= bound,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|appointment| match (end, appointment.appointment_date) {
                (Some(bound), Some(at)) => at <= bound,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .cloned()
            .collect())
    }

    async fn complete(
        &self,
        _session: &AuthSession,
        appointment_id: &str,
        decision: &FollowUpDecision,
    ) -> Result<(), StoreError> {
        let mut appointments = self.appointments.write().await;
        let stored = appointments
            .iter_mut()
            .find(|stored| stored.appointment.appointment_id == appointment_id)
            .ok_or_else(|| {
                error!("Cannot complete unknown appointment {}", appointment_id);
                StoreError::NotFound(appointment_id.to_string())
            })?;

        stored.appointment.status = AppointmentStatus::Completed;
        if let Some(date) = decision.follow_up_date() {
            stored.next_follow_up = Some(date);
        }
        Ok(())
    }

    async fn delete(&self, _session: &AuthSession, appointment_id: &str) -> Result<(), StoreError> {
        self.appointments
            .write()
            .await
            .retain(|stored| stored.appointment.appointment_id != appointment_id);
        Ok(())
    }
}
