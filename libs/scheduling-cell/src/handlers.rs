// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::auth::AuthSession;
use shared_models::error::AppError;

use crate::models::{hh_mm, AppointmentQuery, FollowUpDecision, PatientDraft};
use crate::services::catalog::{is_date_disabled, today_local, SlotSource};
use crate::services::notifications::NotificationLog;
use crate::services::store::AppointmentStore;
use crate::services::{AppointmentService, BookingSession, SubmitOutcome};

/// Everything the scheduling routes need to serve a request.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
    pub slots: Arc<dyn SlotSource>,
}

impl SchedulingState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AppointmentStore>, slots: Arc<dyn SlotSource>) -> Self {
        Self { config, store, slots }
    }
}

// ==============================================================================
// REQUEST STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub provider: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub draft: PatientDraft,
    pub date: Option<NaiveDate>,
    #[serde(default, with = "optional_hh_mm")]
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub follow_up_date: Option<NaiveDate>,
}

mod optional_hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    use super::hh_mm;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveTime::parse_from_str(&raw, hh_mm::FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

// ==============================================================================
// SLOT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<SchedulingState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let disabled = is_date_disabled(query.date, today_local());

    let slots = if disabled {
        Vec::new()
    } else {
        state.slots.slots_for(&query.provider, query.date).await?.into_slots()
    };
    let available_count = slots.iter().filter(|slot| slot.available).count();

    Ok(Json(json!({
        "date": query.date,
        "disabled": disabled,
        "slots": slots,
        "available_count": available_count,
    })))
}

#[axum::debug_handler]
pub async fn get_date_status(Path(date): Path<NaiveDate>) -> Json<Value> {
    Json(json!({
        "date": date,
        "disabled": is_date_disabled(date, today_local()),
    }))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

/// Drives one booking session from patient details to the store.
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<SchedulingState>,
    Extension(auth): Extension<AuthSession>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let notifications = Arc::new(NotificationLog::new());
    let session = BookingSession::new(state.store.clone(), notifications.clone(), auth);

    session.submit_step1(request.draft)?;

    if let Some(date) = request.date {
        let provider = session.snapshot().draft.provider;
        let day_slots = state.slots.slots_for(&provider, date).await?;
        session.select_date(date, today_local(), &day_slots)?;

        if let Some(time) = request.time {
            let slot = day_slots
                .find(time, &provider)
                .cloned()
                .ok_or_else(|| AppError::BadRequest(format!(
                    "No {} slot with {} on {}",
                    time.format(hh_mm::FORMAT),
                    provider,
                    date
                )))?;
            session.select_slot(slot)?;
        }
    }

    match session.submit().await? {
        SubmitOutcome::Booked(record) => {
            info!("Booked {} with {}", record.patient_name, record.provider);
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "record": record,
                    "notifications": notifications.drain(),
                })),
            ))
        }
        SubmitOutcome::Failed(error) => Err(error.into()),
        other => Err(AppError::Internal(format!("Booking ended without a result: {:?}", other))),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<SchedulingState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(state.store.clone(), Arc::new(NotificationLog::new()));
    let appointments = service.list(&auth, &query).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn todays_appointments(
    State(state): State<SchedulingState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    let today = today_local();
    let service = AppointmentService::new(state.store.clone(), Arc::new(NotificationLog::new()));
    let appointments = service.todays_schedule(&auth, today).await?;

    Ok(Json(json!({
        "date": today,
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<SchedulingState>,
    Extension(auth): Extension<AuthSession>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let notifications = Arc::new(NotificationLog::new());
    let service = AppointmentService::new(state.store.clone(), notifications.clone());

    let appointment = service.find(&auth, &appointment_id).await?;
    if appointment.is_completed() {
        return Err(AppError::BadRequest(format!("Appointment {} is already completed", appointment_id)));
    }

    let decision = match request.follow_up_date {
        Some(date) => FollowUpDecision::Required(date),
        None => FollowUpDecision::NotRequired,
    };
    debug!("Completing appointment {} with {:?}", appointment_id, decision);

    service.complete(&auth, &appointment, decision).await?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment_id,
        "notifications": notifications.drain(),
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<SchedulingState>,
    Extension(auth): Extension<AuthSession>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let notifications = Arc::new(NotificationLog::new());
    let service = AppointmentService::new(state.store.clone(), notifications.clone());

    let appointment = service.find(&auth, &appointment_id).await?;
    service.delete(&auth, &appointment).await?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment_id,
        "notifications": notifications.drain(),
    })))
}
