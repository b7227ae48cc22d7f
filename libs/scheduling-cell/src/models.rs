// libs/scheduling-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use shared_api_client::ApiError;
use shared_models::error::{AppError, FieldError};

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// A bookable time of day tied to one provider on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub available: bool,
    pub provider: String,
}

impl TimeSlot {
    pub fn new(time: NaiveTime, available: bool, provider: impl Into<String>) -> Self {
        Self {
            time,
            available,
            provider: provider.into(),
        }
    }

    /// Builds a slot from an `HH:MM` string.
    pub fn parse(time: &str, available: bool, provider: impl Into<String>) -> Result<Self, chrono::ParseError> {
        Ok(Self::new(NaiveTime::parse_from_str(time, hh_mm::FORMAT)?, available, provider))
    }

    pub fn label(&self) -> String {
        self.time.format(hh_mm::FORMAT).to_string()
    }

    /// Two slots denote the same bookable unit when time and provider match.
    pub fn same_unit(&self, other: &TimeSlot) -> bool {
        self.time == other.time && self.provider == other.provider
    }
}

/// `HH:MM` wire format for slot times.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// BOOKING SESSION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    PatientName,
    Email,
    Phone,
    ServiceName,
    Provider,
    Notes,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::PatientName => "patient_name",
            DraftField::Email => "email",
            DraftField::Phone => "phone",
            DraftField::ServiceName => "service_name",
            DraftField::Provider => "provider",
            DraftField::Notes => "notes",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient and service details collected in the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PatientDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::PatientName => self.patient_name = value,
            DraftField::Email => self.email = value,
            DraftField::Phone => self.phone = value,
            DraftField::ServiceName => self.service_name = value,
            DraftField::Provider => self.provider = value,
            DraftField::Notes => {
                self.notes = if value.trim().is_empty() { None } else { Some(value) }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
}

impl BookingSelection {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.slot.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CollectingInfo,
    SelectingSlot,
    Submitting,
    Completed,
    Cancelled,
}

impl WorkflowStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStep::Completed | WorkflowStep::Cancelled)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::CollectingInfo => write!(f, "collecting_info"),
            WorkflowStep::SelectingSlot => write!(f, "selecting_slot"),
            WorkflowStep::Submitting => write!(f, "submitting"),
            WorkflowStep::Completed => write!(f, "completed"),
            WorkflowStep::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The appointment handed to the store on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub patient_name: String,
    pub email: String,
    pub service_name: String,
    pub provider: String,
    pub start_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AppointmentRecord {
    pub fn local_start(&self) -> DateTime<Local> {
        self.start_date_time.with_timezone(&Local)
    }
}

// ==============================================================================
// STORED APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
    NoShow,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// An appointment as listed by the admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAppointment {
    pub appointment_id: String,
    pub patient_name: String,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default = "unknown_status", deserialize_with = "lenient_status")]
    pub status: AppointmentStatus,
}

impl ScheduledAppointment {
    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }

    pub fn local_date(&self) -> Option<NaiveDate> {
        self.appointment_date.map(|at| at.with_timezone(&Local).date_naive())
    }

    pub fn local_time(&self) -> Option<NaiveTime> {
        self.appointment_date.map(|at| at.with_timezone(&Local).time())
    }
}

fn unknown_status() -> AppointmentStatus {
    AppointmentStatus::Unknown
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AppointmentStatus, D::Error> {
    Ok(Option::<AppointmentStatus>::deserialize(deserializer)?.unwrap_or(AppointmentStatus::Unknown))
}

/// The backend stores naive timestamps; those are read as UTC.
fn flexible_datetime<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

/// Filters for listing appointments; dates are inclusive bounds.
///
/// The upper bound reaches midnight of the day after `end_date`, so an
/// appointment starting exactly then is listed too. The admin API compares
/// these dates against naive timestamps while the in-memory store uses local
/// midnight; the two agree only when the backend runs in the local zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum FollowUpDecision {
    NotRequired,
    Required(NaiveDate),
}

impl FollowUpDecision {
    pub fn follow_up_date(&self) -> Option<NaiveDate> {
        match self {
            FollowUpDecision::NotRequired => None,
            FollowUpDecision::Required(date) => Some(*date),
        }
    }
}

// ==============================================================================
// WIRE MODELS
// ==============================================================================

/// Body of `POST /api/v1/admin/appointments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentPayload {
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub name: String,
    pub email: String,
    pub preferred_channel: Option<String>,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /api/v1/admin/appointments/{id}/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentPayload {
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListResponse {
    #[serde(default)]
    pub appointments: Vec<ScheduledAppointment>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: DraftField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: DraftField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every failing field of a step-1 submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn get(&self, field: DraftField) -> Option<&ValidationError> {
        self.0.iter().find(|error| error.field == field)
    }

    pub fn fields(&self) -> Vec<DraftField> {
        self.0.iter().map(|error| error.field).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select a date")]
    MissingDate,

    #[error("Please select a time slot")]
    MissingSlot,

    #[error("The {time} slot with {provider} is already booked")]
    SlotUnavailable { time: String, provider: String },

    #[error("The {time} slot belongs to {slot_provider}, not {provider}")]
    ProviderMismatch { time: String, slot_provider: String, provider: String },

    #[error("The {time} slot is not offered on the selected date")]
    NotInCatalog { time: String },

    #[error("{0} is not a bookable date")]
    DateDisabled(NaiveDate),

    #[error("Action not allowed while {0}")]
    WrongStep(WorkflowStep),

    #[error("{date} {time} does not exist in the local time zone")]
    UnrepresentableTime { date: NaiveDate, time: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Appointment store rejected the request: {0}")]
    Rejected(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Appointment store unavailable: {0}")]
    Unavailable(String),
}

impl From<ApiError> for StoreError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound(body) => StoreError::NotFound(body),
            ApiError::Transport(e) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Validation(errors) => AppError::InvalidFields(
                errors
                    .0
                    .into_iter()
                    .map(|error| FieldError {
                        field: error.field.as_str().to_string(),
                        message: error.message,
                    })
                    .collect(),
            ),
            BookingError::Selection(error) => AppError::BadRequest(error.to_string()),
            BookingError::Store(error) => error.into(),
        }
    }
}
