// libs/scheduling-cell/src/services/validation.rs
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{DraftField, PatientDraft, ValidationError, ValidationErrors};

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Checks every step-1 field and reports all failures together.
pub fn validate_draft(draft: &PatientDraft) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if draft.patient_name.trim().is_empty() {
        errors.push(ValidationError::new(DraftField::PatientName, "Patient name is required"));
    }

    if draft.email.trim().is_empty() {
        errors.push(ValidationError::new(DraftField::Email, "Email is required"));
    } else if !is_valid_email(&draft.email) {
        errors.push(ValidationError::new(DraftField::Email, "Please enter a valid email"));
    }

    if draft.phone.trim().is_empty() {
        errors.push(ValidationError::new(DraftField::Phone, "Phone number is required"));
    }

    if draft.service_name.is_empty() {
        errors.push(ValidationError::new(DraftField::ServiceName, "Please select a service"));
    }

    if draft.provider.is_empty() {
        errors.push(ValidationError::new(DraftField::Provider, "Please select a provider"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        debug!("Draft failed validation on {} field(s)", errors.len());
        Err(ValidationErrors(errors))
    }
}
