// libs/scheduling-cell/src/services/workflow.rs
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use tracing::{debug, info, warn};

use crate::models::{
    AppointmentRecord, BookingError, BookingSelection, DraftField, PatientDraft,
    SelectionError, StoreError, TimeSlot, ValidationError, WorkflowStep,
};
use crate::services::catalog::{is_date_disabled, SlotCatalog};
use crate::services::notifications::{Notification, NotificationSink};
use crate::services::validation::validate_draft;

/// Immutable view of a workflow at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub step: WorkflowStep,
    pub draft: PatientDraft,
    pub selection: BookingSelection,
    pub errors: Vec<ValidationError>,
    pub generation: u64,
}

/// Proof that a submission was started; redeemed by `finish_submit`.
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    record: AppointmentRecord,
}

impl SubmitTicket {
    pub fn record(&self) -> &AppointmentRecord {
        &self.record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Booked(AppointmentRecord),
    Failed(StoreError),
    /// A submission was already in flight; nothing happened.
    AlreadySubmitting,
    /// The session was reset or cancelled before the store answered.
    Discarded,
}

/// Two-step booking wizard: collect patient details, then pick a date and slot.
pub struct BookingWorkflow {
    step: WorkflowStep,
    draft: PatientDraft,
    selection: BookingSelection,
    day_catalog: Option<SlotCatalog>,
    errors: Vec<ValidationError>,
    generation: u64,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingWorkflow {
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            step: WorkflowStep::CollectingInfo,
            draft: PatientDraft::default(),
            selection: BookingSelection::default(),
            day_catalog: None,
            errors: Vec::new(),
            generation: 0,
            notifier,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn day_catalog(&self) -> Option<&SlotCatalog> {
        self.day_catalog.as_ref()
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            step: self.step,
            draft: self.draft.clone(),
            selection: self.selection.clone(),
            errors: self.errors.clone(),
            generation: self.generation,
        }
    }

    /// Edits one draft field and clears any pending error on it.
    pub fn update_draft(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::CollectingInfo)?;
        self.draft.set(field, value.into());
        self.errors.retain(|error| error.field != field);
        Ok(())
    }

    pub fn submit_step1(&mut self, draft: PatientDraft) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::CollectingInfo)?;
        self.draft = draft;
        self.advance()
    }

    /// Validates the current draft and moves to slot selection.
    pub fn advance(&mut self) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::CollectingInfo)?;

        match validate_draft(&self.draft) {
            Ok(()) => {
                self.errors.clear();
                self.step = WorkflowStep::SelectingSlot;
                info!("Booking details accepted for {}", self.draft.patient_name);
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.0.clone();
                Err(errors.into())
            }
        }
    }

    pub fn back(&mut self) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::SelectingSlot)?;
        self.step = WorkflowStep::CollectingInfo;
        debug!("Returned to booking details");
        Ok(())
    }

    /// Records the picked date together with that day's slots. A selected slot
    /// the new day does not offer, or offers as booked, is dropped.
    pub fn select_date(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
        day_slots: &SlotCatalog,
    ) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::SelectingSlot)?;

        if is_date_disabled(date, today) {
            warn!("Rejected disabled date {}", date);
            return Err(SelectionError::DateDisabled(date).into());
        }

        let catalog = day_slots.for_provider(&self.draft.provider);

        if let Some(slot) = &self.selection.slot {
            if !catalog.available().any(|offered| offered.same_unit(slot)) {
                debug!("Clearing {} slot not offered on {}", slot.label(), date);
                self.selection.slot = None;
            }
        }

        self.selection.date = Some(date);
        self.day_catalog = Some(catalog);
        Ok(())
    }

    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<(), BookingError> {
        self.require_step(WorkflowStep::SelectingSlot)?;

        if !slot.available {
            warn!("Rejected booked slot {} with {}", slot.label(), slot.provider);
            return Err(SelectionError::SlotUnavailable {
                time: slot.label(),
                provider: slot.provider,
            }
            .into());
        }

        if slot.provider != self.draft.provider {
            return Err(SelectionError::ProviderMismatch {
                time: slot.label(),
                slot_provider: slot.provider,
                provider: self.draft.provider.clone(),
            }
            .into());
        }

        if let Some(catalog) = &self.day_catalog {
            match catalog.find(slot.time, &slot.provider) {
                None => return Err(SelectionError::NotInCatalog { time: slot.label() }.into()),
                Some(offered) if !offered.available => {
                    return Err(SelectionError::SlotUnavailable {
                        time: slot.label(),
                        provider: slot.provider,
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        debug!("Selected {} with {}", slot.label(), slot.provider);
        self.selection.slot = Some(slot);
        Ok(())
    }

    /// Freezes the session and produces the record to hand to the store.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, BookingError> {
        self.require_step(WorkflowStep::SelectingSlot)?;

        let Some(date) = self.selection.date else {
            return Err(self.reject_selection(SelectionError::MissingDate));
        };
        let Some(slot) = self.selection.slot.clone() else {
            return Err(self.reject_selection(SelectionError::MissingSlot));
        };

        let start_date_time = match compose_start(date, slot.time) {
            Ok(start) => start,
            Err(error) => return Err(self.reject_selection(error)),
        };

        let record = AppointmentRecord {
            patient_name: self.draft.patient_name.clone(),
            email: self.draft.email.clone(),
            service_name: self.draft.service_name.clone(),
            provider: slot.provider,
            start_date_time,
            notes: self.draft.notes.clone(),
        };

        self.step = WorkflowStep::Submitting;
        debug!("Submitting appointment for {} at {}", record.patient_name, record.start_date_time);

        Ok(SubmitTicket {
            generation: self.generation,
            record,
        })
    }

    /// Applies the store's answer, unless the session moved on in the meantime.
    pub fn finish_submit(&mut self, ticket: SubmitTicket, result: Result<(), StoreError>) -> SubmitOutcome {
        if ticket.generation != self.generation || self.step != WorkflowStep::Submitting {
            debug!("Discarding stale store response for {}", ticket.record.patient_name);
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                let record = ticket.record;
                let local = record.local_start();
                self.notifier.notify(Notification::success("Appointment booked successfully!").with_description(
                    format!(
                        "{}'s appointment is scheduled for {} at {} with {}",
                        record.patient_name,
                        local.format("%-m/%-d/%Y"),
                        local.format("%H:%M"),
                        record.provider,
                    ),
                ));
                self.clear();
                self.step = WorkflowStep::Completed;
                info!("Appointment booked for {} at {}", record.patient_name, record.start_date_time);
                SubmitOutcome::Booked(record)
            }
            Err(error) => {
                warn!("Appointment store rejected booking: {}", error);
                self.notifier.notify(
                    Notification::error("Failed to create appointment").with_description("Please try again."),
                );
                self.step = WorkflowStep::SelectingSlot;
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Abandons the session; an in-flight submission becomes stale.
    pub fn cancel(&mut self) {
        self.clear();
        if !self.step.is_terminal() {
            info!("Booking cancelled from {}", self.step);
            self.step = WorkflowStep::Cancelled;
        }
    }

    /// Starts a fresh session at step 1.
    pub fn reset(&mut self) {
        self.clear();
        self.step = WorkflowStep::CollectingInfo;
    }

    fn clear(&mut self) {
        self.draft = PatientDraft::default();
        self.selection = BookingSelection::default();
        self.day_catalog = None;
        self.errors.clear();
        self.generation += 1;
    }

    fn require_step(&self, expected: WorkflowStep) -> Result<(), SelectionError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(SelectionError::WrongStep(self.step))
        }
    }

    fn reject_selection(&self, error: SelectionError) -> BookingError {
        self.notifier.notify(Notification::error(error.to_string()));
        error.into()
    }
}

/// Combines a calendar day with a slot's hour and minute in local time.
pub fn compose_start(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, SelectionError> {
    let unrepresentable = || SelectionError::UnrepresentableTime {
        date,
        time: time.format("%H:%M").to_string(),
    };

    let wall_clock = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).ok_or_else(unrepresentable)?;

    Local
        .from_local_datetime(&date.and_time(wall_clock))
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(unrepresentable)
}
