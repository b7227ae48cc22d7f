// libs/scheduling-cell/src/services/session.rs
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::debug;

use shared_models::auth::AuthSession;

use crate::models::{BookingError, DraftField, PatientDraft, SelectionError, TimeSlot, WorkflowStep};
use crate::services::catalog::SlotCatalog;
use crate::services::notifications::NotificationSink;
use crate::services::store::AppointmentStore;
use crate::services::workflow::{BookingWorkflow, SubmitOutcome, WorkflowSnapshot};

/// A booking workflow shared between UI event handlers.
///
/// The lock is only held while a transition runs, never across the store call,
/// so `cancel` and duplicate `submit` calls are served while a submission is
/// in flight. Every transition publishes a fresh [`WorkflowSnapshot`].
#[derive(Clone)]
pub struct BookingSession {
    workflow: Arc<Mutex<BookingWorkflow>>,
    updates: Arc<watch::Sender<WorkflowSnapshot>>,
    store: Arc<dyn AppointmentStore>,
    auth: AuthSession,
}

impl BookingSession {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn NotificationSink>,
        auth: AuthSession,
    ) -> Self {
        let workflow = BookingWorkflow::new(notifier);
        let (updates, _) = watch::channel(workflow.snapshot());

        Self {
            workflow: Arc::new(Mutex::new(workflow)),
            updates: Arc::new(updates),
            store,
            auth,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.with_workflow(|workflow| workflow.snapshot())
    }

    pub fn step(&self) -> WorkflowStep {
        self.with_workflow(|workflow| workflow.step())
    }

    pub fn update_draft(&self, field: DraftField, value: impl Into<String>) -> Result<(), BookingError> {
        let value = value.into();
        self.transition(|workflow| workflow.update_draft(field, value))
    }

    pub fn submit_step1(&self, draft: PatientDraft) -> Result<(), BookingError> {
        self.transition(|workflow| workflow.submit_step1(draft))
    }

    pub fn advance(&self) -> Result<(), BookingError> {
        self.transition(|workflow| workflow.advance())
    }

    pub fn back(&self) -> Result<(), BookingError> {
        self.transition(|workflow| workflow.back())
    }

    pub fn select_date(&self, date: NaiveDate, today: NaiveDate, day_slots: &SlotCatalog) -> Result<(), BookingError> {
        self.transition(|workflow| workflow.select_date(date, today, day_slots))
    }

    pub fn select_slot(&self, slot: TimeSlot) -> Result<(), BookingError> {
        self.transition(|workflow| workflow.select_slot(slot))
    }

    pub fn cancel(&self) {
        self.transition(|workflow| workflow.cancel())
    }

    pub fn reset(&self) {
        self.transition(|workflow| workflow.reset())
    }

    /// Sends the composed appointment to the store.
    pub async fn submit(&self) -> Result<SubmitOutcome, BookingError> {
        let ticket = match self.transition(|workflow| workflow.begin_submit()) {
            Ok(ticket) => ticket,
            Err(BookingError::Selection(SelectionError::WrongStep(WorkflowStep::Submitting))) => {
                debug!("Ignoring submit while another submission is in flight");
                return Ok(SubmitOutcome::AlreadySubmitting);
            }
            Err(error) => return Err(error),
        };

        let result = self.store.create(&self.auth, ticket.record()).await;

        Ok(self.transition(|workflow| workflow.finish_submit(ticket, result)))
    }

    fn with_workflow<T>(&self, f: impl FnOnce(&BookingWorkflow) -> T) -> T {
        let workflow = self.workflow.lock().unwrap_or_else(PoisonError::into_inner);
        f(&workflow)
    }

    fn transition<T>(&self, f: impl FnOnce(&mut BookingWorkflow) -> T) -> T {
        let mut workflow = self.workflow.lock().unwrap_or_else(PoisonError::into_inner);
        let output = f(&mut workflow);
        self.updates.send_replace(workflow.snapshot());
        output
    }
}
