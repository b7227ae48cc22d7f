pub mod appointments;
pub mod catalog;
pub mod notifications;
pub mod session;
pub mod store;
pub mod validation;
pub mod workflow;

pub use appointments::AppointmentService;
pub use catalog::{FixtureSlotSource, SlotCatalog, SlotSource};
pub use notifications::{Notification, NotificationLevel, NotificationLog, NotificationSink, TracingNotificationSink};
pub use session::BookingSession;
pub use store::{AppointmentStore, HttpAppointmentStore, InMemoryAppointmentStore};
pub use workflow::{BookingWorkflow, SubmitOutcome, WorkflowSnapshot};
