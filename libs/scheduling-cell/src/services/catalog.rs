// libs/scheduling-cell/src/services/catalog.rs
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{StoreError, TimeSlot};

/// Keeps the slots of `provider`, in their original order. An empty provider
/// means "no filter".
pub fn filter_by_provider(slots: &[TimeSlot], provider: &str) -> Vec<TimeSlot> {
    if provider.is_empty() {
        return slots.to_vec();
    }

    slots
        .iter()
        .filter(|slot| slot.provider == provider)
        .cloned()
        .collect()
}

/// A date cannot be picked when it is before today or falls on a weekend.
pub fn is_date_disabled(candidate: NaiveDate, today: NaiveDate) -> bool {
    candidate < today || matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Slots offered on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCatalog {
    date: NaiveDate,
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    /// Builds a catalog, keeping the first slot when a provider has two at the same time.
    pub fn new(date: NaiveDate, slots: Vec<TimeSlot>) -> Self {
        let mut unique: Vec<TimeSlot> = Vec::with_capacity(slots.len());

        for slot in slots {
            if unique.iter().any(|existing| existing.same_unit(&slot)) {
                warn!("Dropping duplicate {} slot for {} on {}", slot.label(), slot.provider, date);
                continue;
            }
            unique.push(slot);
        }

        Self { date, slots: unique }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<TimeSlot> {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn for_provider(&self, provider: &str) -> SlotCatalog {
        Self {
            date: self.date,
            slots: filter_by_provider(&self.slots, provider),
        }
    }

    pub fn available(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.available)
    }

    pub fn available_count(&self) -> usize {
        self.available().count()
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.slots.iter().any(|candidate| candidate.same_unit(slot))
    }

    pub fn find(&self, time: NaiveTime, provider: &str) -> Option<&TimeSlot> {
        self.slots
            .iter()
            .find(|slot| slot.time == time && (provider.is_empty() || slot.provider == provider))
    }
}

/// Where the slots of a day come from.
#[async_trait]
pub trait SlotSource: Send + Sync {
    async fn slots_for(&self, provider: &str, date: NaiveDate) -> Result<SlotCatalog, StoreError>;
}

const STANDARD_DAY: &[(&str, bool, &str)] = &[
    ("09:00", true, "Dr. Johnson"),
    ("09:30", false, "Dr. Smith"),
    ("10:00", true, "Dr. Johnson"),
    ("10:30", true, "Dr. Davis"),
    ("11:00", false, "Dr. Martinez"),
    ("11:30", true, "Dr. Wilson"),
    ("14:00", true, "Dr. Johnson"),
    ("14:30", true, "Dr. Smith"),
    ("15:00", true, "Dr. Davis"),
    ("15:30", false, "Dr. Martinez"),
    ("16:00", true, "Dr. Wilson"),
    ("16:30", true, "Dr. Johnson"),
];

/// Serves the same fixed set of slots for every day.
#[derive(Debug, Clone)]
pub struct FixtureSlotSource {
    slots: Vec<TimeSlot>,
}

impl FixtureSlotSource {
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        Self { slots }
    }

    /// The clinic's standard weekday: twelve half-hour slots across five providers.
    pub fn standard_day() -> Self {
        let slots = STANDARD_DAY
            .iter()
            .filter_map(|(time, available, provider)| TimeSlot::parse(time, *available, *provider).ok())
            .collect();

        Self { slots }
    }

    pub fn providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = Vec::new();
        for slot in &self.slots {
            if !providers.contains(&slot.provider) {
                providers.push(slot.provider.clone());
            }
        }
        providers
    }
}

#[async_trait]
impl SlotSource for FixtureSlotSource {
    async fn slots_for(&self, provider: &str, date: NaiveDate) -> Result<SlotCatalog, StoreError> {
        debug!("Loading fixture slots for '{}' on {}", provider, date);
        Ok(SlotCatalog::new(date, filter_by_provider(&self.slots, provider)))
    }
}
