use crate::colors::ColorAssigner;
use crate::event::Event;
use crate::store::EventStore;
use crate::timerange::{
    month_bounds, next_month_of, previous_month_of, InvalidDateError, TimeZone,
};
use time::{Date, Month, OffsetDateTime};
use tracing::debug;

/// A calendar month together with the events starting in it.  Navigating
/// produces a new `CalMonth` rather than modifying an existing one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalMonth {
    month: Month,
    year: i32,
    // Midnight at the start of day 1
    first: OffsetDateTime,
    // The final second of the month
    last: OffsetDateTime,
    events: Vec<Event>,
}

impl CalMonth {
    pub(crate) fn load(
        month: u8,
        year: i32,
        zone: &dyn TimeZone,
        store: &EventStore,
    ) -> Result<CalMonth, InvalidDateError> {
        let (first, last) = month_bounds(month, year, zone)?;
        debug!(%year, %month, "loading month");
        Ok(CalMonth {
            month: first.month(),
            year,
            first,
            last,
            events: store.load(first, last, zone),
        })
    }

    pub(crate) fn containing(
        date: Date,
        zone: &dyn TimeZone,
        store: &EventStore,
    ) -> Result<CalMonth, InvalidDateError> {
        CalMonth::load(date.month().into(), date.year(), zone, store)
    }

    pub(crate) fn next(
        &self,
        zone: &dyn TimeZone,
        store: &EventStore,
    ) -> Result<CalMonth, InvalidDateError> {
        let (month, year) = next_month_of(self.last)?;
        CalMonth::load(month.into(), year, zone, store)
    }

    pub(crate) fn previous(
        &self,
        zone: &dyn TimeZone,
        store: &EventStore,
    ) -> Result<CalMonth, InvalidDateError> {
        let (month, year) = previous_month_of(self.first)?;
        CalMonth::load(month.into(), year, zone, store)
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn first_day(&self) -> Date {
        self.first.date()
    }

    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    /// Gives every event that doesn't have a color yet the color of its
    /// calendar
    pub(crate) fn assign_colors(&self, colors: &mut ColorAssigner) {
        for ev in &self.events {
            ev.assign_color(colors);
        }
    }
}
