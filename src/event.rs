use crate::colors::ColorAssigner;
use crate::theme::color_style;
use ratatui::{style::Color, text::Span};
use std::cell::OnceCell;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Event {
    pub(crate) source_id: String,
    pub(crate) title: String,
    pub(crate) start: OffsetDateTime,
    pub(crate) end: OffsetDateTime,
    // Set once, by the first rendering pass that needs it
    color: OnceCell<Color>,
}

impl Event {
    pub(crate) fn new(
        source_id: String,
        title: String,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Event {
        Event {
            source_id,
            title,
            start,
            end,
            color: OnceCell::new(),
        }
    }

    /// An event is multi-day if it lasts 24 hours or more
    pub(crate) fn is_multiday(&self) -> bool {
        self.end - self.start >= Duration::DAY
    }

    pub(crate) fn color(&self) -> Option<Color> {
        self.color.get().copied()
    }

    pub(crate) fn assign_color(&self, colors: &mut ColorAssigner) -> Color {
        *self
            .color
            .get_or_init(|| colors.color_for(&self.source_id))
    }

    /// One-line summary for the event listing, e.g. `"Standup: 16 9:30 ->
    /// 9:45"` or, for multi-day events, `"Holiday: 16 -> 20"`
    pub(crate) fn description(&self) -> Span<'static> {
        let text = if self.is_multiday() {
            format!("{}: {} -> {}", self.title, self.start.day(), self.end.day())
        } else {
            format!(
                "{}: {} {}:{:02} -> {}:{:02}",
                self.title,
                self.start.day(),
                self.start.hour(),
                self.start.minute(),
                self.end.hour(),
                self.end.minute()
            )
        };
        Span::styled(text, color_style(self.color()))
    }
}

/// Tests whether `event` shows up on `date`: either local midnight at the
/// start of `date` falls within the event, or the event starts on `date`.
/// Together these amount to the day overlapping the event, with zero-length
/// events still counting for the day they start on.
///
/// Midnight is compared against the event's local wall-clock times, so the
/// start and end may carry different offsets.
pub(crate) fn is_day_member(event: &Event, date: Date) -> bool {
    let start = PrimitiveDateTime::new(event.start.date(), event.start.time());
    let end = PrimitiveDateTime::new(event.end.date(), event.end.time());
    (start..=end).contains(&date.midnight()) || event.start.date() == date
}
