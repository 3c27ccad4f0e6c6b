mod week;
use self::week::{weekday_names, Week, WeekFactory};
use crate::colors::ColorAssigner;
use crate::event::{is_day_member, Event};
use crate::month::CalMonth;
use crate::theme::{color_style, TODAY_MODIFIER};
use ratatui::{
    style::{Color, Style},
    text::Line,
};
use time::{Date, Month, Weekday};

/// Visible width of every line of a rendered month
pub(crate) const GRID_WIDTH: usize = 23;

pub(crate) trait DateStyler {
    fn date_style(&self, date: Date) -> Style;
}

/// Colors each day after the events on it and underlines today
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct EventStyler<'a> {
    events: &'a [Event],
    today: Date,
}

impl DateStyler for EventStyler<'_> {
    fn date_style(&self, date: Date) -> Style {
        let style = color_style(day_color(self.events, date));
        if date == self.today {
            style.add_modifier(TODAY_MODIFIER)
        } else {
            style
        }
    }
}

/// Picks the color for a day of the month whose events are `events`.
///
/// If any event on the day is shorter than a day, the first such event's
/// color is used.  If the day only has multi-day events, the color of the
/// month's first event is used, whether or not that event is on the day.
pub(crate) fn day_color(events: &[Event], date: Date) -> Option<Color> {
    let mut any_events = false;
    for ev in events.iter().filter(|ev| is_day_member(ev, date)) {
        if !ev.is_multiday() {
            return ev.color();
        }
        any_events = true;
    }
    if any_events {
        events.first().and_then(Event::color)
    } else {
        None
    }
}

/// The week-by-day layout of one month, ready to be rendered
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    month: Month,
    year: i32,
    first_weekday: Weekday,
    weeks: Vec<Week>,
}

impl MonthGrid {
    /// Lays out `month`, first giving its events their calendar colors from
    /// `colors`
    pub(crate) fn build(
        month: &CalMonth,
        colors: &mut ColorAssigner,
        first_weekday: Weekday,
        today: Date,
    ) -> MonthGrid {
        month.assign_colors(colors);
        let styler = EventStyler {
            events: month.events(),
            today,
        };
        let weeks = WeekFactory::new(styler, first_weekday).month(month.first_day());
        MonthGrid {
            month: month.month(),
            year: month.year(),
            first_weekday,
            weeks,
        }
    }

    pub(crate) fn header(&self) -> Line<'static> {
        let label = format!("   {} / {}", self.month, self.year);
        Line::raw(format!("{label:GRID_WIDTH$}"))
    }

    /// Renders the weekday names followed by one line per week
    pub(crate) fn render(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.weeks.len() + 1);
        let names = weekday_names(self.first_weekday).join(" ");
        lines.push(Line::raw(format!("{names:GRID_WIDTH$}")));
        lines.extend(self.weeks.iter().map(Week::to_line));
        lines
    }
}

/// Padding for a grid with fewer weeks than its neighbors
pub(crate) fn blank_line() -> Line<'static> {
    Line::raw(" ".repeat(GRID_WIDTH))
}
