use super::DateStyler;
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use std::iter::successors;
use time::{Date, Weekday, Weekday::*};

const DAYS_IN_WEEK: usize = 7;

/// Rendered in place of days belonging to a neighboring month
const EMPTY_CELL: &str = "  ";

/// Columns after the last day of each week
const GUTTER: &str = "  ";

pub(super) trait WeekdayExt {
    /// Position of the weekday in a week starting on `first`
    fn index_from(&self, first: Weekday) -> usize;

    fn abbrev(&self) -> &'static str;
}

impl WeekdayExt for Weekday {
    fn index_from(&self, first: Weekday) -> usize {
        let n = (7 + self.number_days_from_monday() - first.number_days_from_monday()) % 7;
        usize::from(n)
    }

    fn abbrev(&self) -> &'static str {
        match self {
            Monday => "Mo",
            Tuesday => "Tu",
            Wednesday => "We",
            Thursday => "Th",
            Friday => "Fr",
            Saturday => "Sa",
            Sunday => "Su",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct StyledDate {
    pub(super) date: Date,
    pub(super) style: Style,
}

impl StyledDate {
    pub(super) fn show(&self) -> Span<'static> {
        Span::styled(format!("{:2}", self.date.day()), self.style)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// Invariant: At least one element of the array is Some
pub(super) struct Week([Option<StyledDate>; DAYS_IN_WEEK]);

impl Week {
    fn new(index: usize, date: StyledDate) -> Self {
        let mut this = Week([None; DAYS_IN_WEEK]);
        this.set(index, date);
        this
    }

    fn set(&mut self, index: usize, date: StyledDate) {
        assert!(index < DAYS_IN_WEEK, "weekday index should be less than 7");
        self.0[index] = Some(date);
    }

    /// Renders the week as seven two-column cells separated by spaces,
    /// followed by the gutter
    pub(super) fn to_line(&self) -> Line<'static> {
        let mut spans = Vec::with_capacity(DAYS_IN_WEEK * 2 + 1);
        for (i, cell) in self.0.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(match cell {
                Some(sd) => sd.show(),
                None => Span::raw(EMPTY_CELL),
            });
        }
        spans.push(Span::raw(" "));
        spans.push(Span::raw(GUTTER));
        Line::from(spans)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct WeekFactory<S> {
    styler: S,
    first_weekday: Weekday,
}

impl<S: DateStyler> WeekFactory<S> {
    pub(super) fn new(styler: S, first_weekday: Weekday) -> Self {
        WeekFactory {
            styler,
            first_weekday,
        }
    }

    /// Splits the month starting at `day1` into weeks.  Days of the first and
    /// last weeks that fall outside the month are left empty.
    pub(super) fn month(&self, day1: Date) -> Vec<Week> {
        let mut weeks: Vec<Week> = Vec::with_capacity(6);
        for date in iter_days_from(day1).take_while(|d| d.month() == day1.month()) {
            let i = date.weekday().index_from(self.first_weekday);
            let sd = self.style_date(date);
            match weeks.last_mut() {
                Some(week) if i > 0 => week.set(i, sd),
                _ => weeks.push(Week::new(i, sd)),
            }
        }
        weeks
    }

    fn style_date(&self, date: Date) -> StyledDate {
        StyledDate {
            date,
            style: self.styler.date_style(date),
        }
    }
}

/// The two-letter names of the days of a week starting on `first`
pub(super) fn weekday_names(first: Weekday) -> Vec<&'static str> {
    successors(Some(first), |wd| Some(wd.next()))
        .take(DAYS_IN_WEEK)
        .map(|wd| wd.abbrev())
        .collect()
}

fn iter_days_from(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day())
}
