use time::Weekday;

/// Display settings chosen on the command line
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Options {
    /// Show the previous, current, and next months side by side
    pub(crate) three: bool,
    pub(crate) sunday: bool,
    pub(crate) monday: bool,
    // Not used by the display yet
    pub(crate) show_past: bool,
    // Not used by the display yet
    pub(crate) max_events: usize,
}

impl Options {
    /// Weeks start on Sunday if requested, otherwise on Monday
    pub(crate) fn first_weekday(&self) -> Weekday {
        if self.sunday {
            Weekday::Sunday
        } else {
            Weekday::Monday
        }
    }
}

impl Default for Options {
    fn default() -> Options {
        Options {
            three: false,
            sunday: false,
            monday: false,
            show_past: false,
            max_events: 5,
        }
    }
}
