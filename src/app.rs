use crate::colors::ColorAssigner;
use crate::grid::MonthGrid;
use crate::month::CalMonth;
use crate::options::Options;
use crate::render;
use crate::store::EventStore;
use crate::timerange::{InvalidDateError, TimeZone};
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::Backend, text::Text, widgets::Paragraph, Terminal};
use std::io;
use time::Date;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Key {
    MoveNext,
    MovePrevious,
    Quit,
    Other,
}

pub(crate) trait KeySource {
    /// Blocks until the next input event
    fn next_key(&mut self) -> io::Result<Key>;
}

/// Keys read from the terminal.  Anything other than a press of right,
/// left, or `q` (including resizes) is [`Key::Other`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Key> {
        Ok(read()?.as_key_press_event().map_or(Key::Other, key_for))
    }
}

fn key_for(event: KeyEvent) -> Key {
    let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
    if !normal_modifiers.contains(event.modifiers) {
        return Key::Other;
    }
    match event.code {
        KeyCode::Right => Key::MoveNext,
        KeyCode::Left => Key::MovePrevious,
        KeyCode::Char('q') => Key::Quit,
        _ => Key::Other,
    }
}

#[derive(Debug)]
pub(crate) struct App {
    store: EventStore,
    zone: Box<dyn TimeZone>,
    colors: ColorAssigner,
    options: Options,
    today: Date,
    month: CalMonth,
    state: AppState,
}

impl App {
    pub(crate) fn new(
        store: EventStore,
        zone: Box<dyn TimeZone>,
        options: Options,
        today: Date,
        start: Date,
    ) -> Result<App, InvalidDateError> {
        let month = CalMonth::containing(start, zone.as_ref(), &store)?;
        Ok(App {
            store,
            zone,
            colors: ColorAssigner::default(),
            options,
            today,
            month,
            state: AppState::Displaying,
        })
    }

    pub(crate) fn run<B: Backend, K: KeySource>(
        mut self,
        terminal: &mut Terminal<B>,
        keys: &mut K,
    ) -> anyhow::Result<()>
    where
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let mut drawn = false;
        loop {
            match self.state {
                AppState::Displaying => {
                    if drawn {
                        terminal.clear()?;
                    }
                    self.draw(terminal)?;
                    drawn = true;
                    self.state = AppState::AwaitingInput;
                }
                AppState::AwaitingInput => {
                    let key = keys.next_key()?;
                    self.handle_key(key);
                }
                AppState::Terminated => return Ok(()),
            }
        }
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), B::Error> {
        let text = self.screen();
        terminal.draw(|frame| frame.render_widget(Paragraph::new(text), frame.area()))?;
        Ok(())
    }

    fn handle_key(&mut self, key: Key) {
        let moved = match key {
            Key::MoveNext => self.month.next(self.zone.as_ref(), &self.store),
            Key::MovePrevious => self.month.previous(self.zone.as_ref(), &self.store),
            Key::Quit => {
                self.state = AppState::Terminated;
                return;
            }
            Key::Other => {
                self.state = AppState::Displaying;
                return;
            }
        };
        match moved {
            Ok(month) => {
                debug!(month = %month.month(), year = month.year(), "switched month");
                self.month = month;
            }
            Err(e) => warn!(error = %e, "cannot move past the end of the calendar"),
        }
        self.state = AppState::Displaying;
    }

    /// Builds the grids for the current display mode & lays them out.  In
    /// three-month mode the neighboring months are loaded fresh each time.
    fn screen(&mut self) -> Text<'static> {
        let first_weekday = self.options.first_weekday();
        if self.options.three {
            let zone = self.zone.as_ref();
            match (
                self.month.previous(zone, &self.store),
                self.month.next(zone, &self.store),
            ) {
                (Ok(prev), Ok(next)) => {
                    let grids = [&prev, &self.month, &next].map(|m| {
                        MonthGrid::build(m, &mut self.colors, first_weekday, self.today)
                    });
                    return render::three(&grids[0], &grids[1], &grids[2], self.month.events());
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "cannot show neighboring months; showing one month");
                }
            }
        }
        let grid = MonthGrid::build(&self.month, &mut self.colors, first_weekday, self.today);
        render::single(&grid, self.month.events())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Displaying,
    AwaitingInput,
    Terminated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{row, MemorySource};
    use crate::theme::TODAY_MODIFIER;
    use crate::timerange::testing::berlin_autumn_2026;
    use ratatui::{
        backend::TestBackend,
        buffer::{Buffer, Cell},
        style::Color,
    };
    use std::collections::VecDeque;
    use time::macros::date;
    use time::{Month, UtcOffset};

    // 2026-10-16T08:00:00Z
    const OCT_16_8AM: i64 = 1_792_137_600;

    /// Plays back the given keys, then quits
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    struct Script(VecDeque<Key>);

    impl KeySource for Script {
        fn next_key(&mut self) -> io::Result<Key> {
            Ok(self.0.pop_front().unwrap_or(Key::Quit))
        }
    }

    fn store() -> EventStore {
        EventStore::new(Box::new(MemorySource::seconds(vec![
            row("cal1", "a", "Breakfast", OCT_16_8AM, OCT_16_8AM + 1800),
            row("cal1", "b", "Coffee", OCT_16_8AM + 3600, OCT_16_8AM + 4500),
            row("cal1", "c", "Standup", OCT_16_8AM + 7200, OCT_16_8AM + 8100),
        ])))
    }

    fn app(store: EventStore, options: Options) -> App {
        let today = date!(2026 - 10 - 16);
        App::new(store, Box::new(UtcOffset::UTC), options, today, today).unwrap()
    }

    fn row_text(buffer: &Buffer, y: u16, width: u16) -> String {
        (0..width).map(|x| buffer[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_quit_immediately_on_empty_calendar() {
        let app = app(EventStore::default(), Options::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut keys = Script::default();
        app.run(&mut terminal, &mut keys).unwrap();
        let buffer = terminal.backend().buffer();
        assert_eq!(row_text(buffer, 0, 23), "   October / 2026      ");
        assert_eq!(row_text(buffer, 1, 23), "Mo Tu We Th Fr Sa Su   ");
        assert_eq!(row_text(buffer, 4, 23), "12 13 14 15 16 17 18   ");
        assert_eq!(row_text(buffer, 8, 60).trim(), "");
    }

    #[test]
    fn test_navigation_and_other_keys() {
        let mut app = app(store(), Options::default());
        let original = app.month.clone();
        app.handle_key(Key::MoveNext);
        assert_eq!(app.state, AppState::Displaying);
        assert_eq!((app.month.month(), app.month.year()), (Month::November, 2026));
        assert!(app.month.events().is_empty());
        app.handle_key(Key::MovePrevious);
        assert_eq!(app.month, original);
        app.handle_key(Key::Other);
        assert_eq!(app.state, AppState::Displaying);
        assert_eq!(app.month, original);
        app.handle_key(Key::Quit);
        assert_eq!(app.state, AppState::Terminated);
    }

    #[test]
    fn test_round_trip_redraws_same_screen() {
        let mut app = app(store(), Options::default());
        let before = app.screen();
        app.handle_key(Key::MoveNext);
        app.handle_key(Key::MovePrevious);
        assert_eq!(app.screen(), before);
    }

    #[test]
    fn test_run_ends_on_shown_month() {
        let app = app(store(), Options::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut keys = Script(VecDeque::from([
            Key::MovePrevious,
            Key::Other,
            Key::MovePrevious,
        ]));
        app.run(&mut terminal, &mut keys).unwrap();
        assert!(keys.0.is_empty());
        let buffer = terminal.backend().buffer();
        assert_eq!(row_text(buffer, 0, 23), "   August / 2026       ");
    }

    #[test]
    fn test_shared_calendar_colors_today() {
        let mut app = app(store(), Options::default());
        let text = app.screen();
        assert!(app
            .month
            .events()
            .iter()
            .all(|ev| ev.color() == Some(Color::Blue)));
        // Friday the 16th in the third week, colored & underlined
        let cell = &text.lines[4].spans[8];
        assert_eq!(cell.content, "16");
        assert_eq!(cell.style.fg, Some(Color::Blue));
        assert!(cell.style.add_modifier.contains(TODAY_MODIFIER));
        assert_eq!(
            text.lines[1].spans.last().map(|s| s.content.to_string()),
            Some(String::from("Breakfast: 16 8:00 -> 8:30"))
        );
    }

    #[test]
    fn test_three_months() {
        let options = Options {
            three: true,
            ..Options::default()
        };
        let app = app(store(), options);
        let mut terminal = Terminal::new(TestBackend::new(80, 14)).unwrap();
        app.run(&mut terminal, &mut Script::default()).unwrap();
        let buffer = terminal.backend().buffer();
        assert_eq!(
            row_text(buffer, 0, 71),
            "   September / 2026        October / 2026          November / 2026     "
        );
        assert_eq!(row_text(buffer, 7, 71).trim(), "30");
        assert_eq!(row_text(buffer, 8, 71).trim(), "");
        assert_eq!(row_text(buffer, 9, 26), "Breakfast: 16 8:00 -> 8:30");
        assert_eq!(row_text(buffer, 11, 26), "Standup: 16 10:00 -> 10:15");
    }

    #[test]
    fn test_key_modifiers() {
        let press = |code, modifiers| key_for(KeyEvent::new(code, modifiers));
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::NONE), Key::Quit);
        assert_eq!(press(KeyCode::Right, KeyModifiers::NONE), Key::MoveNext);
        assert_eq!(press(KeyCode::Left, KeyModifiers::SHIFT), Key::MovePrevious);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::ALT), Key::Other);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::CONTROL), Key::Other);
        assert_eq!(press(KeyCode::Char('Q'), KeyModifiers::SHIFT), Key::Other);
        assert_eq!(press(KeyCode::Right, KeyModifiers::CONTROL), Key::Other);
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::NONE), Key::Other);
    }

    fn terminal_with_leftovers() -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let leftover = Cell::new("X");
        terminal
            .backend_mut()
            .draw([(59, 11, &leftover)].into_iter())
            .unwrap();
        terminal
    }

    #[test]
    fn test_first_draw_keeps_leftovers() {
        let app = app(EventStore::default(), Options::default());
        let mut terminal = terminal_with_leftovers();
        app.run(&mut terminal, &mut Script::default()).unwrap();
        assert_eq!(terminal.backend().buffer()[(59, 11)].symbol(), "X");
    }

    #[test]
    fn test_unrecognized_key_clears_screen() {
        let app = app(EventStore::default(), Options::default());
        let mut terminal = terminal_with_leftovers();
        let mut keys = Script(VecDeque::from([Key::Other]));
        app.run(&mut terminal, &mut keys).unwrap();
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(59, 11)].symbol(), " ");
        assert_eq!(row_text(buffer, 0, 23), "   October / 2026      ");
        assert_eq!(row_text(buffer, 4, 23), "12 13 14 15 16 17 18   ");
    }

    #[test]
    fn test_event_times_after_daylight_saving_ends() {
        // 2026-12-10T08:00:00Z
        let store = EventStore::new(Box::new(MemorySource::seconds(vec![row(
            "cal1",
            "d",
            "Dentist",
            1_796_889_600,
            1_796_893_200,
        )])));
        let today = date!(2026 - 10 - 16);
        let mut app = App::new(
            store,
            Box::new(berlin_autumn_2026()),
            Options::default(),
            today,
            today,
        )
        .unwrap();
        app.handle_key(Key::MoveNext);
        app.handle_key(Key::MoveNext);
        assert_eq!((app.month.month(), app.month.year()), (Month::December, 2026));
        let text = app.screen();
        assert_eq!(
            text.lines[1].spans.last().map(|s| s.content.to_string()),
            Some(String::from("Dentist: 10 9:00 -> 10:00"))
        );
    }
}
