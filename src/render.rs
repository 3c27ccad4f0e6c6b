use crate::event::Event;
use crate::grid::{blank_line, MonthGrid, GRID_WIDTH};
use ratatui::text::{Line, Span, Text};
use std::iter::repeat_with;

/// One month with its events listed to the right of the grid, continuing
/// below it if there are more events than grid lines
pub(crate) fn single(grid: &MonthGrid, events: &[Event]) -> Text<'static> {
    let mut lines = vec![grid.header()];
    let mut events = events.iter();
    for mut line in grid.render() {
        if let Some(ev) = events.next() {
            line.push_span(ev.description());
        }
        lines.push(line);
    }
    for ev in events {
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(GRID_WIDTH)),
            ev.description(),
        ]));
    }
    Text::from(lines)
}

/// Three months side by side, followed by a blank line and the events of the
/// middle month
pub(crate) fn three(
    prev: &MonthGrid,
    current: &MonthGrid,
    next: &MonthGrid,
    events: &[Event],
) -> Text<'static> {
    let mut lines = vec![join([prev.header(), current.header(), next.header()])];
    let [mut a, mut b, mut c] = [prev.render(), current.render(), next.render()];
    let height = a.len().max(b.len()).max(c.len());
    for grid_lines in [&mut a, &mut b, &mut c] {
        let missing = height - grid_lines.len();
        grid_lines.extend(repeat_with(blank_line).take(missing));
    }
    for ((x, y), z) in a.into_iter().zip(b).zip(c) {
        lines.push(join([x, y, z]));
    }
    lines.push(Line::default());
    lines.extend(events.iter().map(|ev| Line::from(ev.description())));
    Text::from(lines)
}

fn join(parts: [Line<'static>; 3]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.extend(part.spans);
    }
    Line::from(spans)
}
