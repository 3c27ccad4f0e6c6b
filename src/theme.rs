use ratatui::style::{Color, Modifier, Style};

/// Colors handed out to calendars in order of first appearance
pub(crate) const PALETTE: [Color; 4] = [Color::Blue, Color::Green, Color::Magenta, Color::Red];

pub(crate) const TODAY_MODIFIER: Modifier = Modifier::UNDERLINED;

pub(crate) fn color_style(color: Option<Color>) -> Style {
    match color {
        Some(c) => Style::new().fg(c),
        None => Style::new(),
    }
}
