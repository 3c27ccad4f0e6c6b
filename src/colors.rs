use crate::theme::PALETTE;
use ratatui::style::Color;
use std::collections::{HashMap, VecDeque};

/// Hands out a stable display color per calendar.
///
/// The first time a calendar is seen it gets the color at the head of the
/// palette, and the palette is rotated by one so that the next new calendar
/// gets the following color.  Once every color has been used, colors are
/// reused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ColorAssigner {
    palette: VecDeque<Color>,
    assigned: HashMap<String, Color>,
}

impl ColorAssigner {
    pub(crate) fn with_palette<I: IntoIterator<Item = Color>>(palette: I) -> Self {
        ColorAssigner {
            palette: palette.into_iter().collect(),
            assigned: HashMap::new(),
        }
    }

    pub(crate) fn color_for(&mut self, source_id: &str) -> Color {
        if let Some(&color) = self.assigned.get(source_id) {
            return color;
        }
        // An empty palette leaves everything in the terminal's default color
        let color = self.palette.front().copied().unwrap_or_default();
        if !self.palette.is_empty() {
            self.palette.rotate_left(1);
        }
        self.assigned.insert(source_id.to_owned(), color);
        color
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        ColorAssigner::with_palette(PALETTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_source_same_color() {
        let mut colors = ColorAssigner::default();
        let first = colors.color_for("cal1");
        assert_eq!(colors.color_for("cal1"), first);
        assert_eq!(first, Color::Blue);
    }

    #[test]
    fn test_palette_order_wraps() {
        let mut colors = ColorAssigner::with_palette([Color::Red, Color::Cyan, Color::Yellow]);
        let got = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|id| colors.color_for(id))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            [
                Color::Red,
                Color::Cyan,
                Color::Yellow,
                Color::Red,
                Color::Cyan
            ]
        );
        assert_eq!(colors.color_for("b"), Color::Cyan);
        assert_eq!(colors.color_for("f"), Color::Yellow);
    }

    #[test]
    fn test_empty_palette() {
        let mut colors = ColorAssigner::with_palette([]);
        assert_eq!(colors.color_for("a"), Color::Reset);
        assert_eq!(colors.color_for("b"), Color::Reset);
    }
}
