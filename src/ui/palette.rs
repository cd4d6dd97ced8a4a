use ratatui::style::Color;

use crate::domain::task::Priority;
use crate::domain::theme::{ColorSet, Rgb, ThemeMode, ThemeSet, resolve_colors};

/// Terminal colours for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub secondary: Color,
    pub highlight: Color,
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub danger: Color,
}

impl Palette {
    pub fn resolve(mode: ThemeMode, set: &ThemeSet) -> Self {
        match resolve_colors(mode, set) {
            Some(colors) => Self::from_colors(colors),
            None => Self::terminal_default(),
        }
    }

    fn terminal_default() -> Self {
        Self {
            accent: Color::Cyan,
            secondary: Color::Yellow,
            highlight: Color::Magenta,
            background: Color::Reset,
            text: Color::Reset,
            muted: Color::DarkGray,
            danger: Color::Red,
        }
    }

    fn from_colors(colors: &ColorSet) -> Self {
        Self {
            accent: rgb(colors.primary),
            secondary: rgb(colors.secondary),
            highlight: rgb(colors.tertiary),
            background: rgb(colors.background),
            text: rgb(colors.on_surface_variant),
            muted: rgb(colors.surface_variant),
            danger: Color::Red,
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.danger,
            Priority::Medium => self.secondary,
            Priority::Low => self.accent,
        }
    }
}

fn rgb(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_mode_keeps_terminal_colors() {
        let palette = Palette::resolve(ThemeMode::System, ThemeSet::default_set());
        assert_eq!(palette.background, Color::Reset);
    }

    #[test]
    fn dark_mode_uses_palette_background() {
        let palette = Palette::resolve(ThemeMode::Dark, ThemeSet::by_name("Blue Theme"));
        assert_eq!(palette.background, Color::Rgb(0x20, 0x21, 0x24));
        assert_eq!(palette.accent, Color::Rgb(0x8A, 0xB4, 0xF8));
    }
}
