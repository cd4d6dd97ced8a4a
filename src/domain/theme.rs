use std::str::FromStr;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::System => "SYSTEM",
            ThemeMode::Light => "LIGHT",
            ThemeMode::Dark => "DARK",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::System => "System",
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ThemeMode::System => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SYSTEM" => Ok(ThemeMode::System),
            "LIGHT" => Ok(ThemeMode::Light),
            "DARK" => Ok(ThemeMode::Dark),
            other => Err(anyhow!("unknown theme mode {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSet {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub tertiary: Rgb,
    pub background: Rgb,
    pub surface: Rgb,
    pub surface_variant: Rgb,
    pub on_surface_variant: Rgb,
    pub primary_container: Rgb,
    pub on_primary_container: Rgb,
}

/// A named palette with one colour set per appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSet {
    pub name: &'static str,
    pub light: ColorSet,
    pub dark: ColorSet,
}

impl ThemeSet {
    /// Looks a palette up by name, falling back to the first built-in one.
    pub fn by_name(name: &str) -> &'static ThemeSet {
        THEME_SETS
            .iter()
            .find(|set| set.name == name)
            .unwrap_or(&THEME_SETS[0])
    }

    pub fn default_set() -> &'static ThemeSet {
        &THEME_SETS[0]
    }

    /// The palette after this one, wrapping around.
    pub fn next(&self) -> &'static ThemeSet {
        let pos = THEME_SETS
            .iter()
            .position(|set| set.name == self.name)
            .unwrap_or(0);
        &THEME_SETS[(pos + 1) % THEME_SETS.len()]
    }
}

/// Colours to paint with for a mode. `System` keeps the terminal defaults.
pub fn resolve_colors(mode: ThemeMode, set: &ThemeSet) -> Option<&ColorSet> {
    match mode {
        ThemeMode::Light => Some(&set.light),
        ThemeMode::Dark => Some(&set.dark),
        ThemeMode::System => None,
    }
}

const fn colors(hex: [u32; 9]) -> ColorSet {
    ColorSet {
        primary: Rgb::hex(hex[0]),
        secondary: Rgb::hex(hex[1]),
        tertiary: Rgb::hex(hex[2]),
        background: Rgb::hex(hex[3]),
        surface: Rgb::hex(hex[4]),
        surface_variant: Rgb::hex(hex[5]),
        on_surface_variant: Rgb::hex(hex[6]),
        primary_container: Rgb::hex(hex[7]),
        on_primary_container: Rgb::hex(hex[8]),
    }
}

pub static THEME_SETS: [ThemeSet; 4] = [
    ThemeSet {
        name: "Purple Theme",
        light: colors([
            0x6200EE, 0x03DAC6, 0xBB86FC, 0xFFFFFF, 0xFFFFFF, 0xF2F2F2, 0x333333, 0xEDE7F6,
            0x311B92,
        ]),
        dark: colors([
            0xBB86FC, 0x03DAC6, 0x3700B3, 0x121212, 0x121212, 0x2C2C2C, 0xCCCCCC, 0x3700B3,
            0xEDE7F6,
        ]),
    },
    ThemeSet {
        name: "Blue Theme",
        light: colors([
            0x1A73E8, 0x4285F4, 0x34A853, 0xFFFFFF, 0xFFFFFF, 0xF1F3F4, 0x202124, 0xD2E3FC,
            0x174EA6,
        ]),
        dark: colors([
            0x8AB4F8, 0x4285F4, 0x34A853, 0x202124, 0x303134, 0x3C4043, 0xE8EAED, 0x174EA6,
            0xD2E3FC,
        ]),
    },
    ThemeSet {
        name: "Red Theme",
        light: colors([
            0xB00020, 0x018786, 0xFF4081, 0xFFFFFF, 0xFFFFFF, 0xF1F1F1, 0x333333, 0xEF9A9A,
            0xB71C1C,
        ]),
        dark: colors([
            0xCF6679, 0x03DAC6, 0xFF4081, 0x121212, 0x121212, 0x2C2C2C, 0xE0E0E0, 0xB00020,
            0xECEFF1,
        ]),
    },
    ThemeSet {
        name: "Green Theme",
        light: colors([
            0x388E3C, 0x8BC34A, 0x4CAF50, 0xFFFFFF, 0xFFFFFF, 0xF5F5F5, 0x212121, 0xC8E6C9,
            0x1B5E20,
        ]),
        dark: colors([
            0x81C784, 0x8BC34A, 0x4CAF50, 0x121212, 0x121212, 0x2C2C2C, 0xE8E8E8, 0x1B5E20,
            0x81C784,
        ]),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_palette_falls_back_to_first() {
        assert_eq!(ThemeSet::by_name("Blue Theme").name, "Blue Theme");
        assert_eq!(ThemeSet::by_name("Neon").name, "Purple Theme");
    }

    #[test]
    fn next_palette_wraps() {
        let last = &THEME_SETS[3];
        assert_eq!(last.next().name, THEME_SETS[0].name);
        assert_eq!(THEME_SETS[0].next().name, THEME_SETS[1].name);
    }

    #[test]
    fn resolve_picks_colors_per_mode() {
        let set = ThemeSet::by_name("Red Theme");
        assert_eq!(resolve_colors(ThemeMode::Light, set), Some(&set.light));
        assert_eq!(resolve_colors(ThemeMode::Dark, set), Some(&set.dark));
        assert_eq!(resolve_colors(ThemeMode::System, set), None);
    }

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Rgb::hex(0x6200EE), Rgb(0x62, 0x00, 0xEE));
    }

    #[test]
    fn theme_mode_names_parse_back() {
        assert_eq!("DARK".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!("dim".parse::<ThemeMode>().is_err());
    }
}
