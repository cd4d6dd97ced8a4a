use crate::domain::theme::{ThemeMode, ThemeSet};
use crate::repo::prefs::PreferenceStore;

const THEME_MODE_KEY: &str = "theme_mode";
const SELECTED_THEME_SET_KEY: &str = "selected_theme_set";

/// Theme mode and palette, mirrored to a preference store.
pub struct SettingsController<P: PreferenceStore> {
    store: P,
    theme_mode: ThemeMode,
    theme_set: &'static ThemeSet,
}

impl<P: PreferenceStore> SettingsController<P> {
    /// Reads the stored values. Missing or unrecognised entries fall back to
    /// `System` and the first palette.
    pub fn new(store: P) -> Self {
        let theme_mode = store
            .read_string(THEME_MODE_KEY)
            .and_then(|raw| raw.parse::<ThemeMode>().ok())
            .unwrap_or_default();
        let theme_set = store
            .read_string(SELECTED_THEME_SET_KEY)
            .map(|name| ThemeSet::by_name(&name))
            .unwrap_or_else(ThemeSet::default_set);
        tracing::debug!(mode = theme_mode.as_str(), set = theme_set.name, "loaded settings");
        Self {
            store,
            theme_mode,
            theme_set,
        }
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn theme_set(&self) -> &'static ThemeSet {
        self.theme_set
    }

    pub fn update_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.store.write_string(THEME_MODE_KEY, mode.as_str());
    }

    pub fn update_theme_set(&mut self, set: &'static ThemeSet) {
        self.theme_set = set;
        self.store.write_string(SELECTED_THEME_SET_KEY, set.name);
    }
}
