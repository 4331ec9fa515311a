use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use super::calculator::{CalculatorProfile, RoiCalculator, RoiView};
use super::types::Scenario;
use crate::error::LandingError;

pub const THEME_KEY: &str = "theme";
pub const COOKIE_CONSENT_KEY: &str = "cookiesAccepted";
pub const NOTIFICATION_DISMISSED_KEY: &str = "notificationDismissed";

/// Key-value preference capability, the browser's local storage in the page.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Known preference keys and their values, in key order.
    pub fn preferences(&self) -> BTreeMap<String, String> {
        [THEME_KEY, COOKIE_CONSENT_KEY, NOTIFICATION_DISMISSED_KEY]
            .into_iter()
            .filter_map(|key| Some((key.to_string(), self.values.get(key)?.clone())))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than a stored `"dark"` falls back to light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon on the toggle button: it shows the theme a click switches to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "fa-moon",
            Theme::Dark => "fa-sun",
        }
    }
}

/// One user interaction that changes persisted preferences.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionAction {
    ToggleTheme,
    AcceptCookies,
    DeclineCookies,
    DismissNotifications,
}

impl FromStr for SessionAction {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "toggle-theme" => Ok(SessionAction::ToggleTheme),
            "accept-cookies" => Ok(SessionAction::AcceptCookies),
            "decline-cookies" => Ok(SessionAction::DeclineCookies),
            "dismiss-notifications" => Ok(SessionAction::DismissNotifications),
            _ => Err(LandingError::UnknownSessionAction(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub theme: Theme,
    pub toggle_icon: &'static str,
    pub scenario: Scenario,
    pub prompt_cookies: bool,
    pub cookies_accepted: Option<bool>,
    pub show_notification_banner: bool,
    pub calculator: RoiView,
}

/// Page-level state that would otherwise live in globals: the calculator, theme and flags.
pub struct SessionState<S> {
    store: S,
    theme: Theme,
    calculator: RoiCalculator,
}

impl<S: PreferenceStore> SessionState<S> {
    pub fn load(store: S, profile: CalculatorProfile) -> Self {
        let theme = Theme::from_stored(store.get(THEME_KEY).as_deref());
        Self {
            store,
            theme,
            calculator: RoiCalculator::new(profile),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.store.set(THEME_KEY, self.theme.as_str());
        self.theme
    }

    pub fn record_cookie_consent(&mut self, accepted: bool) {
        self.store
            .set(COOKIE_CONSENT_KEY, if accepted { "true" } else { "false" });
    }

    pub fn cookie_consent(&self) -> Option<bool> {
        match self.store.get(COOKIE_CONSENT_KEY).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn should_prompt_cookies(&self) -> bool {
        self.store.get(COOKIE_CONSENT_KEY).is_none()
    }

    pub fn dismiss_notifications(&mut self) {
        self.store.set(NOTIFICATION_DISMISSED_KEY, "true");
    }

    pub fn should_show_notification_banner(&self) -> bool {
        self.store.get(NOTIFICATION_DISMISSED_KEY).is_none()
    }

    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::ToggleTheme => {
                self.toggle_theme();
            }
            SessionAction::AcceptCookies => self.record_cookie_consent(true),
            SessionAction::DeclineCookies => self.record_cookie_consent(false),
            SessionAction::DismissNotifications => self.dismiss_notifications(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            theme: self.theme,
            toggle_icon: self.theme.toggle_icon(),
            scenario: self.calculator.selected(),
            prompt_cookies: self.should_prompt_cookies(),
            cookies_accepted: self.cookie_consent(),
            show_notification_banner: self.should_show_notification_banner(),
            calculator: self.calculator.view(),
        }
    }
}
