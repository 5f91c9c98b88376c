//! Style sheet loaded at startup.
//!
//! Every field has a default, so a partial file only overrides what it
//! names and a missing or broken file leaves the player unstyled.

use crate::APP_NAME;
use iced::{window, Color, Size, Theme};
use serde::Deserialize;
use std::path::Path;

/// Where the binary looks for its style sheet.
pub const STYLE_PATH: &str = "assets/style.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Start from the dark built-in theme instead of the light one.
    pub dark: bool,
    pub colors: Colors,
    pub window: WindowStyle,
}

/// Palette overrides as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub background: Option<String>,
    pub text: Option<String>,
    pub primary: Option<String>,
    pub success: Option<String>,
    pub danger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowStyle {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub always_on_top: bool,
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheet {
            dark: true,
            colors: Colors::default(),
            window: WindowStyle::default(),
        }
    }
}

impl Default for WindowStyle {
    fn default() -> Self {
        WindowStyle {
            width: 640.0,
            height: 400.0,
            min_width: 640.0,
            min_height: 400.0,
            always_on_top: false,
        }
    }
}

impl StyleSheet {
    /// Reads the style sheet at `path`, falling back to the default style.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("cannot read style sheet {}: {err}", path.display());
                return Self::default();
            }
        };
        match Self::parse(&source) {
            Ok(style) => {
                log::debug!("loaded style sheet {}", path.display());
                style
            }
            Err(err) => {
                log::warn!("invalid style sheet {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn theme(&self) -> Theme {
        let base = if self.dark { Theme::Dark } else { Theme::Light };
        if self.colors == Colors::default() {
            return base;
        }

        let mut palette = base.palette();
        let overrides = [
            (&self.colors.background, &mut palette.background),
            (&self.colors.text, &mut palette.text),
            (&self.colors.primary, &mut palette.primary),
            (&self.colors.success, &mut palette.success),
            (&self.colors.danger, &mut palette.danger),
        ];
        for (value, slot) in overrides {
            let Some(value) = value else { continue };
            match parse_hex(value) {
                Some(color) => *slot = color,
                None => log::warn!("ignoring invalid color {value:?}"),
            }
        }
        Theme::custom(APP_NAME.to_owned(), palette)
    }

    pub fn window_settings(&self) -> window::Settings {
        let style = &self.window;
        window::Settings {
            size: Size::new(style.width, style.height),
            min_size: Some(Size::new(style.min_width, style.min_height)),
            level: if style.always_on_top {
                window::Level::AlwaysOnTop
            } else {
                window::Level::Normal
            },
            ..window::Settings::default()
        }
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() || !matches!(hex.len(), 6 | 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    let a = if hex.len() == 8 { channel(6)? } else { 0xFF };
    Some(Color::from_rgba8(r, g, b, a as f32 / 255.0))
}
