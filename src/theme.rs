//! Visual themes: diagram color tables and the editor's light/dark mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Colors used to draw a diagram, as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: &'static str,
    pub node_background: &'static str,
    pub node_border: &'static str,
    pub node_text: &'static str,
    pub edge: &'static str,
    pub grid: &'static str,
    pub accent: &'static str,
}

/// Diagram theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Modern,
    Dark,
    Nature,
}

impl Theme {
    pub const ALL: [Self; 4] = [Self::Classic, Self::Modern, Self::Dark, Self::Nature];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Dark => "dark",
            Self::Nature => "nature",
        }
    }

    /// Name shown in the theme picker.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Classic => "Classic B&W",
            Self::Modern => "Modern Blue",
            Self::Dark => "Dark Mode",
            Self::Nature => "Nature Green",
        }
    }

    #[must_use]
    pub fn colors(self) -> ThemeColors {
        match self {
            Self::Classic => ThemeColors {
                background: "#ffffff",
                node_background: "#ffffff",
                node_border: "#000000",
                node_text: "#000000",
                edge: "#000000",
                grid: "#e5e5e5",
                accent: "#000000",
            },
            Self::Modern => ThemeColors {
                background: "#f8fafc",
                node_background: "#ffffff",
                node_border: "#3b82f6",
                node_text: "#1e293b",
                edge: "#3b82f6",
                grid: "#e2e8f0",
                accent: "#3b82f6",
            },
            Self::Dark => ThemeColors {
                background: "#1e293b",
                node_background: "#334155",
                node_border: "#64748b",
                node_text: "#f1f5f9",
                edge: "#94a3b8",
                grid: "#475569",
                accent: "#60a5fa",
            },
            Self::Nature => ThemeColors {
                background: "#f0fdf4",
                node_background: "#ffffff",
                node_border: "#22c55e",
                node_text: "#14532d",
                edge: "#22c55e",
                grid: "#dcfce7",
                accent: "#16a34a",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTheme(s.to_owned()))
    }
}

/// Editor chrome mode, independent of the diagram theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    #[default]
    Light,
    Dark,
}

impl AppMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
