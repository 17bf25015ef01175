//! UI theme: palette tokens and style helpers for the timeline view.

use ratatui::style::{Color, Modifier, Style};

use tickline_core::model::StatusKind;

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (gaps, tertiary info)
    pub text_muted: Color,
    /// Accent color (titles, focus)
    pub accent: Color,
    pub ok: Color,
    pub missed: Color,
    pub timeout: Color,
    pub error: Color,
    pub in_progress: Color,
    /// Key hint text
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),
            ok: Color::Rgb(78, 201, 176),
            missed: Color::Rgb(220, 180, 100),
            timeout: Color::Rgb(230, 140, 70),
            error: Color::Rgb(244, 135, 113),
            in_progress: Color::Rgb(156, 220, 254),
            key_hint: Color::Rgb(206, 145, 120),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn status_color(&self, status: StatusKind) -> Color {
        match status {
            StatusKind::Ok => self.palette.ok,
            StatusKind::Missed => self.palette.missed,
            StatusKind::Timeout => self.palette.timeout,
            StatusKind::Error => self.palette.error,
            StatusKind::InProgress => self.palette.in_progress,
        }
    }

    pub fn status_style(&self, status: StatusKind) -> Style {
        Style::default().fg(self.status_color(status))
    }

    pub fn status_icon(&self, status: StatusKind) -> &'static str {
        match status {
            StatusKind::Ok => "●",
            StatusKind::Missed => "○",
            StatusKind::Timeout => "◷",
            StatusKind::Error => "✗",
            StatusKind::InProgress => "◐",
        }
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

pub mod styles {
    use super::*;

    pub fn status(status: StatusKind) -> Style {
        theme().status_style(status)
    }

    pub fn status_icon(status: StatusKind) -> &'static str {
        theme().status_icon(status)
    }

    pub fn key_hint() -> Style {
        Style::default().fg(theme().palette.key_hint)
    }

    pub fn border_subtle() -> Style {
        Style::default().fg(theme().palette.panel_border)
    }

    pub fn text() -> Style {
        Style::default().fg(theme().palette.text)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(theme().palette.text_dim)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(theme().palette.text_muted)
    }

    pub fn accent_bold() -> Style {
        Style::default()
            .fg(theme().palette.accent)
            .add_modifier(Modifier::BOLD)
    }
}
