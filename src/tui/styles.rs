//! Colour palette and preset styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{ImpactLevel, RiskLevel};

/// CareEnforced colour palette (slate background, blue accents).
pub struct CareTheme;

impl CareTheme {
    // === Primary Colors ===

    /// Blue 500
    pub const PRIMARY: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Blue 400 for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(96, 165, 250); // #60A5FA

    /// Blue 800 for header bars
    pub const PRIMARY_DARK: Color = Color::Rgb(30, 64, 175); // #1E40AF

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    pub const SUCCESS: Color = Color::Rgb(34, 197, 94); // #22C55E
    pub const WARNING: Color = Color::Rgb(234, 179, 8); // #EAB308
    pub const DANGER: Color = Color::Rgb(239, 68, 68); // #EF4444
    pub const HIGHLIGHT: Color = Color::Rgb(249, 115, 22); // #F97316

    // === Background Colors ===

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A
    pub const BG_CARD: Color = Color::Rgb(51, 65, 85); // #334155

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// "High Impact" field badge
    #[must_use]
    pub fn high_impact() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn risk_level(level: RiskLevel) -> Style {
        match level {
            RiskLevel::Low => Self::success(),
            RiskLevel::Medium => Self::warning(),
            RiskLevel::High => Self::danger(),
        }
    }

    /// Filled badge for a risk category.
    #[must_use]
    pub fn risk_badge(level: RiskLevel) -> Style {
        let bg = match level {
            RiskLevel::Low => Self::SUCCESS,
            RiskLevel::Medium => Self::WARNING,
            RiskLevel::High => Self::DANGER,
        };
        Style::default()
            .fg(Self::BG_DARK)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn impact(level: ImpactLevel) -> Style {
        match level {
            ImpactLevel::High => Self::danger().add_modifier(Modifier::BOLD),
            ImpactLevel::Medium => Self::warning().add_modifier(Modifier::BOLD),
            ImpactLevel::Low => Self::success().add_modifier(Modifier::BOLD),
            ImpactLevel::Unspecified => Self::text_muted(),
        }
    }
}

pub const LOGO: &str = r"
  ___               ___       __                    _
 / __|__ _ _ _ ___ | __|_ _  / _|___ _ _ __ ___ __| |
| (__/ _` | '_/ -_)| _|| ' \|  _/ _ \ '_/ _/ -_) _` |
 \___\__,_|_| \___||___|_||_|_| \___/_| \__\___\__,_|
";
