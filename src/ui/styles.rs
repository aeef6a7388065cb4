use ratatui::style::{Color, Modifier, Style};

use crate::app::Disposition;

// ── Background colors ──
pub const BG: Color = Color::Rgb(12, 12, 12);
pub const SURFACE: Color = Color::Rgb(20, 20, 20);
pub const PANEL: Color = Color::Rgb(26, 26, 26);
pub const BORDER: Color = Color::Rgb(42, 42, 42);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(200, 200, 200);
pub const DIM: Color = Color::Rgb(102, 102, 102);
pub const MUTED: Color = Color::Rgb(136, 136, 136);
pub const BRIGHT: Color = Color::Rgb(232, 232, 232);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const CYAN: Color = Color::Rgb(34, 211, 238);
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const PURPLE: Color = Color::Rgb(167, 139, 250);
pub const ORANGE: Color = Color::Rgb(251, 146, 60);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn selected_style() -> Style {
    Style::default().fg(BLUE).bg(Color::Rgb(26, 42, 58))
}

pub fn key_hint_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::BOLD)
}

/// Card border: bright for the active item, quiet otherwise
pub fn card_border(active: bool) -> Style {
    if active {
        Style::default().fg(BLUE)
    } else {
        Style::default().fg(BORDER)
    }
}

/// Status label color per disposition
pub fn disposition_style(disposition: &Disposition) -> Style {
    let color = match disposition {
        Disposition::Pending => return Style::default().fg(DIM),
        Disposition::Approved => GREEN,
        Disposition::Rejected { .. } => RED,
        Disposition::Duplicate { .. } => PURPLE,
        Disposition::Flagged { .. } => ORANGE,
        Disposition::MoreInfoRequested { .. } => YELLOW,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn required_style() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::ITALIC)
}
