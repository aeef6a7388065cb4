use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use crate::app::keymap::{Action, Key};
use crate::app::{App, InputFocus};

/// Compute the display width of a list of spans
fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

/// Render the top status bar
///
///   rq · source                 3/10 reviewed · 12 total   SHORTCUTS  ADVANCE
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = Style::default().bg(styles::PANEL);

    let left = vec![
        Span::styled(
            " rq ",
            Style::default()
                .fg(styles::BG)
                .bg(styles::BLUE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", app.loader.describe()), Style::default().fg(styles::DIM)),
    ];

    let flag_style = |on: bool| {
        if on {
            Style::default()
                .fg(styles::BG)
                .bg(styles::GREEN)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(styles::MUTED)
        }
    };

    let mut right = Vec::new();
    if app.watching {
        right.push(Span::styled("◉ config ", Style::default().fg(styles::DIM)));
    }
    if app.loader.is_loading() {
        right.push(Span::styled("loading… ", Style::default().fg(styles::YELLOW)));
    }
    right.push(Span::styled(
        format!("{}/{} reviewed", app.queue.reviewed_count(), app.queue.len()),
        Style::default().fg(styles::TEXT),
    ));
    right.push(Span::styled(
        format!(" · {} total ", app.queue.total_count),
        Style::default().fg(styles::DIM),
    ));
    right.push(Span::styled(" SHORTCUTS ", flag_style(app.config.modes.shortcuts)));
    right.push(Span::raw(" "));
    right.push(Span::styled(" ADVANCE ", flag_style(app.config.modes.auto_advance)));
    right.push(Span::raw(" "));

    let gap = (area.width as usize).saturating_sub(spans_width(&left) + spans_width(&right));
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right);

    f.render_widget(Paragraph::new(Line::from(spans)).style(panel_bg), area);
}

/// A key-label hint pair, e.g. ("a", " approve ")
struct Hint {
    key: String,
    label: String,
}

impl Hint {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
    fn width(&self) -> usize {
        self.key.chars().count() + self.label.chars().count()
    }
}

/// Hints for whatever the keymap currently holds, then the fixed chrome keys
fn build_hints(app: &App) -> Vec<Hint> {
    if app.focus == InputFocus::TextField {
        return vec![
            Hint::new("Enter", " submit "),
            Hint::new("Esc", " cancel "),
            Hint::new("Tab", " shortcuts "),
        ];
    }

    let mut hints = Vec::new();
    let bindings = app.keymap.bindings();

    if app.config.modes.shortcuts {
        for (key, action) in &bindings {
            match (key, action) {
                (Key::Enter, _) | (_, Action::RejectReasonDetail { .. }) => {}
                (key, action) => hints.push(Hint::new(&key.label(), &format!(" {} ", action.label()))),
            }
        }
        if app.keymap.has_digit_bindings() {
            hints.push(Hint::new("1-9", " reason "));
        }
    } else {
        hints.push(Hint::new("", " shortcuts off "));
    }

    if let Some((_, action)) = bindings.iter().find(|(k, _)| *k == Key::Enter) {
        hints.push(Hint::new("Enter", &format!(" {} ", action.label())));
    }
    if app.dropdown.is_some() {
        hints.push(Hint::new("Esc", " close "));
    }
    if app.dropdown.as_ref().is_some_and(|d| d.input().is_some()) {
        hints.push(Hint::new("Tab", " type "));
    }

    hints.push(Hint::new("↑↓", " scroll "));
    hints.push(Hint::new("^S", " commit "));
    hints.push(Hint::new("^O", " options "));
    hints.push(Hint::new("^Q", " quit "));
    hints
}

/// Pack hints into rows that fit within `width`, returns vec of Lines
fn pack_hint_lines(hints: &[Hint], width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut current_w: usize = 1; // leading space

    for hint in hints {
        let hw = hint.width();
        if current_w + hw > width && !current_spans.is_empty() {
            // Wrap to next line
            lines.push(Line::from(current_spans));
            current_spans = Vec::new();
            current_w = 1;
        }
        if current_spans.is_empty() {
            current_spans.push(Span::raw(" "));
        }
        if !hint.key.is_empty() {
            current_spans.push(Span::styled(hint.key.clone(), styles::key_hint_style()));
        }
        current_spans.push(Span::styled(
            hint.label.clone(),
            if hint.key.is_empty() {
                // Indicator style (mode flags)
                Style::default().fg(styles::PURPLE)
            } else {
                Style::default().fg(styles::DIM)
            },
        ));
        current_w += hw;
    }
    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(vec![Span::raw(" ")]));
    }
    lines
}

/// Calculate how many rows the bottom bar needs
pub fn bottom_bar_height(app: &App, width: u16) -> u16 {
    let hints = build_hints(app);
    let lines = pack_hint_lines(&hints, width as usize);
    (lines.len() as u16).max(1)
}

/// Render the bottom keybinding hints bar
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let panel_bg = Style::default().bg(styles::PANEL);
    let hints = build_hints(app);
    let lines = pack_hint_lines(&hints, area.width as usize);

    let row_count = lines.len() as u16;
    let constraints: Vec<ratatui::layout::Constraint> = (0..row_count)
        .map(|_| ratatui::layout::Constraint::Length(1))
        .collect();
    let rows = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, line) in lines.into_iter().enumerate() {
        let bar = Paragraph::new(line).style(panel_bg);
        f.render_widget(bar, rows[i]);
    }
}

/// Render the transient notice in the top-right corner
pub fn render_notification(f: &mut Frame, area: Rect, message: &str) {
    let notif_width = message.chars().count() as u16 + 4;
    let notif_x = area.x + area.width.saturating_sub(notif_width + 2);
    let notif_y = area.y + 2;

    let notif_area = Rect {
        x: notif_x,
        y: notif_y.min(area.bottom().saturating_sub(1)),
        width: notif_width.min(area.width),
        height: 1,
    };

    let notif = Paragraph::new(Line::from(vec![
        Span::styled(" ● ", Style::default().fg(styles::GREEN)),
        Span::styled(message, Style::default().fg(styles::TEXT)),
        Span::raw(" "),
    ]))
    .style(Style::default().bg(styles::PANEL).fg(styles::TEXT));

    f.render_widget(notif, notif_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{idle_source, test_app};

    fn sample_app() -> App {
        test_app(2, idle_source())
    }

    fn hint_keys(app: &App) -> Vec<String> {
        build_hints(app).into_iter().map(|h| h.key).collect()
    }

    #[test]
    fn hints_follow_keymap() {
        let mut app = sample_app();
        let keys = hint_keys(&app);
        assert!(keys.contains(&"a".to_string()));
        assert!(!keys.contains(&"1-9".to_string()));

        app.reject_reason(0);
        let keys = hint_keys(&app);
        assert!(keys.contains(&"1-9".to_string()));
        assert!(keys.contains(&"Enter".to_string()));
    }

    #[test]
    fn text_focus_shows_editing_hints() {
        let mut app = sample_app();
        app.open_comment(0, crate::app::actions::CommentKind::Flag);
        let keys = hint_keys(&app);
        assert_eq!(keys, vec!["Enter", "Esc", "Tab"]);
    }

    #[test]
    fn hints_wrap_to_width() {
        let hints: Vec<Hint> = (0..10).map(|_| Hint::new("x", " action ")).collect();
        assert_eq!(pack_hint_lines(&hints, 200).len(), 1);
        assert!(pack_hint_lines(&hints, 20).len() > 1);
    }
}
