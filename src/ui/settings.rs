use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use super::styles;
use super::utils::centered_rect;
use crate::app::App;
use crate::config::{self, SettingsItem};

fn row_style(is_sel: bool) -> Style {
    if is_sel {
        styles::selected_style()
    } else {
        Style::default().bg(styles::PANEL)
    }
}

fn label_style(is_sel: bool) -> Style {
    if is_sel {
        Style::default().fg(styles::BRIGHT)
    } else {
        Style::default().fg(styles::TEXT)
    }
}

/// Render the queue options overlay
pub fn render_settings(f: &mut Frame, area: Rect, app: &App, selected: usize) {
    let items = config::settings_items();

    let content_height = u16::try_from(items.len()).unwrap_or(u16::MAX).saturating_add(4);
    let popup_height = content_height.min(area.height.saturating_sub(6)).max(10);
    let popup_width = 56u16.min(area.width.saturating_sub(6));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let mut list_items: Vec<ListItem> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let is_sel = idx == selected;
        let marker = if is_sel { "▸ " } else { "  " };

        let line = match item {
            SettingsItem::SectionHeader(title) => Line::from(vec![Span::styled(
                format!("  {}", title),
                Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD),
            )]),
            SettingsItem::BoolToggle { label, get, .. } => {
                let value = get(&app.config);
                let checkbox = if value { "[x]" } else { "[ ]" };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(styles::CYAN)),
                    Span::styled(
                        format!("{} ", checkbox),
                        Style::default().fg(if value { styles::GREEN } else { styles::DIM }),
                    ),
                    Span::styled(label.as_str(), label_style(is_sel)),
                ])
            }
            SettingsItem::NumberEdit { label, get, .. } => Line::from(vec![
                Span::styled(marker, Style::default().fg(styles::CYAN)),
                Span::styled(label.as_str(), label_style(is_sel)),
                Span::styled(format!(": {}", get(&app.config)), Style::default().fg(styles::YELLOW)),
            ]),
            SettingsItem::StringDisplay { label, get } => Line::from(vec![
                Span::styled(marker, Style::default().fg(styles::CYAN)),
                Span::styled(label.as_str(), Style::default().fg(styles::DIM)),
                Span::styled(format!(": {}", get(&app.config)), Style::default().fg(styles::TEXT)),
            ]),
        };

        let style = match item {
            SettingsItem::SectionHeader(_) => Style::default().bg(styles::PANEL),
            _ => row_style(is_sel),
        };
        list_items.push(ListItem::new(line).style(style));
    }

    // Help line at the bottom
    let key = Style::default().fg(styles::TEXT).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(styles::DIM);
    let help_line = Line::from(vec![
        Span::styled(" j/k", key),
        Span::styled(" nav  ", dim),
        Span::styled("Space", key),
        Span::styled(" toggle  ", dim),
        Span::styled("h/l", key),
        Span::styled(" adjust  ", dim),
        Span::styled("s", key),
        Span::styled(" save  ", dim),
        Span::styled("Esc", key),
        Span::styled(" cancel", dim),
    ]);
    list_items.push(ListItem::new(Line::from("")).style(Style::default().bg(styles::PANEL)));
    list_items.push(ListItem::new(help_line).style(Style::default().bg(styles::PANEL)));

    let block = Block::default()
        .title(Span::styled(
            " Queue options ",
            Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::CYAN))
        .style(Style::default().bg(styles::PANEL));

    let list = List::new(list_items).block(block);
    f.render_widget(list, popup);
}
