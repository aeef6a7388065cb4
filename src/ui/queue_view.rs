use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use super::utils::truncate;
use crate::app::layout::{CardLayout, Choice, CHOICES, CHOICE_GAP};
use crate::app::queue::Item;
use crate::app::{App, Dropdown, InputFocus};

/// Render every materialized card as one tall scrolled paragraph
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.queue.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  Nothing to review",
            Style::default().fg(styles::DIM),
        )))
        .style(styles::default_style());
        f.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in app.queue.items.iter().enumerate() {
        let layout = CardLayout::measure(item, area.width, app.dropdown_rows(i));
        card_lines(&mut lines, app, i, item, &layout, area.width);
    }

    let para = Paragraph::new(lines)
        .style(styles::default_style())
        .scroll((app.viewport.scroll_offset(), 0));
    f.render_widget(para, area);
}

fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

/// Wrap content spans in the card's side borders, padded to `width`
fn boxed<'a>(mut spans: Vec<Span<'a>>, width: u16, border: Style) -> Line<'a> {
    let inner = (width as usize).saturating_sub(4);
    let used = spans_width(&spans);
    let mut out = vec![Span::styled("│ ", border)];
    out.append(&mut spans);
    out.push(Span::raw(" ".repeat(inner.saturating_sub(used))));
    out.push(Span::styled(" │", border));
    Line::from(out)
}

fn edge(width: u16, left: &str, right: &str, border: Style) -> Line<'static> {
    let fill = "─".repeat((width as usize).saturating_sub(2));
    Line::from(Span::styled(format!("{left}{fill}{right}"), border))
}

fn card_lines<'a>(
    lines: &mut Vec<Line<'a>>,
    app: &'a App,
    index: usize,
    item: &'a Item,
    layout: &CardLayout,
    width: u16,
) {
    let active = index == app.queue.current;
    let border = styles::card_border(active);
    let inner = (width as usize).saturating_sub(4);

    lines.push(edge(width, "┌", "┐", border));

    // Header: "#n name by author" with the status label on the right
    let status = item.disposition.label();
    let title = format!("#{} {}", item.form_index + 1, item.name);
    let byline = if item.author.is_empty() {
        String::new()
    } else {
        format!(" by {}", item.author)
    };
    let room = inner.saturating_sub(status.chars().count() + 1);
    let title = truncate(&title, room);
    let byline = truncate(&byline, room.saturating_sub(title.chars().count()));
    let pad = inner.saturating_sub(title.chars().count() + byline.chars().count() + status.chars().count());
    let title_style = if active {
        Style::default().fg(styles::BRIGHT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(styles::TEXT)
    };
    lines.push(boxed(
        vec![
            Span::styled(title, title_style),
            Span::styled(byline, Style::default().fg(styles::DIM)),
            Span::raw(" ".repeat(pad)),
            Span::styled(status, styles::disposition_style(&item.disposition)),
        ],
        width,
        border,
    ));

    for text in &layout.description {
        lines.push(boxed(
            vec![Span::styled(text.clone(), Style::default().fg(styles::MUTED))],
            width,
            border,
        ));
    }

    lines.push(boxed(choice_spans(item), width, border));

    if layout.dropdown_rows > 0 {
        if let Some(dropdown) = &app.dropdown {
            for spans in dropdown_spans(app, dropdown) {
                lines.push(boxed(spans, width, border));
            }
        }
    }

    lines.push(edge(width, "└", "┘", border));
}

fn choice_spans(item: &Item) -> Vec<Span<'static>> {
    let chosen = match item.disposition.action_code() {
        Some(4) => Some(Choice::Approve),
        Some(3) => Some(Choice::Reject),
        Some(2) => Some(Choice::Duplicate),
        Some(1) => Some(Choice::Flag),
        Some(0) => Some(Choice::MoreInfo),
        _ => None,
    };
    let mut spans = Vec::new();
    for (n, (choice, label)) in CHOICES.iter().enumerate() {
        if n > 0 {
            spans.push(Span::raw(" ".repeat(CHOICE_GAP)));
        }
        let style = if chosen == Some(*choice) {
            styles::selected_style().add_modifier(Modifier::BOLD)
        } else {
            styles::key_hint_style()
        };
        spans.push(Span::styled(*label, style));
    }
    spans
}

/// One span row per dropdown row; the count matches `Dropdown::rows`
fn dropdown_spans<'a>(app: &'a App, dropdown: &'a Dropdown) -> Vec<Vec<Span<'a>>> {
    let title_style = Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD);
    match dropdown {
        Dropdown::RejectReasons { highlighted, .. } => {
            let mut rows = vec![vec![Span::styled("Reject because (1-9, ↑/↓ + Enter)", title_style)]];
            for (pos, reason) in app.catalog.iter().enumerate() {
                let key = if (1..=9).contains(&reason.id) {
                    format!("[{}] ", reason.id)
                } else {
                    "    ".to_string()
                };
                let style = if pos == *highlighted {
                    styles::selected_style()
                } else {
                    Style::default().fg(styles::TEXT)
                };
                rows.push(vec![
                    Span::raw("  "),
                    Span::styled(key, styles::key_hint_style()),
                    Span::styled(reason.label.as_str(), style),
                ]);
            }
            rows
        }
        Dropdown::RejectDetail { reason, input, required, .. } => {
            let label = app.catalog.get(*reason).map(|r| r.label.as_str()).unwrap_or("?");
            let title = format!("{label}: explain (required)");
            text_rows(app, title, input, *required, title_style)
        }
        Dropdown::Comment { kind, input, required, .. } => {
            text_rows(app, kind.title().to_string(), input, *required, title_style)
        }
    }
}

fn text_rows<'a>(
    app: &App,
    title: String,
    input: &'a str,
    required: bool,
    title_style: Style,
) -> Vec<Vec<Span<'a>>> {
    let typing = app.focus == InputFocus::TextField;
    let mut input_row = vec![
        Span::styled("> ", Style::default().fg(styles::CYAN)),
        Span::styled(input, Style::default().fg(styles::BRIGHT)),
    ];
    if typing {
        input_row.push(Span::styled("█", Style::default().fg(styles::CYAN)));
    }
    let mut rows = vec![vec![Span::styled(title, title_style)], input_row];
    if required {
        rows.push(vec![Span::styled("This field is required.", styles::required_style())]);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::queue::payload;
    use crate::app::{idle_source, test_app};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    /// Rows whose top-left corner is drawn in the active border color
    fn active_cards(app: &App) -> Vec<usize> {
        let mut terminal = Terminal::new(TestBackend::new(80, 32)).unwrap();
        terminal.draw(|f| render(f, f.area(), app)).unwrap();
        let buffer = terminal.backend().buffer();

        (0..app.queue.len())
            .filter(|&i| {
                let y = app.viewport.top(i).unwrap() as u16;
                let cell = &buffer[(0, y)];
                assert_eq!(cell.symbol(), "┌", "card {i} starts at row {y}");
                if cell.fg == styles::BLUE {
                    true
                } else {
                    assert_eq!(cell.fg, styles::BORDER);
                    false
                }
            })
            .collect()
    }

    #[test]
    fn only_current_card_is_highlighted() {
        let mut app = test_app(5, idle_source());
        assert_eq!(active_cards(&app), vec![0]);

        app.switch_item(2);
        assert_eq!(active_cards(&app), vec![2]);
    }

    #[test]
    fn highlight_survives_splice() {
        let mut app = test_app(5, idle_source());
        app.switch_item(4);
        app.queue.splice(vec![payload(200, 0)], 6);
        app.update_metrics();
        assert_eq!(app.queue.len(), 6);
        assert_eq!(active_cards(&app), vec![4]);

        app.switch_item(5);
        assert_eq!(active_cards(&app), vec![5]);
    }

    #[test]
    fn empty_queue_renders_placeholder() {
        let app = test_app(0, idle_source());
        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal.draw(|f| render(f, f.area(), &app)).unwrap();
        let row: String = (0..40)
            .map(|x| terminal.backend().buffer()[(x, 0)].symbol().to_string())
            .collect();
        assert!(row.contains("Nothing to review"));
    }
}
