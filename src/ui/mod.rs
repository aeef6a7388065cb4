mod queue_view;
mod settings;
mod status_bar;
mod styles;
pub(crate) mod utils;

use crate::app::{App, OverlayData};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Block;
use ratatui::Frame;

/// Split the screen into top bar, queue pane and hint bar
fn split(area: Rect, app: &App) -> [Rect; 3] {
    let bottom_height = status_bar::bottom_bar_height(app, area.width);
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // top bar
            Constraint::Min(1),                // queue
            Constraint::Length(bottom_height), // bottom bar (dynamic rows)
        ])
        .split(area);
    [outer[0], outer[1], outer[2]]
}

/// Where the queue will be drawn for a screen of size `area`
pub fn queue_pane(area: Rect, app: &App) -> Rect {
    split(area, app)[1]
}

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App) {
    let [top, main, bottom] = split(f.area(), app);

    f.render_widget(Block::default().style(styles::surface_style()), f.area());

    status_bar::render_top_bar(f, top, app);
    queue_view::render(f, main, app);
    status_bar::render_bottom_bar(f, bottom, app);

    if let Some(ref msg) = app.notice {
        status_bar::render_notification(f, f.area(), msg);
    }

    if let Some(OverlayData::Settings { selected, .. }) = &app.overlay {
        settings::render_settings(f, f.area(), app, *selected);
    }
}
