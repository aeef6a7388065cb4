mod app;
mod catalog;
mod config;
mod logging;
mod submission;
mod ui;
mod watch;

use anyhow::{Context, Result};
use app::keymap::Key;
use app::{App, Dropdown, FileSource, HttpSource, InputFocus, Loader, PageSource};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use submission::CommitTarget;
use watch::{ConfigWatcher, WatchEvent};

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: isize = 3;

/// Terminal console for working through a moderation queue
#[derive(Parser)]
#[command(name = "rq", version, about)]
struct Cli {
    /// Endpoint serving queue batches (overrides `endpoint.more_url`)
    #[arg(long)]
    url: Option<String>,

    /// Review items from a local JSON pool instead of an endpoint
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Local config file (defaults to ./.rq-config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write commits to a JSON file instead of posting them
    #[arg(long)]
    commit_file: Option<PathBuf>,

    /// Cap on materialized items (overrides `queue.max_materialized`)
    #[arg(long)]
    max: Option<usize>,

    /// Open scrolled to this item (1-based, as numbered on the cards)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    start: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init()?;

    let mut config = config::load_config(cli.config.as_deref());
    if let Some(max) = cli.max {
        config.queue.max_materialized = max;
    }

    let source: Arc<dyn PageSource> = if let Some(path) = &cli.file {
        Arc::new(FileSource::new(path, config.queue.batch_size))
    } else if let Some(url) = cli.url.clone().or_else(|| config.endpoint.more_url.clone()) {
        Arc::new(HttpSource::new(url, config.endpoint.timeout())?)
    } else {
        anyhow::bail!("No queue source: pass --url or --file, or set endpoint.more_url in the config");
    };

    let commit_target = if let Some(path) = cli.commit_file.clone() {
        CommitTarget::File(path)
    } else if let Some(url) = config.endpoint.commit_url.clone() {
        CommitTarget::Http {
            url,
            timeout: config.endpoint.timeout(),
        }
    } else {
        CommitTarget::Disabled
    };

    let mut loader = Loader::new(source);
    let initial = loader
        .load_initial()
        .with_context(|| format!("Failed to load the queue from {}", loader.describe()))?;
    tracing::info!(
        source = %loader.describe(),
        items = initial.items.len(),
        commit = %commit_target.describe(),
        log = %log_path.display(),
        "starting"
    );

    let mut app = App::new(config, loader, initial, commit_target, cli.config.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if let Some(start) = cli.start {
        let size = terminal.size()?;
        app.set_pane(ui::queue_pane(Rect::new(0, 0, size.width, size.height), &app));
        app.start_at(start.saturating_sub(1) as usize);
    }

    // Run event loop
    let result = run_app(&mut terminal, &mut app, cli.config);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("{err:#}");
        eprintln!("Error: {:?}", err);
    }

    let reviewed = app.queue.reviewed_count();
    if reviewed > 0 {
        eprintln!("\x1b[2mrq: {}/{} reviewed this session\x1b[0m", reviewed, app.queue.len());
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    local_config: Option<PathBuf>,
) -> Result<()> {
    // Channel for config watch events
    let (watch_tx, watch_rx) = mpsc::channel::<WatchEvent>();

    let mut files = vec![local_config.unwrap_or_else(|| PathBuf::from(config::LOCAL_CONFIG))];
    files.extend(app.global_config.clone());
    let _watcher = match ConfigWatcher::new(&files, 300, watch_tx) {
        Ok(w) => {
            app.watching = true;
            Some(w)
        }
        Err(e) => {
            tracing::warn!("config watch unavailable: {e:#}");
            None
        }
    };

    loop {
        // Keep the hit-test pane in step with what is about to be drawn
        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        app.set_pane(ui::queue_pane(area, app));

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with a timeout so timers keep running
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key, Instant::now()),
                Event::Mouse(mouse) => handle_mouse(app, mouse, Instant::now()),
                _ => {}
            }
        }

        // Collapse a burst of watch events into one reload
        let mut reload = false;
        while let Ok(WatchEvent::ConfigChanged(path)) = watch_rx.try_recv() {
            tracing::debug!(path = %path.display(), "config changed on disk");
            reload = true;
        }
        if reload {
            app.reload_config();
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route one key press. The options overlay is modal; after it, Enter always
/// goes to whatever the keymap holds, then the focused text field, the fixed
/// chrome keys and finally the shortcut keymap.
fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if app.overlay.is_some() {
        handle_overlay_input(app, key);
        return;
    }

    if key.code == KeyCode::Enter {
        app.press(Key::Enter, now);
        return;
    }

    if app.focus == InputFocus::TextField && handle_text_input(app, key) {
        return;
    }

    if handle_chrome_input(app, key) {
        return;
    }

    let modified = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    if app.config.modes.shortcuts && !modified {
        if let Some(k) = Key::from_event(&key) {
            app.press(k, now);
        }
    }
}

fn handle_overlay_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.overlay_next(),
        KeyCode::Char('k') | KeyCode::Up => app.overlay_prev(),
        KeyCode::Char(' ') | KeyCode::Enter => app.settings_toggle(),
        KeyCode::Char('l') | KeyCode::Right => app.settings_adjust(true),
        KeyCode::Char('h') | KeyCode::Left => app.settings_adjust(false),
        KeyCode::Char('s') => app.settings_save(),
        KeyCode::Esc | KeyCode::Char('q') => app.overlay_close(),
        _ => {}
    }
}

/// Keys consumed while the dropdown's text field has focus
fn handle_text_input(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.cancel_dropdown(),
        KeyCode::Tab => app.toggle_input_focus(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) if !ctrl => app.type_char(c),
        _ => return false,
    }
    true
}

/// Keys that are never rebound
fn handle_chrome_input(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') if ctrl => app.should_quit = true,
        KeyCode::Char('s') if ctrl => app.commit(),
        KeyCode::Char('o') if ctrl => app.open_settings(),
        KeyCode::Char('d') if ctrl => app.scroll_by(app.half_page()),
        KeyCode::Char('u') if ctrl => app.scroll_by(-app.half_page()),
        KeyCode::Esc => app.cancel_dropdown(),
        KeyCode::Tab => app.toggle_input_focus(),
        KeyCode::Up | KeyCode::Down => {
            let delta = if key.code == KeyCode::Up { -1 } else { 1 };
            if matches!(app.dropdown, Some(Dropdown::RejectReasons { .. })) {
                app.move_highlight(delta);
            } else {
                app.scroll_by(delta);
            }
        }
        KeyCode::PageUp => app.scroll_by(-2 * app.half_page()),
        KeyCode::PageDown => app.scroll_by(2 * app.half_page()),
        _ => return false,
    }
    true
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    if app.overlay.is_some() {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row, now),
        MouseEventKind::ScrollUp => app.scroll_by(-WHEEL_ROWS),
        MouseEventKind::ScrollDown => app.scroll_by(WHEEL_ROWS),
        _ => {}
    }
}
