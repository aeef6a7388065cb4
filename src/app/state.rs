use crate::catalog::ReasonCatalog;
use crate::config::{self, RqConfig};
use crate::submission::{self, CommitTarget};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::Instant;

use super::actions::Dropdown;
use super::keymap::Keymap;
use super::layout::CardLayout;
use super::pagination::{Batch, Loader};
use super::queue::Queue;
use super::viewport::{MetricsKey, Viewport};

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    /// Keys are looked up in the keymap
    Shortcuts,
    /// Keys edit the open dropdown's text field
    TextField,
}

// ── Overlay types ──

/// Active overlay popup state
#[derive(Debug, Clone)]
pub enum OverlayData {
    Settings {
        selected: usize,
        /// Snapshot of config at overlay open time, for Cancel revert
        saved_config: RqConfig,
    },
}

/// Auto-advance scheduled by the last disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub target: usize,
    pub due: Instant,
}

/// Width used for layout before the first frame reports the real pane
const DEFAULT_PANE: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 24,
};

// ── Main App State ──

pub struct App {
    pub queue: Queue,

    /// Live key bindings; dropdowns add and remove entries
    pub keymap: Keymap,

    /// At most one dropdown open queue-wide
    pub dropdown: Option<Dropdown>,

    /// Set while the reject category list is in play; gates reason clicks
    pub is_rejecting: bool,

    pub focus: InputFocus,

    pub viewport: Viewport,

    pub loader: Loader,

    pub catalog: ReasonCatalog,

    /// Application configuration (loaded from .rq-config.toml)
    pub config: RqConfig,

    /// Local config override passed with --config, re-read on reload
    pub config_path: Option<PathBuf>,

    /// Global config file: read on reload, written by the options overlay
    pub global_config: Option<PathBuf>,

    /// A config change arrived while the overlay was open
    pub reload_pending: bool,

    /// Active overlay popup (None = no overlay)
    pub overlay: Option<OverlayData>,

    pub pending_advance: Option<PendingAdvance>,

    pub commit_target: CommitTarget,

    /// Screen area of the queue pane, recorded on every draw for hit-testing
    pub pane: Rect,

    /// Should the app quit?
    pub should_quit: bool,

    /// Whether the config watcher is running
    pub watching: bool,

    /// Last notification message
    pub notice: Option<String>,

    /// Ticks since last notification (for auto-clearing)
    pub notice_ticks: u8,
}

impl App {
    /// Build the controller around the first page of the queue
    pub fn new(
        config: RqConfig,
        loader: Loader,
        initial: Batch,
        commit_target: CommitTarget,
        config_path: Option<PathBuf>,
    ) -> Self {
        let catalog = ReasonCatalog::new(config.reasons.clone());
        let mut queue = Queue::new(config.queue.max_materialized);
        let message = initial.message.clone();
        queue.splice(initial.items, initial.count);

        let mut app = App {
            queue,
            keymap: Keymap::with_defaults(),
            dropdown: None,
            is_rejecting: false,
            focus: InputFocus::Shortcuts,
            viewport: Viewport::new(),
            loader,
            catalog,
            config,
            config_path,
            global_config: config::global_config_path(),
            reload_pending: false,
            overlay: None,
            pending_advance: None,
            commit_target,
            pane: DEFAULT_PANE,
            should_quit: false,
            watching: false,
            notice: None,
            notice_ticks: 0,
        };

        // focus follows wherever the pane is scrolled
        app.update_metrics();
        if let Some(i) = app.viewport.current_visible_index(0) {
            app.switch_item(i);
        }

        if app.queue.is_empty() {
            let message = message.unwrap_or_else(|| "Queue is empty".to_string());
            app.notify(&message);
        } else if let Some(message) = message {
            app.notify(&message);
        }
        app
    }

    /// Open scrolled to item `i` (clamped to the queue), focusing whatever
    /// the scroll position then indicates
    pub fn start_at(&mut self, i: usize) {
        if self.queue.is_empty() {
            return;
        }
        self.update_metrics();
        let i = i.min(self.queue.len() - 1);
        let top = self.viewport.top(i).unwrap_or(0);
        self.viewport
            .jump_to(top.saturating_sub(self.config.scroll.margin_top as usize));
        if let Some(focus) = self.viewport.current_visible_index(self.queue.current) {
            self.switch_item(focus);
        }
    }

    // ── Layout ──

    /// Record the pane the queue was drawn into
    pub fn set_pane(&mut self, area: Rect) {
        if area != self.pane {
            self.pane = area;
            self.update_metrics();
        }
    }

    /// Rows the open dropdown adds to card `index`
    pub fn dropdown_rows(&self, index: usize) -> u16 {
        match &self.dropdown {
            Some(d) if d.item() == index => d.rows(self.catalog.len()),
            _ => 0,
        }
    }

    fn metrics_key(&self) -> MetricsKey {
        MetricsKey {
            width: self.pane.width,
            item_count: self.queue.len(),
            expanded: self
                .dropdown
                .as_ref()
                .map(|d| (d.item(), d.rows(self.catalog.len()))),
        }
    }

    /// Recompute card anchors if anything that affects card heights changed
    pub fn update_metrics(&mut self) {
        let key = self.metrics_key();
        if !self.viewport.needs_metrics(&key) {
            return;
        }
        let heights = self
            .queue
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| CardLayout::measure(item, self.pane.width, self.dropdown_rows(i)).height as usize)
            .collect();
        self.viewport.set_metrics(key, heights);
    }

    /// Make `i` the single active item
    pub fn switch_item(&mut self, i: usize) {
        if i >= self.queue.len() {
            return;
        }
        self.queue.current = i;
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.update_metrics();
        self.viewport.scroll_by(delta);
    }

    /// Half the pane, for Ctrl+D / Ctrl+U
    pub fn half_page(&self) -> isize {
        (self.pane.height / 2).max(1) as isize
    }

    // ── Overlay: Settings ──

    /// Open the queue options overlay
    pub fn open_settings(&mut self) {
        let items = config::settings_items();
        // Find the first selectable (non-header) item
        let first_selectable = items
            .iter()
            .position(|item| !matches!(item, config::SettingsItem::SectionHeader(_)))
            .unwrap_or(0);

        self.overlay = Some(OverlayData::Settings {
            selected: first_selectable,
            saved_config: self.config.clone(),
        });
    }

    /// Toggle the currently selected boolean setting
    pub fn settings_toggle(&mut self) {
        let items = config::settings_items();
        if let Some(OverlayData::Settings { selected, .. }) = &self.overlay {
            if let Some(config::SettingsItem::BoolToggle { get, set, .. }) = items.get(*selected) {
                let current = get(&self.config);
                set(&mut self.config, !current);
            }
        }
    }

    /// Step the currently selected number setting up or down
    pub fn settings_adjust(&mut self, increase: bool) {
        let items = config::settings_items();
        if let Some(OverlayData::Settings { selected, .. }) = &self.overlay {
            if let Some(config::SettingsItem::NumberEdit { get, set, step, .. }) = items.get(*selected) {
                let current = get(&self.config);
                let next = if increase {
                    current.saturating_add(*step)
                } else {
                    current.saturating_sub(*step)
                };
                set(&mut self.config, next);
            }
        }
    }

    /// Save the overlay's sections to the global config and close the overlay
    pub fn settings_save(&mut self) {
        let saved = match &self.global_config {
            Some(path) => config::save_settings_to(&self.config, path),
            None => Err(anyhow::anyhow!("Could not determine config directory")),
        };
        match saved {
            Ok(()) => self.notify("Settings saved"),
            Err(e) => {
                tracing::warn!("failed to save settings: {e:#}");
                self.notify(&format!("Failed to save: {}", e));
            }
        }
        self.overlay = None;
        self.apply_pending_reload();
    }

    /// Revert settings to the saved snapshot and close the overlay
    pub fn settings_cancel(&mut self) {
        if let Some(OverlayData::Settings { saved_config, .. }) = self.overlay.take() {
            self.config = saved_config;
        }
        self.apply_pending_reload();
    }

    pub fn overlay_next(&mut self) {
        if let Some(OverlayData::Settings { selected, .. }) = &mut self.overlay {
            let items = config::settings_items();
            // Skip section headers when navigating down
            let mut next = *selected + 1;
            while next < items.len() {
                if !matches!(items[next], config::SettingsItem::SectionHeader(_)) {
                    break;
                }
                next += 1;
            }
            if next < items.len() {
                *selected = next;
            }
        }
    }

    pub fn overlay_prev(&mut self) {
        if let Some(OverlayData::Settings { selected, .. }) = &mut self.overlay {
            let items = config::settings_items();
            let mut prev = *selected;
            while prev > 0 {
                prev -= 1;
                if !matches!(items[prev], config::SettingsItem::SectionHeader(_)) {
                    *selected = prev;
                    break;
                }
            }
        }
    }

    /// Close the overlay (reverts settings changes)
    pub fn overlay_close(&mut self) {
        self.settings_cancel();
    }

    // ── Config ──

    /// Re-read mode flags and scroll settings after the config file changed on disk
    pub fn reload_config(&mut self) {
        if self.overlay.is_some() {
            // the overlay owns the config until it closes
            self.reload_pending = true;
            return;
        }
        let local = config::local_config_path(self.config_path.as_deref());
        let fresh = config::load_config_from(self.global_config.as_deref(), &local);
        let changed = fresh.modes != self.config.modes || fresh.scroll != self.config.scroll;
        self.config.modes = fresh.modes;
        self.config.scroll = fresh.scroll;
        if changed {
            tracing::info!(
                shortcuts = self.config.modes.shortcuts,
                auto_advance = self.config.modes.auto_advance,
                "config reloaded"
            );
            self.notify("Config reloaded");
        }
    }

    fn apply_pending_reload(&mut self) {
        if std::mem::take(&mut self.reload_pending) {
            self.reload_config();
        }
    }

    // ── Commit ──

    pub fn commit(&mut self) {
        match submission::commit(&self.queue, &self.commit_target) {
            Ok(report) => self.notify(&format!(
                "Committed {}/{} reviews to {}",
                report.reviewed, report.total, report.destination
            )),
            Err(e) => {
                tracing::warn!("commit failed: {e:#}");
                self.notify(&format!("Commit failed: {e}"));
            }
        }
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: &str) {
        self.notice = Some(msg.to_string());
        self.notice_ticks = 0;
    }

    /// Tick called on every event loop iteration: timers, scroll, pagination
    /// and notification auto-clear
    pub fn tick(&mut self, now: Instant) {
        self.update_metrics();

        if let Some(advance) = self.pending_advance {
            if advance.due <= now {
                self.pending_advance = None;
                self.goto(advance.target, now);
            }
        }

        if let Some(focus) = self.viewport.step(now) {
            self.switch_item(focus);
        }

        if self.viewport.take_due(now, self.config.scroll.throttle()) {
            if let Some(i) = self.viewport.current_visible_index(self.queue.current) {
                if i != self.queue.current {
                    self.switch_item(i);
                }
            }
        }

        if let Some(result) = self.loader.poll() {
            self.apply_fetch_result(result, now);
        }

        if self.notice.is_some() {
            self.notice_ticks += 1;
            if self.notice_ticks > 20 {
                self.notice = None;
                self.notice_ticks = 0;
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn idle_source() -> std::sync::Arc<super::pagination::mock::MockSource> {
    super::pagination::mock::MockSource::new(|count| {
        Ok(Batch {
            count,
            items: Vec::new(),
            message: None,
        })
    })
}

#[cfg(test)]
pub(crate) fn test_app(n: usize, source: std::sync::Arc<dyn super::pagination::PageSource>) -> App {
    let mut config = RqConfig::default();
    config.queue.max_materialized = 10;
    let items = (0..n).map(|i| super::queue::payload(100 + i as u64, i)).collect();
    let mut app = App::new(
        config,
        Loader::new(source),
        Batch {
            count: n,
            items,
            message: None,
        },
        CommitTarget::Disabled,
        None,
    );
    // never touch the real user config from tests
    app.global_config = None;
    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_queue_shows_notice() {
        let app = test_app(0, idle_source());
        assert_eq!(app.notice.as_deref(), Some("Queue is empty"));
        assert_eq!(app.viewport.current_visible_index(0), None);
    }

    #[test]
    fn metrics_follow_dropdown_height() {
        let mut app = test_app(3, idle_source());
        let before = app.viewport.recomputes();
        app.update_metrics();
        assert_eq!(app.viewport.recomputes(), before, "unchanged key skips recompute");

        app.reject_reason(0);
        app.update_metrics();
        assert_eq!(app.viewport.top(1), Some(5 + 1 + app.catalog.len()));
    }

    #[test]
    fn scrolling_moves_focus_after_throttle() {
        let mut app = test_app(4, idle_source());
        let t0 = Instant::now();
        // past item 0's anchor at row 2
        app.scroll_by(6);
        app.tick(t0);
        assert_eq!(app.queue.current, 1);

        app.scroll_by(5);
        app.tick(t0 + Duration::from_millis(10));
        assert_eq!(app.queue.current, 1, "throttled");
        app.tick(t0 + Duration::from_millis(150));
        assert_eq!(app.queue.current, 2);
    }

    #[test]
    fn settings_toggle_and_cancel() {
        let mut app = test_app(1, idle_source());
        app.open_settings();
        // first selectable row is the shortcuts toggle
        app.settings_toggle();
        assert!(!app.config.modes.shortcuts);
        app.overlay_close();
        assert!(app.config.modes.shortcuts);
        assert!(app.overlay.is_none());
    }

    #[test]
    fn settings_adjust_steps_numbers() {
        let mut app = test_app(1, idle_source());
        app.open_settings();
        // shortcuts, auto-advance, then the scroll duration
        app.overlay_next();
        app.overlay_next();
        app.settings_adjust(true);
        assert_eq!(app.config.scroll.duration_ms, 300);
        app.overlay_prev();
        app.settings_adjust(true);
        assert_eq!(app.config.scroll.duration_ms, 300, "toggles ignore adjust");
    }

    #[test]
    fn saving_settings_keeps_cli_overrides_out_of_global_file() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("rq").join("config.toml");
        let mut app = test_app(1, idle_source());
        // as if passed with --max 3 and a local endpoint
        app.config.queue.max_materialized = 3;
        app.config.endpoint.more_url = Some("http://local.test/more".into());
        app.global_config = Some(global.clone());

        app.open_settings();
        app.settings_toggle();
        app.settings_save();
        assert_eq!(app.notice.as_deref(), Some("Settings saved"));

        let written = std::fs::read_to_string(&global).unwrap();
        assert!(!written.contains("max_materialized"));
        assert!(!written.contains("local.test"));

        let reloaded = config::load_config_from(Some(&global), &dir.path().join("none.toml"));
        assert!(!reloaded.modes.shortcuts);
        assert_eq!(reloaded.queue.max_materialized, RqConfig::default().queue.max_materialized);
    }

    #[test]
    fn saving_without_config_dir_reports_failure() {
        let mut app = test_app(1, idle_source());
        app.open_settings();
        app.settings_save();
        assert!(app.notice.as_deref().is_some_and(|m| m.starts_with("Failed to save")));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn reload_during_overlay_applies_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let mut app = test_app(1, idle_source());
        app.global_config = Some(global.clone());
        app.config_path = Some(dir.path().join("local.toml"));

        app.open_settings();
        std::fs::write(&global, "[modes]\nshortcuts = false\n").unwrap();
        app.reload_config();
        assert!(app.config.modes.shortcuts, "overlay keeps its config");
        assert!(app.reload_pending);

        app.overlay_close();
        assert!(!app.config.modes.shortcuts);
        assert!(!app.reload_pending);
        assert_eq!(app.notice.as_deref(), Some("Config reloaded"));
    }

    #[test]
    fn reload_during_overlay_applies_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("config.toml");
        let local = dir.path().join("local.toml");
        let mut app = test_app(1, idle_source());
        app.global_config = Some(global);
        app.config_path = Some(local.clone());

        app.open_settings();
        std::fs::write(&local, "[scroll]\nduration_ms = 900\n").unwrap();
        app.reload_config();
        assert_eq!(app.config.scroll.duration_ms, 250);

        app.settings_save();
        assert_eq!(app.config.scroll.duration_ms, 900);
    }

    #[test]
    fn start_at_scrolls_and_focuses_item() {
        let mut app = test_app(5, idle_source());
        app.start_at(3);
        assert_eq!(app.queue.current, 3);
        // card 3 starts at row 15, less the top margin
        assert_eq!(app.viewport.page_top, 14);

        app.start_at(99);
        assert_eq!(app.queue.current, 4, "clamped to the last item");
    }

    #[test]
    fn start_at_on_empty_queue_is_noop() {
        let mut app = test_app(0, idle_source());
        app.start_at(2);
        assert_eq!(app.queue.current, 0);
        assert_eq!(app.viewport.page_top, 0);
    }

    #[test]
    fn notice_clears_after_ticks() {
        let mut app = test_app(1, idle_source());
        let t0 = Instant::now();
        app.notify("hello");
        for _ in 0..21 {
            app.tick(t0);
        }
        assert!(app.notice.is_none());
    }

    #[test]
    fn commit_without_target_reports_failure() {
        let mut app = test_app(1, idle_source());
        app.commit();
        assert!(app.notice.as_deref().is_some_and(|m| m.starts_with("Commit failed")));
    }

    #[test]
    fn commit_to_file_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(2, idle_source());
        app.commit_target = CommitTarget::File(dir.path().join("out.json"));
        app.approve(0, Instant::now());
        app.commit();
        assert!(app.notice.as_deref().is_some_and(|m| m.starts_with("Committed 1/2")));
    }
}
