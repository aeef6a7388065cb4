use std::time::Instant;

use super::keymap::{Action, Key};
use super::layout::{choice_at, CardLayout, Choice, CARD_INSET};
use super::pagination::{Batch, FetchError};
use super::queue::Disposition;
use super::state::{App, InputFocus, PendingAdvance};

/// The three single-field comment dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Duplicate,
    Flag,
    MoreInfo,
}

impl CommentKind {
    pub fn title(&self) -> &'static str {
        match self {
            CommentKind::Duplicate => "Duplicate of (link or id)",
            CommentKind::Flag => "Why flag this for senior review?",
            CommentKind::MoreInfo => "What information is missing?",
        }
    }

    fn disposition(self, comment: String) -> Disposition {
        match self {
            CommentKind::Duplicate => Disposition::Duplicate { comment },
            CommentKind::Flag => Disposition::Flagged { comment },
            CommentKind::MoreInfo => Disposition::MoreInfoRequested { comment },
        }
    }
}

/// The one open dropdown, queue-wide. Holding it in a single `Option` means
/// opening any dropdown replaces whatever was open before.
#[derive(Debug, Clone, PartialEq)]
pub enum Dropdown {
    /// Choosing a reject category
    RejectReasons { item: usize, highlighted: usize },
    /// Justifying the chosen category
    RejectDetail {
        item: usize,
        reason: u8,
        input: String,
        required: bool,
    },
    Comment {
        item: usize,
        kind: CommentKind,
        input: String,
        required: bool,
    },
}

impl Dropdown {
    pub fn item(&self) -> usize {
        match self {
            Dropdown::RejectReasons { item, .. }
            | Dropdown::RejectDetail { item, .. }
            | Dropdown::Comment { item, .. } => *item,
        }
    }

    /// Reason list or reason detail: the states that own digit shortcuts
    pub fn is_reject(&self) -> bool {
        matches!(self, Dropdown::RejectReasons { .. } | Dropdown::RejectDetail { .. })
    }

    pub fn input(&self) -> Option<&str> {
        match self {
            Dropdown::RejectDetail { input, .. } | Dropdown::Comment { input, .. } => Some(input),
            Dropdown::RejectReasons { .. } => None,
        }
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Dropdown::RejectDetail { input, .. } | Dropdown::Comment { input, .. } => Some(input),
            Dropdown::RejectReasons { .. } => None,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Dropdown::RejectDetail { required, .. } | Dropdown::Comment { required, .. } => *required,
            Dropdown::RejectReasons { .. } => false,
        }
    }

    fn mark_required(&mut self) {
        if let Dropdown::RejectDetail { required, .. } | Dropdown::Comment { required, .. } = self {
            *required = true;
        }
    }

    /// Rows the dropdown adds to its card
    pub fn rows(&self, reasons: usize) -> u16 {
        match self {
            Dropdown::RejectReasons { .. } => 1 + reasons as u16,
            _ => 2 + u16::from(self.required()),
        }
    }
}

impl App {
    // ── Dispatch ──

    /// Look a key up in the live keymap and run whatever it is bound to
    pub fn press(&mut self, key: Key, now: Instant) -> bool {
        match self.keymap.lookup(key) {
            Some(action) => {
                self.dispatch(action, now);
                true
            }
            None => false,
        }
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        tracing::debug!(action = action.label(), current = self.queue.current, "dispatch");
        let current = self.queue.current;
        match action {
            Action::Next => self.next(now),
            Action::Prev => self.prev(now),
            Action::Approve => self.approve(current, now),
            Action::RejectReason => self.reject_reason(current),
            Action::Duplicate => self.open_comment(current, CommentKind::Duplicate),
            Action::Flag => self.open_comment(current, CommentKind::Flag),
            Action::MoreInfo => self.open_comment(current, CommentKind::MoreInfo),
            Action::RejectReasonDetail { item, reason } => self.reject_reason_detail(item, reason),
            Action::ChooseHighlightedReason { item } => self.choose_highlighted_reason(item),
            Action::Submit { item } => self.submit_dropdown(item, now),
        }
    }

    fn in_bounds(&self, i: usize) -> bool {
        if i < self.queue.len() {
            return true;
        }
        tracing::debug!(index = i, len = self.queue.len(), "action target out of range");
        false
    }

    // ── Dispositions ──

    pub fn approve(&mut self, i: usize, now: Instant) {
        if !self.in_bounds(i) {
            return;
        }
        self.close_dropdown();
        self.set_reviewed(i, Disposition::Approved, now);
    }

    /// Open the reject category list for `i` and bind digit shortcuts to it
    pub fn reject_reason(&mut self, i: usize) {
        if !self.in_bounds(i) {
            return;
        }
        self.close_dropdown();
        self.dropdown = Some(Dropdown::RejectReasons {
            item: i,
            highlighted: 0,
        });
        self.keymap.bind_digits(i, &self.catalog);
        self.keymap.bind(Key::Enter, Action::ChooseHighlightedReason { item: i });
        self.is_rejecting = true;
        self.focus = InputFocus::Shortcuts;
    }

    /// Move from the category list to the justification field for `reason`.
    /// Ignored unless a reject dropdown is open on `i` and the catalog offers `reason`.
    pub fn reject_reason_detail(&mut self, i: usize, reason: u8) {
        let open_on_item = matches!(&self.dropdown, Some(d) if d.is_reject() && d.item() == i);
        if !open_on_item || !self.is_rejecting {
            tracing::debug!(item = i, reason, "reason chosen without an open reject dropdown");
            return;
        }
        if !self.catalog.contains(reason) {
            tracing::debug!(reason, "reason not offered");
            return;
        }
        self.dropdown = Some(Dropdown::RejectDetail {
            item: i,
            reason,
            input: String::new(),
            required: false,
        });
        self.keymap.bind(Key::Enter, Action::Submit { item: i });
        self.focus = InputFocus::TextField;
    }

    /// Mouse pick in the reason list. Only honored while rejecting.
    pub fn click_reason(&mut self, i: usize, reason: u8) {
        if !self.is_rejecting {
            return;
        }
        self.reject_reason_detail(i, reason);
    }

    pub fn choose_highlighted_reason(&mut self, i: usize) {
        let highlighted = match &self.dropdown {
            Some(Dropdown::RejectReasons { item, highlighted }) if *item == i => *highlighted,
            _ => return,
        };
        if let Some(reason) = self.catalog.at(highlighted).map(|r| r.id) {
            self.reject_reason_detail(i, reason);
        }
    }

    /// Move the reason list highlight, clamped to the list
    pub fn move_highlight(&mut self, delta: isize) {
        let last = self.catalog.len().saturating_sub(1);
        if let Some(Dropdown::RejectReasons { highlighted, .. }) = &mut self.dropdown {
            *highlighted = highlighted.saturating_add_signed(delta).min(last);
        }
    }

    /// Open the duplicate / flag / more-info comment field for `i`
    pub fn open_comment(&mut self, i: usize, kind: CommentKind) {
        if !self.in_bounds(i) {
            return;
        }
        self.close_dropdown();
        self.dropdown = Some(Dropdown::Comment {
            item: i,
            kind,
            input: String::new(),
            required: false,
        });
        self.keymap.bind(Key::Enter, Action::Submit { item: i });
        self.focus = InputFocus::TextField;
    }

    /// Enter on an open text dropdown. Empty text marks the field required
    /// and leaves the item untouched.
    pub fn submit_dropdown(&mut self, i: usize, now: Instant) {
        let Some(dropdown) = self.dropdown.clone() else {
            return;
        };
        if dropdown.item() != i {
            tracing::debug!(item = i, open = dropdown.item(), "stale submit ignored");
            return;
        }
        let text = dropdown.input().map(|s| s.trim().to_string()).unwrap_or_default();

        match dropdown {
            Dropdown::RejectReasons { .. } => self.choose_highlighted_reason(i),
            _ if text.is_empty() => {
                if let Some(open) = self.dropdown.as_mut() {
                    open.mark_required();
                }
            }
            Dropdown::RejectDetail { reason, .. } => self.reject(i, reason, text, now),
            Dropdown::Comment { kind, .. } => {
                self.close_dropdown();
                self.set_reviewed(i, kind.disposition(text), now);
            }
        }
    }

    /// Only reachable through a submitted reject detail, so `reason` was offered
    fn reject(&mut self, i: usize, reason: u8, comment: String, now: Instant) {
        self.close_dropdown();
        self.set_reviewed(i, Disposition::Rejected { reason, comment }, now);
    }

    /// Shared terminal step for every disposition
    fn set_reviewed(&mut self, i: usize, disposition: Disposition, now: Instant) {
        let label = disposition.label();
        if !self.queue.record(i, disposition) {
            tracing::debug!(item = i, "item re-disposed");
        }
        if let Some(item) = self.queue.get(i) {
            tracing::info!(id = item.id, label, "item reviewed");
        }

        if self.config.modes.auto_advance {
            self.pending_advance = Some(PendingAdvance {
                target: i + 1,
                due: now + self.config.scroll.advance_delay(),
            });
        }

        if self.queue.all_reviewed() {
            self.request_more();
        }
    }

    /// Close the open dropdown along with everything bound to it
    pub fn close_dropdown(&mut self) {
        self.dropdown = None;
        self.keymap.unbind_digits();
        self.keymap.unbind(Key::Enter);
        self.is_rejecting = false;
        self.focus = InputFocus::Shortcuts;
    }

    pub fn cancel_dropdown(&mut self) {
        if let Some(dropdown) = &self.dropdown {
            tracing::debug!(item = dropdown.item(), "dropdown cancelled");
        }
        self.close_dropdown();
    }

    // ── Text field ──

    pub fn type_char(&mut self, c: char) {
        if let Some(input) = self.dropdown.as_mut().and_then(Dropdown::input_mut) {
            input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.dropdown.as_mut().and_then(Dropdown::input_mut) {
            input.pop();
        }
    }

    /// Tab between the text field and shortcut keys while a text dropdown is open
    pub fn toggle_input_focus(&mut self) {
        let has_text = self.dropdown.as_ref().is_some_and(|d| d.input().is_some());
        self.focus = match self.focus {
            InputFocus::Shortcuts if has_text => InputFocus::TextField,
            _ => InputFocus::Shortcuts,
        };
    }

    // ── Navigation ──

    /// Smooth-scroll to `target` and focus it when the scroll lands
    pub fn goto(&mut self, target: usize, now: Instant) {
        if target >= self.queue.len() {
            if !self.loader.is_loading() {
                self.notify("End of queue");
            }
            return;
        }
        self.update_metrics();
        let top = self.viewport.top(target).unwrap_or(0);
        let row = top.saturating_sub(self.config.scroll.margin_top as usize);
        self.viewport
            .scroll_to(row, self.config.scroll.duration(), Some(target), now);
    }

    pub fn next(&mut self, now: Instant) {
        if self.queue.is_empty() {
            return;
        }
        self.goto(self.queue.current + 1, now);
    }

    pub fn prev(&mut self, now: Instant) {
        if self.queue.current == 0 {
            self.notify("Start of queue");
            return;
        }
        self.goto(self.queue.current - 1, now);
    }

    // ── Pagination ──

    /// Ask the loader for the next page; it decides whether one may be fetched
    pub fn request_more(&mut self) {
        if self.loader.request_more(&self.queue) {
            self.notify("Loading more items…");
        }
    }

    pub fn apply_fetch_result(&mut self, result: Result<Batch, FetchError>, now: Instant) {
        match result {
            Ok(batch) => {
                let message = batch.message.clone();
                let range = self.queue.splice(batch.items, batch.count);
                self.viewport.invalidate();
                self.update_metrics();
                tracing::info!(added = range.len(), total = self.queue.total_count, "batch applied");

                if let Some(message) = message {
                    self.notify(&message);
                } else if range.is_empty() {
                    self.notify("No more items to review");
                } else {
                    self.notify(&format!("Loaded {} more", range.len()));
                }
                if !range.is_empty() {
                    self.goto(range.start, now);
                }
            }
            Err(e) => {
                tracing::warn!("fetch failed: {e}");
                self.notify(&format!("Could not load more: {e}"));
            }
        }
    }

    // ── Mouse ──

    /// Route a left click at terminal cell (`col`, `row`)
    pub fn click(&mut self, col: u16, row: u16, now: Instant) {
        let pane = self.pane;
        if col < pane.x || row < pane.y || col >= pane.right() || row >= pane.bottom() {
            return;
        }
        self.update_metrics();
        let Some((i, offset)) = self.viewport.item_at_row((row - pane.y) as usize) else {
            return;
        };
        let Some(item) = self.queue.get(i) else {
            return;
        };
        let layout = CardLayout::measure(item, pane.width, self.dropdown_rows(i));
        let offset = offset as u16;
        let x = (col - pane.x).saturating_sub(CARD_INSET);

        if offset == layout.choices_row {
            match choice_at(x) {
                Some(Choice::Approve) => self.approve(i, now),
                Some(Choice::Reject) => self.reject_reason(i),
                Some(Choice::Duplicate) => self.open_comment(i, CommentKind::Duplicate),
                Some(Choice::Flag) => self.open_comment(i, CommentKind::Flag),
                Some(Choice::MoreInfo) => self.open_comment(i, CommentKind::MoreInfo),
                None => {}
            }
            return;
        }

        let dropdown_rows = layout.dropdown_row..layout.dropdown_row + layout.dropdown_rows;
        if dropdown_rows.contains(&offset) {
            // first dropdown row is its title
            let line = (offset - layout.dropdown_row) as usize;
            match &self.dropdown {
                Some(Dropdown::RejectReasons { .. }) if line > 0 => {
                    if let Some(reason) = self.catalog.at(line - 1).map(|r| r.id) {
                        self.click_reason(i, reason);
                    }
                }
                Some(Dropdown::RejectDetail { .. }) | Some(Dropdown::Comment { .. }) if line == 1 => {
                    self.focus = InputFocus::TextField;
                }
                _ => {}
            }
            return;
        }

        self.switch_item(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pagination::mock::MockSource;
    use crate::app::queue::payload;
    use crate::app::state::{idle_source, test_app};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    #[test]
    fn approve_with_auto_advance_moves_focus_after_delay() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();

        assert!(app.press(Key::Char('a'), t0));
        assert_eq!(app.queue.items[0].disposition, Disposition::Approved);
        assert_eq!(app.queue.reviewed_count(), 1);

        app.tick(t0 + ms(400));
        assert_eq!(app.queue.current, 0, "label stays visible until the delay passes");

        app.tick(t0 + ms(500));
        app.tick(t0 + ms(800));
        assert_eq!(app.queue.current, 1);
    }

    #[test]
    fn approve_without_auto_advance_stays_put() {
        let mut app = test_app(3, idle_source());
        app.config.modes.auto_advance = false;
        let t0 = Instant::now();

        app.press(Key::Char('a'), t0);
        app.tick(t0 + ms(2000));
        assert_eq!(app.queue.current, 0);
        assert!(app.pending_advance.is_none());
    }

    #[test]
    fn reject_by_clicking_reason_then_entering_detail() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        app.switch_item(1);

        app.press(Key::Char('r'), t0);
        assert!(app.is_rejecting);
        assert!(app.keymap.has_digit_bindings());

        // item 0 is 5 rows tall; on item 1 the choices sit on row 3, the
        // dropdown title on row 4, and reason id 3 is the third entry
        app.click(10, 5 + 4 + 3, t0);
        assert!(matches!(
            app.dropdown,
            Some(Dropdown::RejectDetail { item: 1, reason: 3, .. })
        ));
        assert!(app.keymap.has_digit_bindings());
        assert_eq!(app.focus, InputFocus::TextField);

        type_text(&mut app, "spam link");
        assert!(app.press(Key::Enter, t0));

        assert_eq!(
            app.queue.items[1].disposition,
            Disposition::Rejected {
                reason: 3,
                comment: "spam link".into()
            }
        );
        assert!(!app.keymap.has_digit_bindings());
        assert_eq!(app.keymap.lookup(Key::Enter), None);
        assert!(!app.is_rejecting);
        assert!(app.dropdown.is_none());
    }

    #[test]
    fn digit_shortcut_picks_reason() {
        let mut app = test_app(2, idle_source());
        let t0 = Instant::now();
        app.press(Key::Char('r'), t0);
        app.press(Key::Char('7'), t0);
        assert!(matches!(
            app.dropdown,
            Some(Dropdown::RejectDetail { item: 0, reason: 7, .. })
        ));
    }

    #[test]
    fn enter_on_reason_list_picks_highlighted() {
        let mut app = test_app(2, idle_source());
        let t0 = Instant::now();
        app.press(Key::Char('r'), t0);
        app.move_highlight(1);
        app.move_highlight(1);
        app.press(Key::Enter, t0);
        assert!(matches!(
            app.dropdown,
            Some(Dropdown::RejectDetail { reason: 3, .. })
        ));
    }

    #[test]
    fn empty_duplicate_submit_marks_required() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        app.switch_item(2);

        app.press(Key::Char('d'), t0);
        app.press(Key::Enter, t0);

        assert_eq!(app.queue.items[2].disposition, Disposition::Pending);
        assert!(app.dropdown.as_ref().is_some_and(Dropdown::required));
        assert!(app.pending_advance.is_none());
        assert_eq!(app.loader.requests_issued(), 0);

        // whitespace counts as empty
        type_text(&mut app, "   ");
        app.press(Key::Enter, t0);
        assert_eq!(app.queue.items[2].disposition, Disposition::Pending);
    }

    #[test]
    fn reviewed_count_tracks_each_disposition() {
        let mut app = test_app(5, idle_source());
        app.config.modes.auto_advance = false;
        let t0 = Instant::now();

        app.approve(0, t0);

        app.reject_reason(1);
        app.reject_reason_detail(1, 2);
        type_text(&mut app, "offensive");
        app.submit_dropdown(1, t0);

        for (i, kind) in [(2, CommentKind::Duplicate), (3, CommentKind::Flag), (4, CommentKind::MoreInfo)] {
            app.open_comment(i, kind);
            type_text(&mut app, "note");
            app.submit_dropdown(i, t0);
        }

        let non_pending = app
            .queue
            .items
            .iter()
            .filter(|item| item.disposition != Disposition::Pending)
            .count();
        assert_eq!(app.queue.reviewed_count(), 5);
        assert_eq!(non_pending, 5);
        assert_eq!(app.queue.items[3].disposition.label(), "Flagged");
    }

    #[test]
    fn redisposing_keeps_count() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        app.approve(0, t0);
        app.open_comment(0, CommentKind::Flag);
        type_text(&mut app, "second thoughts");
        app.submit_dropdown(0, t0);
        assert_eq!(app.queue.reviewed_count(), 1);
        assert_eq!(app.queue.items[0].disposition.label(), "Flagged");
    }

    #[test]
    fn digits_bound_iff_reject_dropdown_open() {
        let mut app = test_app(4, idle_source());
        app.config.modes.auto_advance = false;
        let mut rng = StdRng::seed_from_u64(42);
        let keys: Vec<Key> = "jkardfm0123456789"
            .chars()
            .map(Key::Char)
            .chain([Key::Enter])
            .collect();
        let mut now = Instant::now();

        for _ in 0..500 {
            match rng.random_range(0..10) {
                0 => app.cancel_dropdown(),
                1 => app.toggle_input_focus(),
                2 => {
                    let i = rng.random_range(0..4);
                    app.switch_item(i);
                }
                3 if app.focus == InputFocus::TextField => app.type_char('x'),
                _ => {
                    let key = keys[rng.random_range(0..keys.len())];
                    if app.focus == InputFocus::TextField && key != Key::Enter {
                        app.type_char('y');
                    } else {
                        app.press(key, now);
                    }
                }
            }
            now += ms(30);
            app.tick(now);

            let reject_open = app.dropdown.as_ref().is_some_and(Dropdown::is_reject);
            assert_eq!(app.keymap.has_digit_bindings(), reject_open, "dropdown={:?}", app.dropdown);
            assert_eq!(app.is_rejecting, reject_open);
        }
    }

    #[test]
    fn opening_another_dropdown_replaces_the_first() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        app.reject_reason(0);
        app.open_comment(1, CommentKind::MoreInfo);
        assert!(!app.keymap.has_digit_bindings());
        assert!(!app.is_rejecting);
        assert_eq!(app.keymap.lookup(Key::Enter), Some(Action::Submit { item: 1 }));

        app.reject_reason(2);
        assert_eq!(
            app.keymap.lookup(Key::Char('1')),
            Some(Action::RejectReasonDetail { item: 2, reason: 1 })
        );
        app.press(Key::Enter, t0);
        assert!(matches!(app.dropdown, Some(Dropdown::RejectDetail { item: 2, .. })));
    }

    #[test]
    fn reason_never_offered_is_ignored() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();

        // no dropdown open
        app.click_reason(0, 3);
        assert!(app.dropdown.is_none());

        // unknown id
        app.reject_reason(0);
        app.dispatch(Action::RejectReasonDetail { item: 0, reason: 42 }, t0);
        assert!(matches!(app.dropdown, Some(Dropdown::RejectReasons { item: 0, .. })));

        // a reason aimed at another item
        app.dispatch(Action::RejectReasonDetail { item: 1, reason: 3 }, t0);
        assert!(matches!(app.dropdown, Some(Dropdown::RejectReasons { item: 0, .. })));

        // stale submit for another item
        app.reject_reason_detail(0, 3);
        type_text(&mut app, "why");
        app.submit_dropdown(1, t0);
        assert_eq!(app.queue.reviewed_count(), 0);
    }

    #[test]
    fn cancel_clears_reject_state() {
        let mut app = test_app(2, idle_source());
        app.reject_reason(0);
        app.cancel_dropdown();
        assert!(app.dropdown.is_none());
        assert!(!app.is_rejecting);
        assert!(!app.keymap.has_digit_bindings());
        assert_eq!(app.keymap.lookup(Key::Enter), None);
    }

    #[test]
    fn all_reviewed_fetches_once_and_splices() {
        let source = MockSource::new(|count| {
            Ok(Batch {
                count: count + 2,
                items: vec![payload(200, 0), payload(201, 1)],
                message: None,
            })
        });
        let mut app = test_app(3, source.clone());
        let t0 = Instant::now();

        app.approve(0, t0);
        app.approve(1, t0);
        assert_eq!(app.loader.requests_issued(), 0);
        app.approve(2, t0);
        assert_eq!(app.loader.requests_issued(), 1);

        // repeated triggers while the fetch is out
        app.request_more();
        app.approve(2, t0);
        assert_eq!(app.loader.requests_issued(), 1);

        let result = app.loader.wait().expect("fetch in flight");
        app.apply_fetch_result(result, t0);
        assert_eq!(source.calls(), 1);

        assert_eq!(app.queue.len(), 5);
        assert_eq!(app.queue.total_count, 5);
        let indices: Vec<usize> = app.queue.items.iter().map(|i| i.form_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);

        app.tick(t0 + ms(300));
        assert_eq!(app.queue.current, 3);
    }

    #[test]
    fn failed_fetch_notifies_and_unlocks() {
        let source = MockSource::new(|_| Err(FetchError::Disconnected));
        let mut app = test_app(1, source);
        let t0 = Instant::now();
        app.approve(0, t0);
        let result = app.loader.wait().expect("fetch in flight");
        app.apply_fetch_result(result, t0);
        assert!(!app.loader.is_loading());
        assert!(app.notice.as_deref().is_some_and(|m| m.starts_with("Could not load more")));
        assert_eq!(app.queue.len(), 1);
    }

    #[test]
    fn server_message_is_shown() {
        let source = MockSource::new(|count| {
            Ok(Batch {
                count,
                items: Vec::new(),
                message: Some("Commit your outstanding reviews first".into()),
            })
        });
        let mut app = test_app(1, source);
        let t0 = Instant::now();
        app.approve(0, t0);
        let result = app.loader.wait().expect("fetch in flight");
        app.apply_fetch_result(result, t0);
        assert_eq!(app.notice.as_deref(), Some("Commit your outstanding reviews first"));
    }

    #[test]
    fn next_and_prev_stop_at_ends() {
        let mut app = test_app(2, idle_source());
        let t0 = Instant::now();
        app.prev(t0);
        assert_eq!(app.notice.as_deref(), Some("Start of queue"));

        app.next(t0);
        app.tick(t0 + ms(300));
        assert_eq!(app.queue.current, 1);

        app.next(t0 + ms(300));
        assert_eq!(app.notice.as_deref(), Some("End of queue"));
        assert_eq!(app.queue.current, 1);
    }

    #[test]
    fn clicking_choice_row_acts_on_that_card() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        // item 1 starts at row 5, its choices row is 3 rows further down
        app.click(CARD_INSET, 5 + 3, t0);
        assert_eq!(app.queue.items[1].disposition, Disposition::Approved);
        assert_eq!(app.queue.items[0].disposition, Disposition::Pending);
    }

    #[test]
    fn clicking_reason_without_rejecting_is_ignored() {
        let mut app = test_app(3, idle_source());
        let t0 = Instant::now();
        app.reject_reason(0);
        app.is_rejecting = false;
        app.click(10, 4 + 3, t0);
        assert!(matches!(app.dropdown, Some(Dropdown::RejectReasons { .. })));
    }
}
