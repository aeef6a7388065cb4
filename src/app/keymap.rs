use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;

use crate::catalog::ReasonCatalog;

/// A key the registry can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Char(char),
    Enter,
}

impl Key {
    /// Map a terminal key event to a registry key. Letters are case-folded.
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        match event.code {
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
            _ => None,
        }
    }

    pub fn digit(d: u8) -> Self {
        Key::Char(char::from(b'0' + d))
    }

    pub fn label(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Enter => "Enter".to_string(),
        }
    }
}

/// Everything a key can do. Base actions target the focused item; the others
/// carry the item index captured when their dropdown opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Prev,
    Approve,
    RejectReason,
    Duplicate,
    Flag,
    MoreInfo,
    RejectReasonDetail { item: usize, reason: u8 },
    ChooseHighlightedReason { item: usize },
    Submit { item: usize },
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Next => "next",
            Action::Prev => "prev",
            Action::Approve => "approve",
            Action::RejectReason => "reject",
            Action::Duplicate => "duplicate",
            Action::Flag => "flag",
            Action::MoreInfo => "more info",
            Action::RejectReasonDetail { .. } => "reason",
            Action::ChooseHighlightedReason { .. } => "choose",
            Action::Submit { .. } => "submit",
        }
    }
}

/// The live key → action table. Mutated only through bind/unbind as
/// dropdowns open and close; nothing sits underneath it.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<Key, Action>,
}

impl Keymap {
    /// Base review table: j/k navigation plus one key per disposition
    pub fn with_defaults() -> Self {
        let mut keymap = Self::default();
        keymap.bind(Key::Char('j'), Action::Next);
        keymap.bind(Key::Char('k'), Action::Prev);
        keymap.bind(Key::Char('a'), Action::Approve);
        keymap.bind(Key::Char('r'), Action::RejectReason);
        keymap.bind(Key::Char('d'), Action::Duplicate);
        keymap.bind(Key::Char('f'), Action::Flag);
        keymap.bind(Key::Char('m'), Action::MoreInfo);
        keymap
    }

    pub fn bind(&mut self, key: Key, action: Action) -> Option<Action> {
        self.bindings.insert(key, action)
    }

    pub fn unbind(&mut self, key: Key) -> Option<Action> {
        self.bindings.remove(&key)
    }

    pub fn lookup(&self, key: Key) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Bind 1-9 to reason shortcuts for `item`, for the ids the catalog offers
    pub fn bind_digits(&mut self, item: usize, catalog: &ReasonCatalog) {
        for reason in catalog.shortcut_ids() {
            self.bind(Key::digit(reason), Action::RejectReasonDetail { item, reason });
        }
    }

    /// Remove the whole 0-9 range
    pub fn unbind_digits(&mut self) {
        for d in 0..=9 {
            self.unbind(Key::digit(d));
        }
    }

    pub fn has_digit_bindings(&self) -> bool {
        (0..=9).any(|d| self.bindings.contains_key(&Key::digit(d)))
    }

    /// Current bindings in a stable order, for the hint bar
    pub fn bindings(&self) -> Vec<(Key, Action)> {
        let mut all: Vec<(Key, Action)> = self.bindings.iter().map(|(k, a)| (*k, *a)).collect();
        all.sort_by_key(|(k, _)| *k);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn defaults_cover_navigation_and_dispositions() {
        let keymap = Keymap::with_defaults();
        assert_eq!(keymap.lookup(Key::Char('j')), Some(Action::Next));
        assert_eq!(keymap.lookup(Key::Char('a')), Some(Action::Approve));
        assert_eq!(keymap.lookup(Key::Char('m')), Some(Action::MoreInfo));
        assert_eq!(keymap.lookup(Key::Enter), None);
        assert!(!keymap.has_digit_bindings());
    }

    #[test]
    fn unbound_key_has_no_fallback() {
        let mut keymap = Keymap::with_defaults();
        keymap.unbind(Key::Char('a'));
        assert_eq!(keymap.lookup(Key::Char('a')), None);
    }

    #[test]
    fn digits_bind_to_captured_item() {
        let mut keymap = Keymap::with_defaults();
        keymap.bind_digits(4, &ReasonCatalog::default());
        assert_eq!(
            keymap.lookup(Key::Char('3')),
            Some(Action::RejectReasonDetail { item: 4, reason: 3 })
        );
        // 0 is "other" and never gets a shortcut
        assert_eq!(keymap.lookup(Key::Char('0')), None);
        assert!(keymap.has_digit_bindings());
    }

    #[test]
    fn unbind_digits_clears_whole_range() {
        let mut keymap = Keymap::with_defaults();
        keymap.bind_digits(0, &ReasonCatalog::default());
        keymap.bind(Key::Char('0'), Action::Approve);
        keymap.unbind_digits();
        assert!(!keymap.has_digit_bindings());
        assert_eq!(keymap.lookup(Key::Char('j')), Some(Action::Next));
    }

    #[test]
    fn bind_replaces_and_returns_previous() {
        let mut keymap = Keymap::default();
        assert_eq!(keymap.bind(Key::Enter, Action::Submit { item: 1 }), None);
        assert_eq!(
            keymap.bind(Key::Enter, Action::Submit { item: 2 }),
            Some(Action::Submit { item: 1 })
        );
    }

    #[test]
    fn key_from_event_folds_case() {
        let event = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(Key::from_event(&event), Some(Key::Char('a')));
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(Key::from_event(&enter), Some(Key::Enter));
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(Key::from_event(&esc), None);
    }
}
