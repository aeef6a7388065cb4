use super::queue::Item;
use crate::ui::utils::word_wrap;

/// Description lines shown per card before truncation
pub const DESCRIPTION_MAX_LINES: usize = 3;

/// Columns taken by the left border and padding ("│ ")
pub const CARD_INSET: u16 = 2;

/// The per-card buttons, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Approve,
    Reject,
    Duplicate,
    Flag,
    MoreInfo,
}

pub const CHOICES: [(Choice, &str); 5] = [
    (Choice::Approve, "[a] Approve"),
    (Choice::Reject, "[r] Reject"),
    (Choice::Duplicate, "[d] Duplicate"),
    (Choice::Flag, "[f] Flag"),
    (Choice::MoreInfo, "[m] More info"),
];

/// Gap between buttons on the choices row
pub const CHOICE_GAP: usize = 2;

/// Which button sits at column `x`, counted from the card's inner left edge
pub fn choice_at(x: u16) -> Option<Choice> {
    let x = x as usize;
    let mut start = 0usize;
    for (choice, label) in CHOICES.iter() {
        let end = start + label.chars().count();
        if x >= start && x < end {
            return Some(*choice);
        }
        start = end + CHOICE_GAP;
    }
    None
}

/// Row layout of one card, shared by rendering and hit-testing.
///
/// ```text
/// 0            ┌───────────┐
/// 1            │ header    │
/// 2..2+d       │ description
/// 2+d          │ choices   │
/// 3+d..3+d+k   │ dropdown  │
/// height-1     └───────────┘
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub description: Vec<String>,
    pub choices_row: u16,
    pub dropdown_row: u16,
    pub dropdown_rows: u16,
    pub height: u16,
}

impl CardLayout {
    pub fn measure(item: &Item, width: u16, dropdown_rows: u16) -> Self {
        let inner = width.saturating_sub(CARD_INSET * 2) as usize;
        let mut description = if item.description.trim().is_empty() {
            Vec::new()
        } else {
            word_wrap(item.description.trim(), inner)
        };
        if description.len() > DESCRIPTION_MAX_LINES {
            description.truncate(DESCRIPTION_MAX_LINES);
            if let Some(last) = description.last_mut() {
                last.push('…');
            }
        }

        let choices_row = 2 + description.len() as u16;
        let dropdown_row = choices_row + 1;
        Self {
            description,
            choices_row,
            dropdown_row,
            dropdown_rows,
            height: dropdown_row + dropdown_rows + 1,
        }
    }
}
