use serde::{Deserialize, Serialize};
use std::ops::Range;

// ── Dispositions ──

/// Moderation outcome recorded for one item.
///
/// Reason and comment live inside the variants that carry them, so a reject
/// reason can only exist on a rejected item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Disposition {
    #[default]
    Pending,
    Approved,
    Rejected { reason: u8, comment: String },
    Duplicate { comment: String },
    Flagged { comment: String },
    MoreInfoRequested { comment: String },
}

impl Disposition {
    pub fn is_reviewed(&self) -> bool {
        !matches!(self, Disposition::Pending)
    }

    /// External action ordinal for the submission surface.
    /// 0=MoreInfo, 1=Flag, 2=Duplicate, 3=Reject, 4=Approve; None while pending.
    pub fn action_code(&self) -> Option<u8> {
        match self {
            Disposition::Pending => None,
            Disposition::MoreInfoRequested { .. } => Some(0),
            Disposition::Flagged { .. } => Some(1),
            Disposition::Duplicate { .. } => Some(2),
            Disposition::Rejected { .. } => Some(3),
            Disposition::Approved => Some(4),
        }
    }

    /// Status label shown on the card once reviewed
    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Pending => "Pending",
            Disposition::Approved => "Approved",
            Disposition::Rejected { .. } => "Rejected",
            Disposition::Duplicate { .. } => "Duplicate",
            Disposition::Flagged { .. } => "Flagged",
            Disposition::MoreInfoRequested { .. } => "Info requested",
        }
    }

    pub fn reject_reason(&self) -> Option<u8> {
        match self {
            Disposition::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Disposition::Rejected { comment, .. }
            | Disposition::Duplicate { comment }
            | Disposition::Flagged { comment }
            | Disposition::MoreInfoRequested { comment } => Some(comment.as_str()),
            Disposition::Pending | Disposition::Approved => None,
        }
    }
}

// ── Items ──

/// One queued submission as served by a page source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Field index as rendered by the server; batch-local, renumbered on splice
    #[serde(default)]
    pub form_index: usize,
}

/// A materialized queue item
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub author: String,
    pub description: String,
    /// External index embedded in this item's form field names
    pub form_index: usize,
    pub disposition: Disposition,
}

impl Item {
    pub fn from_payload(payload: ItemPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            author: payload.author,
            description: payload.description,
            form_index: payload.form_index,
            disposition: Disposition::Pending,
        }
    }
}

// ── Queue ──

/// Ordered review queue. Order is review order and the sequence is append-only.
#[derive(Debug, Clone)]
pub struct Queue {
    pub items: Vec<Item>,
    /// The single focused item
    pub current: usize,
    /// Authoritative count from the server; may exceed `items.len()`
    pub total_count: usize,
    /// Ceiling on how many items may be materialized client-side
    pub max_materialized: usize,
}

impl Queue {
    pub fn new(max_materialized: usize) -> Self {
        Self {
            items: Vec::new(),
            current: 0,
            total_count: 0,
            max_materialized,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Number of items that have left `Pending`
    pub fn reviewed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.disposition.is_reviewed())
            .count()
    }

    /// Every currently known item has a disposition
    pub fn all_reviewed(&self) -> bool {
        self.reviewed_count() == self.total_count
    }

    /// Room left under the materialization ceiling
    pub fn has_room(&self) -> bool {
        self.items.len() < self.max_materialized
    }

    /// Record a terminal disposition. Returns true when the item was pending.
    pub fn record(&mut self, index: usize, disposition: Disposition) -> bool {
        debug_assert!(disposition.is_reviewed(), "record() takes terminal dispositions only");
        if !disposition.is_reviewed() {
            return false;
        }
        match self.items.get_mut(index) {
            Some(item) => {
                let was_pending = !item.disposition.is_reviewed();
                item.disposition = disposition;
                was_pending
            }
            None => false,
        }
    }

    /// Append a fetched batch. New items get external indices continuing from the
    /// previous total, and the batch is cut to the materialization ceiling.
    /// Returns the index range of the appended items.
    pub fn splice(&mut self, payloads: Vec<ItemPayload>, count: usize) -> Range<usize> {
        let start = self.items.len();
        let next_index = self.total_count;
        let room = self.max_materialized.saturating_sub(start);

        if payloads.len() > room {
            tracing::warn!(
                offered = payloads.len(),
                room,
                "batch exceeds materialization ceiling, truncating"
            );
        }

        for (offset, payload) in payloads.into_iter().take(room).enumerate() {
            let mut item = Item::from_payload(payload);
            item.form_index = next_index + offset;
            self.items.push(item);
        }

        self.total_count = count.max(self.items.len());
        start..self.items.len()
    }
}

#[cfg(test)]
pub(crate) fn payload(id: u64, form_index: usize) -> ItemPayload {
    ItemPayload {
        id,
        name: format!("Theme {}", id),
        author: "someone".to_string(),
        description: "A dark theme with stars".to_string(),
        form_index,
    }
}
