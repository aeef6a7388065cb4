use serde::{Deserialize, Serialize};

/// Reason id reserved for "other"; it has no single-key shortcut
pub const OTHER_REASON: u8 = 0;

/// One entry in the reject-reason dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub id: u8,
    pub label: String,
}

/// Ordered list of reject reasons offered to the reviewer
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonCatalog {
    reasons: Vec<Reason>,
}

impl Default for ReasonCatalog {
    fn default() -> Self {
        let builtin = [
            (1, "Sexual or pornographic content"),
            (2, "Inappropriate or offensive content"),
            (3, "Violence, war, or weaponry images"),
            (4, "Nazi or other hate content"),
            (5, "Defamatory content"),
            (6, "Online gambling"),
            (7, "Spam content"),
            (8, "Low-quality, stretched, or blank image"),
            (9, "Header image alignment problem"),
            (OTHER_REASON, "Other"),
        ];
        Self {
            reasons: builtin
                .iter()
                .map(|(id, label)| Reason { id: *id, label: label.to_string() })
                .collect(),
        }
    }
}

impl ReasonCatalog {
    /// Build a catalog from configured reasons. Duplicate ids keep the first entry.
    /// An empty list falls back to the built-in reasons.
    pub fn new(reasons: Vec<Reason>) -> Self {
        if reasons.is_empty() {
            return Self::default();
        }
        let mut kept: Vec<Reason> = Vec::with_capacity(reasons.len());
        for reason in reasons {
            if kept.iter().any(|r| r.id == reason.id) {
                tracing::warn!(id = reason.id, "duplicate reject reason id ignored");
                continue;
            }
            kept.push(reason);
        }
        Self { reasons: kept }
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reason> {
        self.reasons.iter()
    }

    pub fn get(&self, id: u8) -> Option<&Reason> {
        self.reasons.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Reason at a display position (dropdown row)
    pub fn at(&self, position: usize) -> Option<&Reason> {
        self.reasons.get(position)
    }

    /// Ids reachable through digit shortcuts (1-9)
    pub fn shortcut_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.reasons
            .iter()
            .map(|r| r.id)
            .filter(|id| (1..=9).contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_other_without_shortcut() {
        let catalog = ReasonCatalog::default();
        assert!(catalog.contains(OTHER_REASON));
        let shortcuts: Vec<u8> = catalog.shortcut_ids().collect();
        assert_eq!(shortcuts, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn empty_config_falls_back_to_builtin() {
        assert_eq!(ReasonCatalog::new(Vec::new()), ReasonCatalog::default());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let catalog = ReasonCatalog::new(vec![
            Reason { id: 2, label: "first".into() },
            Reason { id: 2, label: "second".into() },
            Reason { id: 12, label: "no shortcut".into() },
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(2).map(|r| r.label.as_str()), Some("first"));
        assert_eq!(catalog.shortcut_ids().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn at_indexes_display_order() {
        let catalog = ReasonCatalog::default();
        assert_eq!(catalog.at(0).map(|r| r.id), Some(1));
        assert_eq!(catalog.at(9).map(|r| r.id), Some(OTHER_REASON));
        assert!(catalog.at(10).is_none());
    }
}
