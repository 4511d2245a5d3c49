use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque item identifier, unique within a document and stable for the
/// item's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ItemId)
    }
}

/// A single checklist row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Row text (may be empty while being typed)
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    /// When the item was last checked. Present iff `checked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    /// Multi-drag group membership (edit mode only, never persisted)
    #[serde(skip)]
    pub selected: bool,
}

impl Item {
    /// A blank, unchecked item
    pub fn new(id: ItemId) -> Self {
        Item::with_text(id, String::new())
    }

    pub fn with_text(id: ItemId, text: String) -> Self {
        Item {
            id,
            text,
            checked: false,
            checked_at: None,
            selected: false,
        }
    }

    /// Mark checked at `now`; no-op if already checked.
    pub fn check(&mut self, now: DateTime<Utc>) {
        if self.checked {
            return;
        }
        self.checked = true;
        self.checked_at = Some(now);
        self.selected = false;
    }

    pub fn uncheck(&mut self) {
        self.checked = false;
        self.checked_at = None;
    }

    /// Sort key for the checked region. Missing timestamps sort as 0.
    pub fn checked_sort_key(&self) -> i64 {
        self.checked_at.map_or(0, |t| t.timestamp_millis())
    }
}
