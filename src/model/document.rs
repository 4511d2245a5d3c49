use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId};

/// The whole checklist: the ordered items plus the edit/check mode flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Edit mode (reorder, delete, select) vs. check mode
    #[serde(default)]
    pub edit: bool,
    /// Underlying order. Authoritative for unchecked items; checked items keep
    /// their slot here but display in checked-at order.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Default for Document {
    /// One blank item, edit mode on
    fn default() -> Self {
        Document {
            edit: true,
            items: vec![Item::new(ItemId(1))],
        }
    }
}

impl Document {
    /// Id for a new item: one past the largest id in use. `None` once the
    /// largest id is `u64::MAX`.
    pub fn next_id(&self) -> Option<ItemId> {
        self.max_id().checked_add(1).map(ItemId)
    }

    fn max_id(&self) -> u64 {
        self.items.iter().map(|i| i.id.0).max().unwrap_or(0)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of selected unchecked items, in document order
    pub fn selected_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|i| i.selected && !i.checked)
            .map(|i| i.id)
            .collect()
    }

    pub fn unchecked_count(&self) -> usize {
        self.items.iter().filter(|i| !i.checked).count()
    }

    /// Repair a document read from storage so every invariant holds.
    ///
    /// Duplicate ids get fresh ids, timestamps on unchecked items are dropped,
    /// selection is cleared and an empty list becomes one blank item. When ids
    /// sit so close to `u64::MAX` that new ones can't be handed out, every
    /// item is renumbered from 1.
    pub fn normalize(mut self) -> Self {
        let count = self.items.len() as u64;
        if self.max_id().checked_add(count).is_none() {
            for (item, id) in self.items.iter_mut().zip(1..) {
                item.id = ItemId(id);
            }
        }
        let mut seen = HashSet::new();
        let mut next = self.max_id() + 1;
        for item in &mut self.items {
            if !seen.insert(item.id) {
                item.id = ItemId(next);
                seen.insert(item.id);
                next += 1;
            }
            if !item.checked {
                item.checked_at = None;
            }
            item.selected = false;
        }
        if self.items.is_empty() {
            self.items.push(Item::new(ItemId(1)));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn doc(ids: &[u64]) -> Document {
        Document {
            edit: true,
            items: ids
                .iter()
                .map(|&id| Item::with_text(ItemId(id), format!("item {}", id)))
                .collect(),
        }
    }

    #[test]
    fn default_is_one_blank_item_in_edit_mode() {
        let d = Document::default();
        assert!(d.edit);
        assert_eq!(d.items.len(), 1);
        assert_eq!(d.items[0].text, "");
        assert!(!d.items[0].checked);
    }

    #[test]
    fn next_id_is_one_past_max() {
        assert_eq!(doc(&[3, 9, 4]).next_id(), Some(ItemId(10)));
        assert_eq!(doc(&[]).next_id(), Some(ItemId(1)));
    }

    #[test]
    fn next_id_runs_out_at_max() {
        assert_eq!(doc(&[u64::MAX - 1]).next_id(), Some(ItemId(u64::MAX)));
        assert_eq!(doc(&[1, u64::MAX]).next_id(), None);
    }

    #[test]
    fn normalize_renumbers_ids_near_max() {
        let d = doc(&[7, u64::MAX, u64::MAX]).normalize();
        let ids: Vec<u64> = d.items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(d.next_id(), Some(ItemId(4)));
        assert_eq!(d.items[1].text, "item 18446744073709551615");
    }

    #[test]
    fn normalize_keeps_ids_that_leave_room() {
        let d = doc(&[u64::MAX - 3, 2, 2]).normalize();
        let ids: Vec<u64> = d.items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![u64::MAX - 3, 2, u64::MAX - 2]);
    }

    #[test]
    fn selected_ids_skip_checked_items() {
        let mut d = doc(&[1, 2, 3]);
        d.items[0].selected = true;
        d.items[1].selected = true;
        d.items[1].checked = true;
        d.items[2].selected = true;
        assert_eq!(d.selected_ids(), vec![ItemId(1), ItemId(3)]);
    }

    #[test]
    fn normalize_reassigns_duplicate_ids() {
        let d = doc(&[1, 2, 2, 1]).normalize();
        let ids: Vec<u64> = d.items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn normalize_drops_stray_timestamps_and_selection() {
        let mut d = doc(&[1, 2]);
        d.items[0].checked_at = Some(Utc::now());
        d.items[1].selected = true;
        let d = d.normalize();
        assert!(d.items[0].checked_at.is_none());
        assert!(!d.items[1].selected);
    }

    #[test]
    fn normalize_fills_empty_document() {
        let d = doc(&[]).normalize();
        assert_eq!(d.items.len(), 1);
    }

    #[test]
    fn missing_fields_deserialize_with_defaults() {
        let d: Document = serde_json::from_str(r#"{"items":[{"id":5}]}"#).unwrap();
        assert!(!d.edit);
        assert_eq!(d.items[0].id, ItemId(5));
        assert_eq!(d.items[0].text, "");
    }
}
