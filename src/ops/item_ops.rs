use chrono::{DateTime, Utc};

use crate::model::{Document, Item, ItemId};

// Every operation here is a pure transform. `None` means "nothing to do"
// (unknown id, wrong mode); callers treat it as a silent no-op.

/// Replace one item's text. Order is untouched.
pub fn set_text(doc: &Document, id: ItemId, text: &str) -> Option<Document> {
    let mut next = doc.clone();
    let item = next.get_mut(id)?;
    if item.text == text {
        return None;
    }
    item.text = text.to_string();
    Some(next)
}

/// Flip `checked`. The item keeps its place in the underlying sequence; the
/// display sort moves it between regions.
pub fn toggle_checked(doc: &Document, id: ItemId, now: DateTime<Utc>) -> Option<Document> {
    let mut next = doc.clone();
    let item = next.get_mut(id)?;
    if item.checked {
        item.uncheck();
    } else {
        item.check(now);
    }
    Some(next)
}

/// Set `checked` to an explicit value. `None` if already in that state.
pub fn set_checked(
    doc: &Document,
    id: ItemId,
    checked: bool,
    now: DateTime<Utc>,
) -> Option<Document> {
    if doc.get(id)?.checked == checked {
        return None;
    }
    toggle_checked(doc, id, now)
}

/// Insert a blank item directly after `after`.
pub fn insert_after(doc: &Document, after: ItemId, new_id: ItemId) -> Option<Document> {
    insert_text_after(doc, after, new_id, String::new())
}

pub fn insert_text_after(
    doc: &Document,
    after: ItemId,
    new_id: ItemId,
    text: String,
) -> Option<Document> {
    let pos = doc.position(after)?;
    if doc.contains(new_id) {
        return None;
    }
    let mut next = doc.clone();
    next.items.insert(pos + 1, Item::with_text(new_id, text));
    Some(next)
}

/// Append an item after the last unchecked item, so it shows at the bottom of
/// the active list.
pub fn append_item(doc: &Document, new_id: ItemId, text: String) -> Option<Document> {
    if doc.contains(new_id) {
        return None;
    }
    let mut next = doc.clone();
    let at = next
        .items
        .iter()
        .rposition(|i| !i.checked)
        .map_or(0, |p| p + 1);
    next.items.insert(at, Item::with_text(new_id, text));
    Some(next)
}

/// Delete an item. Edit mode only. Deleting the last item leaves one fresh
/// blank item behind.
pub fn delete_item(doc: &Document, id: ItemId) -> Option<Document> {
    if !doc.edit {
        return None;
    }
    let pos = doc.position(id)?;
    let mut next = doc.clone();
    next.items.remove(pos);
    if next.items.is_empty() {
        next.items.push(Item::new(doc.next_id().unwrap_or(ItemId(1))));
    }
    Some(next)
}

/// A fresh document: one blank item, edit mode on.
pub fn reset() -> Document {
    Document::default()
}

/// Switch between edit and check mode. Leaving edit mode drops the selection.
pub fn set_edit_mode(doc: &Document, edit: bool) -> Option<Document> {
    if doc.edit == edit {
        return None;
    }
    let mut next = doc.clone();
    next.edit = edit;
    if !edit {
        for item in &mut next.items {
            item.selected = false;
        }
    }
    Some(next)
}

/// Toggle multi-drag membership. Edit mode and unchecked items only.
pub fn toggle_selected(doc: &Document, id: ItemId) -> Option<Document> {
    if !doc.edit {
        return None;
    }
    let mut next = doc.clone();
    let item = next.get_mut(id)?;
    if item.checked {
        return None;
    }
    item.selected = !item.selected;
    Some(next)
}

pub fn clear_selection(doc: &Document) -> Option<Document> {
    if !doc.items.iter().any(|i| i.selected) {
        return None;
    }
    let mut next = doc.clone();
    for item in &mut next.items {
        item.selected = false;
    }
    Some(next)
}
