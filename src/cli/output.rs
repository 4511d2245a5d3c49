use serde::Serialize;

use crate::model::{Document, Item, ItemId};
use crate::ops::order;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// `list --json`: the document with items in display order
#[derive(Serialize)]
pub struct ListJson<'a> {
    pub edit: bool,
    pub items: Vec<&'a Item>,
}

#[derive(Serialize)]
pub struct IdJson {
    pub id: ItemId,
}

pub fn list_to_json(doc: &Document) -> ListJson<'_> {
    let order = order::display_ids(&doc.items);
    ListJson {
        edit: doc.edit,
        items: order.iter().filter_map(|id| doc.get(*id)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `[ ] 3  milk`
pub fn format_item_line(item: &Item, id_width: usize) -> String {
    let checkbox = if item.checked { "[x]" } else { "[ ]" };
    format!(
        "{} {:>width$}  {}",
        checkbox,
        item.id.0,
        item.text,
        width = id_width
    )
}

/// All items in display order, ids right-aligned
pub fn format_list(doc: &Document) -> Vec<String> {
    let items = order::sort_for_display(&doc.items);
    let id_width = items
        .iter()
        .map(|i| i.id.to_string().len())
        .max()
        .unwrap_or(1);
    items
        .iter()
        .map(|item| format_item_line(item, id_width))
        .collect()
}
