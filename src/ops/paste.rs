//! Multi-line paste into a single-line item.

use crate::model::{Document, ItemId};
use crate::ops::item_ops;

/// Result of merging pasted text into a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteMerge {
    /// Field text with the first pasted line inserted at the cursor
    pub merged: String,
    /// Remaining non-empty lines, each meant to become a new item
    pub rest: Vec<String>,
}

/// Insert the first line of `pasted` into `original` at `cursor` (a char
/// index, clamped to the text) and return the other non-empty lines.
///
/// Lines end in `\n` or `\r\n`. The first line is merged even when empty.
pub fn paste_merge(original: &str, cursor: usize, pasted: &str) -> PasteMerge {
    let mut lines = pasted
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    let first = lines.next().unwrap_or("");
    let rest = lines
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let byte = original
        .char_indices()
        .nth(cursor)
        .map_or(original.len(), |(b, _)| b);
    let mut merged = String::with_capacity(original.len() + first.len());
    merged.push_str(&original[..byte]);
    merged.push_str(first);
    merged.push_str(&original[byte..]);

    PasteMerge { merged, rest }
}

/// Apply a paste to item `id` of `doc` and hand the result to `commit`.
///
/// The merged text replaces the item's text and every remaining line becomes
/// a new item directly after it, in order. `commit` receives the new document
/// and the id that should take focus (the last inserted item, or `None` for a
/// single-line paste). Unknown ids never reach `commit`.
pub fn apply_paste<F>(doc: &Document, id: ItemId, cursor: usize, pasted: &str, commit: F)
where
    F: FnOnce(Document, Option<ItemId>),
{
    let Some(item) = doc.get(id) else {
        return;
    };
    let PasteMerge { merged, rest } = paste_merge(&item.text, cursor, pasted);

    let mut next = item_ops::set_text(doc, id, &merged).unwrap_or_else(|| doc.clone());
    let mut after = id;
    let mut focus = None;
    for line in rest {
        let Some(new_id) = next.next_id() else {
            break;
        };
        if let Some(d) = item_ops::insert_text_after(&next, after, new_id, line) {
            next = d;
            after = new_id;
            focus = Some(new_id);
        }
    }
    commit(next, focus);
}
