//! List ordering: display sort and group moves.
//!
//! Everything here is a pure function of its inputs.

use std::collections::HashSet;

use crate::model::{Item, ItemId};

/// Display order: unchecked items in their original relative order, then
/// checked items oldest-checked first. Items checked without a timestamp sort
/// as time 0. Ties keep their original relative order.
pub fn sort_for_display(items: &[Item]) -> Vec<Item> {
    let mut unchecked: Vec<Item> = items.iter().filter(|i| !i.checked).cloned().collect();
    let mut checked: Vec<Item> = items.iter().filter(|i| i.checked).cloned().collect();
    // sort_by_key is stable
    checked.sort_by_key(Item::checked_sort_key);
    unchecked.append(&mut checked);
    unchecked
}

/// Ids in display order, without cloning items.
pub fn display_ids(items: &[Item]) -> Vec<ItemId> {
    sort_for_display(items).into_iter().map(|i| i.id).collect()
}

/// Remove every item in `moving_ids` and reinsert them, in their existing
/// relative order, as one block at `insert_at` within what remains.
/// `insert_at` is clamped to `[0, remaining_len]`.
pub fn move_group(items: &[Item], moving_ids: &[ItemId], insert_at: isize) -> Vec<Item> {
    let moving: HashSet<ItemId> = moving_ids.iter().copied().collect();
    if moving.is_empty() {
        return items.to_vec();
    }
    let (block, mut rest): (Vec<Item>, Vec<Item>) =
        items.iter().cloned().partition(|i| moving.contains(&i.id));
    let at = insert_at.clamp(0, rest.len() as isize) as usize;
    rest.splice(at..at, block);
    rest
}

/// [`move_group`], then mark every moved item active again: unchecked, no
/// timestamp, not selected.
pub fn move_group_and_uncheck(
    items: &[Item],
    moving_ids: &[ItemId],
    insert_at: isize,
) -> Vec<Item> {
    let moving: HashSet<ItemId> = moving_ids.iter().copied().collect();
    let mut out = move_group(items, moving_ids, insert_at);
    for item in out.iter_mut().filter(|i| moving.contains(&i.id)) {
        item.uncheck();
        item.selected = false;
    }
    out
}

/// Translate a slot among the non-moving unchecked items (what a drag
/// reports) into an `insert_at` for [`move_group`] over the underlying
/// sequence, where checked items may be interleaved.
pub fn sequence_index_for_display_slot(
    items: &[Item],
    moving_ids: &[ItemId],
    slot: usize,
) -> isize {
    let moving: HashSet<ItemId> = moving_ids.iter().copied().collect();
    let unchecked_positions: Vec<usize> = items
        .iter()
        .filter(|i| !moving.contains(&i.id))
        .enumerate()
        .filter(|(_, i)| !i.checked)
        .map(|(pos, _)| pos)
        .collect();
    match unchecked_positions.get(slot) {
        Some(&pos) => pos as isize,
        None => unchecked_positions.last().map_or(0, |&pos| pos as isize + 1),
    }
}
