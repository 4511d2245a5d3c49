use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::edit::drag::{
    DragCommit, DragConfig, DragController, DragUpdate, PointerSample, PressRejected, Release,
    RowGeometry, Viewport,
};
use crate::edit::history::History;
use crate::io::store::{Store, StoreError};
use crate::model::{Config, Document, Item, ItemId};
use crate::ops::{item_ops, order, paste};

/// The live checklist: current document, undo history, drag gesture and the
/// store it saves to.
///
/// Every mutation follows the same shape: snapshot if it starts an undo
/// step, run a pure transform from `ops`, replace the document, save.
pub struct Session<S: Store> {
    doc: Document,
    history: History,
    drag: DragController,
    store: S,
    focus: Option<ItemId>,
    save_error: Option<StoreError>,
}

impl<S: Store> Session<S> {
    /// Load from `store`, falling back to a fresh document when nothing is
    /// saved or the saved data can't be read.
    pub fn open(store: S, config: &Config) -> Self {
        let doc = match store.load() {
            Ok(Some(doc)) => doc.normalize(),
            Ok(None) => Document::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not load checklist, starting fresh");
                Document::default()
            }
        };
        Session::with_document(store, doc, config)
    }

    /// Start from an already loaded document
    pub fn with_document(store: S, doc: Document, config: &Config) -> Self {
        Session::new(
            store,
            doc,
            History::new(config.history.limit),
            DragController::new(DragConfig::from(&config.drag)),
        )
    }

    pub fn new(store: S, doc: Document, history: History, drag: DragController) -> Self {
        Session {
            doc,
            history,
            drag,
            store,
            focus: None,
            save_error: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Items in the order they are shown
    pub fn display_items(&self) -> Vec<Item> {
        order::sort_for_display(&self.doc.items)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The item the UI should focus next, if any. Cleared on read.
    pub fn take_focus(&mut self) -> Option<ItemId> {
        self.focus.take()
    }

    /// Why the most recent save failed, if it did. Cleared on read.
    pub fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// A keystroke's worth of text change. Consecutive calls for the same
    /// item form one undo step until [`Session::end_typing`].
    pub fn set_text(&mut self, id: ItemId, text: &str) -> bool {
        let Some(next) = item_ops::set_text(&self.doc, id, text) else {
            return false;
        };
        self.history.begin_typing(&self.doc, id);
        self.replace(next);
        true
    }

    /// Field lost focus or Enter was pressed
    pub fn end_typing(&mut self) {
        self.history.end_typing();
    }

    /// Paste into item `id` at char index `cursor`. Extra lines become new
    /// items after it. A single-line paste counts as typing.
    pub fn paste(&mut self, id: ItemId, cursor: usize, text: &str) -> bool {
        let mut result = None;
        paste::apply_paste(&self.doc, id, cursor, text, |doc, focus| {
            result = Some((doc, focus))
        });
        let Some((next, focus)) = result else {
            return false;
        };
        if next == self.doc {
            return false;
        }
        match focus {
            None => {
                self.history.begin_typing(&self.doc, id);
            }
            Some(_) => self.history.snapshot(&self.doc),
        }
        self.focus = focus;
        self.replace(next);
        true
    }

    // -----------------------------------------------------------------------
    // Undoable edits
    // -----------------------------------------------------------------------

    pub fn toggle_checked(&mut self, id: ItemId) -> bool {
        self.toggle_checked_at(id, Utc::now())
    }

    pub fn toggle_checked_at(&mut self, id: ItemId, now: DateTime<Utc>) -> bool {
        self.apply_undoable("toggle", |doc| item_ops::toggle_checked(doc, id, now))
    }

    pub fn set_checked(&mut self, id: ItemId, checked: bool) -> bool {
        let now = Utc::now();
        self.apply_undoable("set checked", |doc| {
            item_ops::set_checked(doc, id, checked, now)
        })
    }

    /// Insert a blank item after `after`; it becomes the focus target.
    /// `None` if `after` is unknown or no id is left to hand out.
    pub fn insert_after(&mut self, after: ItemId) -> Option<ItemId> {
        let new_id = self.doc.next_id()?;
        if !self.apply_undoable("insert", |doc| item_ops::insert_after(doc, after, new_id)) {
            return None;
        }
        self.focus = Some(new_id);
        Some(new_id)
    }

    /// Add an item at the bottom of the active list
    pub fn append(&mut self, text: &str) -> Option<ItemId> {
        let new_id = self.doc.next_id()?;
        let text = text.to_string();
        self.apply_undoable("append", |doc| item_ops::append_item(doc, new_id, text))
            .then_some(new_id)
    }

    pub fn delete(&mut self, id: ItemId) -> bool {
        self.apply_undoable("delete", |doc| item_ops::delete_item(doc, id))
    }

    /// Replace everything with one blank item
    pub fn reset(&mut self) {
        self.history.snapshot(&self.doc);
        let next = item_ops::reset();
        self.focus = next.items.first().map(|i| i.id);
        tracing::debug!("checklist reset");
        self.replace(next);
    }

    /// Move `commit.ids` to `commit.slot` among the other unchecked items.
    /// Moved items come back unchecked and unselected.
    pub fn commit_drag(&mut self, commit: &DragCommit) -> bool {
        let ids: Vec<ItemId> = commit
            .ids
            .iter()
            .copied()
            .filter(|id| self.doc.contains(*id))
            .collect();
        let Some(&first) = ids.first() else {
            return false;
        };
        let at = order::sequence_index_for_display_slot(&self.doc.items, &ids, commit.slot);
        let items = order::move_group_and_uncheck(&self.doc.items, &ids, at);
        self.focus = Some(first);
        if items == self.doc.items {
            return false;
        }
        self.history.snapshot(&self.doc);
        let mut next = self.doc.clone();
        next.items = items;
        tracing::debug!(?ids, slot = commit.slot, "moved items");
        self.replace(next);
        true
    }

    // -----------------------------------------------------------------------
    // Mode and selection (not undo steps)
    // -----------------------------------------------------------------------

    pub fn set_edit_mode(&mut self, edit: bool) -> bool {
        self.history.end_typing();
        if edit != self.doc.edit {
            self.drag.cancel();
        }
        self.apply("edit mode", |doc| item_ops::set_edit_mode(doc, edit))
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        self.set_edit_mode(!self.doc.edit)
    }

    pub fn toggle_selected(&mut self, id: ItemId) -> bool {
        self.history.end_typing();
        self.apply("select", |doc| item_ops::toggle_selected(doc, id))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.apply("clear selection", item_ops::clear_selection)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Restore the previous step. The current edit/check mode is kept.
    pub fn undo(&mut self) -> bool {
        self.drag.cancel();
        let Some(prev) = self.history.undo(&self.doc) else {
            return false;
        };
        self.restore(prev);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.drag.cancel();
        let Some(next) = self.history.redo(&self.doc) else {
            return false;
        };
        self.restore(next);
        true
    }

    // -----------------------------------------------------------------------
    // Drag gesture
    // -----------------------------------------------------------------------

    pub fn press(
        &mut self,
        rows: &[RowGeometry],
        viewport: Viewport,
        id: ItemId,
        sample: PointerSample,
    ) -> Result<(), PressRejected> {
        self.drag.press(&self.doc, rows, viewport, id, sample)
    }

    pub fn pointer_move(&mut self, viewport: Viewport, sample: PointerSample) -> DragUpdate {
        self.drag.pointer_move(&self.doc, viewport, sample)
    }

    pub fn tick(&mut self, viewport: Viewport, now: Instant) -> DragUpdate {
        self.drag.tick(&self.doc, viewport, now)
    }

    /// Pointer up. A finished drag is applied to the document here.
    pub fn release(&mut self) -> Release {
        let release = self.drag.release(&self.doc);
        if let Release::Commit(commit) = &release {
            self.commit_drag(commit);
        }
        release
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    /// The caller has swallowed the click that followed a drag
    pub fn clear_click_guard(&mut self) {
        self.drag.clear_click_guard();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn apply_undoable<F>(&mut self, what: &str, f: F) -> bool
    where
        F: FnOnce(&Document) -> Option<Document>,
    {
        let Some(next) = f(&self.doc) else {
            return false;
        };
        self.history.snapshot(&self.doc);
        tracing::debug!(op = what, "edit");
        self.replace(next);
        true
    }

    fn apply<F>(&mut self, what: &str, f: F) -> bool
    where
        F: FnOnce(&Document) -> Option<Document>,
    {
        let Some(next) = f(&self.doc) else {
            return false;
        };
        tracing::debug!(op = what, "update");
        self.replace(next);
        true
    }

    fn restore(&mut self, mut doc: Document) {
        doc.edit = self.doc.edit;
        if !doc.edit {
            for item in &mut doc.items {
                item.selected = false;
            }
        }
        self.replace(doc);
    }

    fn replace(&mut self, next: Document) {
        self.doc = next;
        self.save_error = match self.store.save(&self.doc) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not save checklist");
                Some(e)
            }
        };
    }
}
