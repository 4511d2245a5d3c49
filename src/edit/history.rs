use crate::model::{Document, ItemId};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Snapshot-based undo/redo.
///
/// Every entry is a full copy of the document taken *before* a mutation.
/// Keystrokes into one item collapse into a single entry through the typing
/// session: only the first keystroke of a burst snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Document>,
    redo: Vec<Document>,
    limit: usize,
    /// Item currently being typed into, if a typing burst is open
    typing: Option<ItemId>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            typing: None,
        }
    }

    /// Record `doc` as an undo step. Clears redo and ends any typing burst.
    pub fn snapshot(&mut self, doc: &Document) {
        self.typing = None;
        self.push_undo(doc.clone());
        self.redo.clear();
    }

    /// Snapshot only if this is the first keystroke of a burst on `id`.
    /// Returns true if a snapshot was taken.
    pub fn begin_typing(&mut self, doc: &Document, id: ItemId) -> bool {
        if self.typing == Some(id) {
            return false;
        }
        self.snapshot(doc);
        self.typing = Some(id);
        true
    }

    /// Close the typing burst (blur, Enter, or an unrelated action).
    pub fn end_typing(&mut self) {
        self.typing = None;
    }

    pub fn typing(&self) -> Option<ItemId> {
        self.typing
    }

    /// Step back. Returns the restored document, or `None` if there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let prev = self.undo.pop()?;
        self.typing = None;
        self.redo.push(current.clone());
        Some(prev)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo.pop()?;
        self.typing = None;
        self.push_undo(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps available
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn push_undo(&mut self, doc: Document) {
        self.undo.push(doc);
        if self.undo.len() > self.limit {
            self.undo.drain(..self.undo.len() - self.limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document {
            edit: true,
            items: vec![Item::with_text(ItemId(1), text.into())],
        }
    }

    #[test]
    fn new_history_is_empty() {
        let h = History::default();
        assert!(h.is_empty());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut h = History::default();
        let d0 = doc("a");
        h.snapshot(&d0);
        let d1 = doc("b");

        let back = h.undo(&d1).unwrap();
        assert_eq!(back, d0);
        assert!(h.can_redo());

        let forward = h.redo(&back).unwrap();
        assert_eq!(forward, d1);
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn snapshot_after_undo_clears_redo() {
        let mut h = History::default();
        h.snapshot(&doc("a"));
        h.undo(&doc("b")).unwrap();
        h.snapshot(&doc("a"));
        assert!(h.redo(&doc("c")).is_none());
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut h = History::default();
        assert!(h.undo(&doc("a")).is_none());
        assert!(h.redo(&doc("a")).is_none());
        assert!(!h.can_redo());
    }

    #[test]
    fn limit_keeps_most_recent_snapshots() {
        let mut h = History::new(10);
        for i in 0..11 {
            h.snapshot(&doc(&i.to_string()));
        }
        assert_eq!(h.len(), 10);

        let mut current = doc("now");
        let mut restored = Vec::new();
        while let Some(prev) = h.undo(&current) {
            restored.push(prev.items[0].text.clone());
            current = prev;
        }
        assert_eq!(restored, vec!["10", "9", "8", "7", "6", "5", "4", "3", "2", "1"]);
    }

    #[test]
    fn typing_burst_is_one_undo_step() {
        let mut h = History::default();
        assert!(h.begin_typing(&doc(""), ItemId(1)));
        assert!(!h.begin_typing(&doc("m"), ItemId(1)));
        assert!(!h.begin_typing(&doc("mi"), ItemId(1)));
        assert_eq!(h.len(), 1);
        assert_eq!(h.undo(&doc("mil")).unwrap(), doc(""));
    }

    #[test]
    fn ending_or_switching_field_starts_new_step() {
        let mut h = History::default();
        h.begin_typing(&doc(""), ItemId(1));
        h.end_typing();
        assert!(h.begin_typing(&doc("a"), ItemId(1)));
        assert!(h.begin_typing(&doc("ab"), ItemId(2)));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn other_snapshots_end_typing() {
        let mut h = History::default();
        h.begin_typing(&doc(""), ItemId(1));
        h.snapshot(&doc("x"));
        assert_eq!(h.typing(), None);
        assert!(h.begin_typing(&doc("x"), ItemId(1)));
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        let mut h = History::new(0);
        h.snapshot(&doc("a"));
        h.snapshot(&doc("b"));
        assert_eq!(h.len(), 1);
    }
}
