//! Pointer-driven drag-reorder.
//!
//! [`DragController`] turns a stream of pointer events into a live insertion
//! index and, on release, a [`DragCommit`]. It owns no rendering: the caller
//! draws a placeholder wherever [`DragController::insertion_index`] points and
//! applies the commit through the session.
//!
//! Geometry comes from the caller at press time, in content coordinates (row
//! tops measured from the top of the scrollable content). Pointer samples are
//! in screen coordinates and are projected into content space through the
//! [`Viewport`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::model::{Document, DragSettings, ItemId};

/// What produced a pointer event. Touch presses are noisier, so they start a
/// drag after less movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub at: Instant,
    pub kind: PointerKind,
}

/// One rendered row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub id: ItemId,
    /// Top edge in content coordinates
    pub top: f64,
    pub height: f64,
}

/// The scroll container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Screen y of the container's top edge
    pub top: f64,
    /// Visible height
    pub height: f64,
    /// Current scroll offset into the content
    pub scroll: f64,
}

impl Viewport {
    /// Project a screen y into content space
    pub fn to_content(&self, screen_y: f64) -> f64 {
        screen_y - self.top + self.scroll
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragConfig {
    pub mouse_threshold: f64,
    pub touch_threshold: f64,
    /// Holding still this long also starts a drag
    pub long_press: Duration,
    /// Gap between rows, counted into the dragged block's size
    pub row_spacing: f64,
    /// Distance from a viewport edge that triggers auto-scroll
    pub autoscroll_margin: f64,
    pub autoscroll_step: f64,
}

impl Default for DragConfig {
    /// Pixel-based tuning for pointer hosts
    fn default() -> Self {
        DragConfig {
            mouse_threshold: 6.0,
            touch_threshold: 3.0,
            long_press: Duration::from_millis(350),
            row_spacing: 0.0,
            autoscroll_margin: 40.0,
            autoscroll_step: 12.0,
        }
    }
}

impl DragConfig {
    /// Cell-based tuning for a terminal, where every row is one cell tall
    pub fn terminal() -> Self {
        DragConfig::from(&DragSettings::default())
    }

    fn threshold(&self, kind: PointerKind) -> f64 {
        match kind {
            PointerKind::Mouse => self.mouse_threshold,
            PointerKind::Touch => self.touch_threshold,
        }
    }
}

impl From<&DragSettings> for DragConfig {
    fn from(s: &DragSettings) -> Self {
        DragConfig {
            mouse_threshold: s.mouse_threshold,
            touch_threshold: s.touch_threshold,
            long_press: Duration::from_millis(s.long_press_ms),
            row_spacing: s.row_spacing,
            autoscroll_margin: s.autoscroll_margin,
            autoscroll_step: s.autoscroll_step,
        }
    }
}

/// Why a press did not start a gesture
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PressRejected {
    #[error("dragging is only possible in edit mode")]
    NotEditing,
    #[error("another gesture is already in progress")]
    Busy,
    #[error("item not found: {0}")]
    UnknownItem(ItemId),
    #[error("checked items cannot be moved: {0}")]
    CheckedItem(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Pressed,
    Dragging,
}

/// Outcome of a pointer-move or timer tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No gesture in progress
    Idle,
    /// Pressed, still below the drag threshold
    Pending,
    /// Dragging. `started` is true on the step that crossed the threshold.
    Dragging {
        index: usize,
        started: bool,
        /// Scroll delta the caller should apply to the container
        autoscroll: Option<f64>,
    },
    /// A dragged item vanished from the document; the gesture is gone
    Abandoned,
}

/// A finished drag: move `ids` to `slot` among the remaining unchecked items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragCommit {
    pub ids: Vec<ItemId>,
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// Nothing was pressed
    Ignored,
    /// Released before the threshold: a plain click on `id`
    Tap { id: ItemId },
    /// Released while dragging
    Commit(DragCommit),
    /// A dragged item vanished before release
    Abandoned,
}

impl Release {
    /// Whether the click event under the pointer must be swallowed
    pub fn suppresses_click(&self) -> bool {
        matches!(self, Release::Commit(_) | Release::Abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone)]
struct Press {
    id: ItemId,
    start: PointerSample,
    grab_offset: f64,
    drag_set: Vec<ItemId>,
    rows: Vec<RowGeometry>,
}

#[derive(Debug, Clone)]
struct Drag {
    drag_set: Vec<ItemId>,
    /// Non-dragged unchecked rows, display order
    remaining: Vec<RowGeometry>,
    /// Content y where the first unchecked row starts
    list_top: f64,
    unit: f64,
    index: usize,
    grab_offset: f64,
    last_y: f64,
    direction: Direction,
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Pressed(Press),
    Dragging(Drag),
}

/// Single-pointer drag state machine
#[derive(Debug, Clone, Default)]
pub struct DragController {
    config: DragConfig,
    gesture: Gesture,
    suppress_click: bool,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        DragController {
            config,
            gesture: Gesture::Idle,
            suppress_click: false,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn phase(&self) -> GesturePhase {
        match self.gesture {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Pressed(_) => GesturePhase::Pressed,
            Gesture::Dragging(_) => GesturePhase::Dragging,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging(_))
    }

    /// Where the placeholder goes, among non-dragged unchecked rows
    pub fn insertion_index(&self) -> Option<usize> {
        match &self.gesture {
            Gesture::Dragging(d) => Some(d.index),
            _ => None,
        }
    }

    pub fn drag_set(&self) -> &[ItemId] {
        match &self.gesture {
            Gesture::Idle => &[],
            Gesture::Pressed(p) => &p.drag_set,
            Gesture::Dragging(d) => &d.drag_set,
        }
    }

    /// Combined height of the dragged rows (placeholder size)
    pub fn unit_size(&self) -> Option<f64> {
        match &self.gesture {
            Gesture::Dragging(d) => Some(d.unit),
            _ => None,
        }
    }

    /// Pointer distance from the top of the pressed row
    pub fn grab_offset(&self) -> Option<f64> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Pressed(p) => Some(p.grab_offset),
            Gesture::Dragging(d) => Some(d.grab_offset),
        }
    }

    /// When a stationary press turns into a drag
    pub fn long_press_deadline(&self) -> Option<Instant> {
        match &self.gesture {
            Gesture::Pressed(p) => Some(p.start.at + self.config.long_press),
            _ => None,
        }
    }

    /// True while a press is armed to swallow its click
    pub fn suppress_click(&self) -> bool {
        self.suppress_click
    }

    /// Pointer down on item `id`.
    ///
    /// `rows` is the rendered list in display order.
    pub fn press(
        &mut self,
        doc: &Document,
        rows: &[RowGeometry],
        viewport: Viewport,
        id: ItemId,
        sample: PointerSample,
    ) -> Result<(), PressRejected> {
        if !matches!(self.gesture, Gesture::Idle) {
            return Err(PressRejected::Busy);
        }
        if !doc.edit {
            return Err(PressRejected::NotEditing);
        }
        let item = doc.get(id).ok_or(PressRejected::UnknownItem(id))?;
        if item.checked {
            return Err(PressRejected::CheckedItem(id));
        }
        let row = rows
            .iter()
            .find(|r| r.id == id)
            .ok_or(PressRejected::UnknownItem(id))?;

        let selected = doc.selected_ids();
        let drag_set = if item.selected && selected.len() > 1 {
            selected
        } else {
            vec![id]
        };

        self.gesture = Gesture::Pressed(Press {
            id,
            start: sample,
            grab_offset: viewport.to_content(sample.y) - row.top,
            drag_set,
            rows: rows.to_vec(),
        });
        self.suppress_click = true;
        tracing::debug!(%id, "drag pressed");
        Ok(())
    }

    /// Pointer moved
    pub fn pointer_move(
        &mut self,
        doc: &Document,
        viewport: Viewport,
        sample: PointerSample,
    ) -> DragUpdate {
        if !self.drag_set_present(doc) {
            return self.abandon();
        }
        let started = match &self.gesture {
            Gesture::Idle => return DragUpdate::Idle,
            Gesture::Pressed(p) => {
                let moved = (sample.x - p.start.x).hypot(sample.y - p.start.y);
                let held = sample.at.saturating_duration_since(p.start.at) >= self.config.long_press;
                if moved <= self.config.threshold(sample.kind) && !held {
                    return DragUpdate::Pending;
                }
                true
            }
            Gesture::Dragging(_) => false,
        };
        if started {
            self.start_drag(doc);
        }

        let config = &self.config;
        let Gesture::Dragging(drag) = &mut self.gesture else {
            return DragUpdate::Idle;
        };
        if sample.y > drag.last_y {
            drag.direction = Direction::Down;
        } else if sample.y < drag.last_y {
            drag.direction = Direction::Up;
        }
        drag.last_y = sample.y;
        drag.index = probe_index(drag, viewport.to_content(sample.y), config.row_spacing);

        DragUpdate::Dragging {
            index: drag.index,
            started,
            autoscroll: autoscroll(config, viewport, sample.y),
        }
    }

    /// Timer tick: fires the long-press transition and keeps auto-scroll
    /// going while the pointer rests near an edge.
    pub fn tick(&mut self, doc: &Document, viewport: Viewport, now: Instant) -> DragUpdate {
        if !self.drag_set_present(doc) {
            return self.abandon();
        }
        match self.phase() {
            GesturePhase::Idle => DragUpdate::Idle,
            GesturePhase::Pressed => {
                let due = self.long_press_deadline().is_some_and(|deadline| now >= deadline);
                if !due {
                    return DragUpdate::Pending;
                }
                self.start_drag(doc);
                DragUpdate::Dragging {
                    index: self.insertion_index().unwrap_or(0),
                    started: true,
                    autoscroll: None,
                }
            }
            GesturePhase::Dragging => {
                let config = &self.config;
                let Gesture::Dragging(drag) = &mut self.gesture else {
                    return DragUpdate::Idle;
                };
                let scroll = autoscroll(config, viewport, drag.last_y);
                if scroll.is_some() {
                    drag.index =
                        probe_index(drag, viewport.to_content(drag.last_y), config.row_spacing);
                }
                DragUpdate::Dragging {
                    index: drag.index,
                    started: false,
                    autoscroll: scroll,
                }
            }
        }
    }

    /// Pointer up
    pub fn release(&mut self, doc: &Document) -> Release {
        if !self.drag_set_present(doc) {
            self.abandon();
            return Release::Abandoned;
        }
        let release = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Release::Ignored,
            Gesture::Pressed(p) => Release::Tap { id: p.id },
            Gesture::Dragging(d) => {
                tracing::debug!(ids = ?d.drag_set, slot = d.index, "drag committed");
                Release::Commit(DragCommit {
                    ids: d.drag_set,
                    slot: d.index,
                })
            }
        };
        self.suppress_click = release.suppresses_click();
        release
    }

    /// Pointer cancelled by the system. Returns true if a gesture was live.
    pub fn cancel(&mut self) -> bool {
        let was_active = !matches!(self.gesture, Gesture::Idle);
        self.gesture = Gesture::Idle;
        self.suppress_click = false;
        if was_active {
            tracing::debug!("drag cancelled");
        }
        was_active
    }

    /// Forget the click guard once the caller has swallowed the click
    pub fn clear_click_guard(&mut self) {
        self.suppress_click = false;
    }

    fn drag_set_present(&self, doc: &Document) -> bool {
        self.drag_set().iter().all(|id| doc.contains(*id))
    }

    fn abandon(&mut self) -> DragUpdate {
        tracing::debug!(ids = ?self.drag_set(), "drag abandoned, item vanished");
        self.gesture = Gesture::Idle;
        self.suppress_click = false;
        DragUpdate::Abandoned
    }

    fn start_drag(&mut self, doc: &Document) {
        let Gesture::Pressed(press) = std::mem::take(&mut self.gesture) else {
            return;
        };
        let dragged: HashSet<ItemId> = press.drag_set.iter().copied().collect();
        let unchecked = |r: &&RowGeometry| doc.get(r.id).is_some_and(|i| !i.checked);

        let list_top = press
            .rows
            .iter()
            .filter(unchecked)
            .map(|r| r.top)
            .fold(f64::INFINITY, f64::min);
        let unit: f64 = press
            .rows
            .iter()
            .filter(|r| dragged.contains(&r.id))
            .map(|r| r.height + self.config.row_spacing)
            .sum();
        let first_dragged = press
            .rows
            .iter()
            .position(|r| dragged.contains(&r.id))
            .unwrap_or(0);
        let index = press.rows[..first_dragged]
            .iter()
            .filter(unchecked)
            .count();
        let remaining = press
            .rows
            .iter()
            .filter(unchecked)
            .filter(|r| !dragged.contains(&r.id))
            .copied()
            .collect();

        tracing::debug!(ids = ?press.drag_set, unit, index, "drag started");
        self.gesture = Gesture::Dragging(Drag {
            drag_set: press.drag_set,
            remaining,
            list_top: if list_top.is_finite() { list_top } else { 0.0 },
            unit,
            index,
            grab_offset: press.grab_offset,
            last_y: press.start.y,
            direction: Direction::Down,
        });
    }
}

/// Lay the remaining rows out with the placeholder at the current index and
/// find where the probe falls.
///
/// Moving down, a row is passed once the probe reaches its top edge; moving
/// up, once the probe rises above its midpoint. The gap between the two
/// keeps the index from flipping back and forth at a row boundary.
fn probe_index(drag: &Drag, probe: f64, spacing: f64) -> usize {
    let mut y = drag.list_top;
    for (i, row) in drag.remaining.iter().enumerate() {
        if i == drag.index {
            y += drag.unit;
        }
        let threshold = match drag.direction {
            Direction::Down => y,
            Direction::Up => y + row.height / 2.0,
        };
        if probe < threshold {
            return i;
        }
        y += row.height + spacing;
    }
    drag.remaining.len()
}

fn autoscroll(config: &DragConfig, viewport: Viewport, screen_y: f64) -> Option<f64> {
    if viewport.height <= 0.0 {
        return None;
    }
    if screen_y < viewport.top + config.autoscroll_margin && viewport.scroll > 0.0 {
        Some(-config.autoscroll_step)
    } else if screen_y >= viewport.top + viewport.height - config.autoscroll_margin {
        Some(config.autoscroll_step)
    } else {
        None
    }
}
