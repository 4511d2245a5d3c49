use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::edit::drag::{DragUpdate, GesturePhase, RowGeometry, Viewport};
use crate::edit::session::Session;
use crate::io::store::{JsonFileStore, Store};
use crate::model::{Config, Item, ItemId};
use crate::util::unicode;

use super::input;
use super::render;
use super::theme::Theme;

/// Text field state while an item is being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: ItemId,
    pub buffer: String,
    /// Byte offset into `buffer`
    pub cursor: usize,
}

/// A press that may turn into a click on release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub id: ItemId,
    pub on_checkbox: bool,
}

/// Main application state
pub struct App<S: Store> {
    pub session: Session<S>,
    pub theme: Theme,
    /// Cursor index into the display list
    pub cursor: usize,
    /// First visible line of the list
    pub scroll: usize,
    pub editing: Option<EditState>,
    /// Set by the first `R`; a second press before this deadline resets
    pub reset_armed: Option<Instant>,
    pub reset_window: Duration,
    pub status: Option<String>,
    pub click: Option<Click>,
    /// Where the list was last drawn, for mouse hit-testing
    pub list_area: Rect,
    pub should_quit: bool,
}

impl<S: Store> App<S> {
    pub fn new(session: Session<S>, config: &Config) -> Self {
        App {
            session,
            theme: Theme::default(),
            cursor: 0,
            scroll: 0,
            editing: None,
            reset_armed: None,
            reset_window: Duration::from_millis(config.ui.reset_confirm_ms),
            status: None,
            click: None,
            list_area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn display_items(&self) -> Vec<Item> {
        self.session.display_items()
    }

    /// Id of the item under the cursor
    pub fn cursor_id(&self) -> Option<ItemId> {
        self.display_items().get(self.cursor).map(|i| i.id)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.display_items().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn move_cursor_to(&mut self, id: ItemId) {
        if let Some(pos) = self.display_items().iter().position(|i| i.id == id) {
            self.cursor = pos;
        }
    }

    /// Apply a pending focus request from the session. Returns the focused id.
    pub fn follow_focus(&mut self) -> Option<ItemId> {
        let id = self.session.take_focus()?;
        self.move_cursor_to(id);
        Some(id)
    }

    /// Open the text field on `id`, cursor at the end
    pub fn start_editing(&mut self, id: ItemId) {
        let Some(text) = self.session.document().get(id).map(|i| i.text.clone()) else {
            return;
        };
        self.move_cursor_to(id);
        self.editing = Some(EditState {
            id,
            cursor: text.len(),
            buffer: text,
        });
    }

    pub fn stop_editing(&mut self) {
        if self.editing.take().is_some() {
            self.session.end_typing();
        }
    }

    /// Push the edit buffer into the document as one keystroke
    pub fn sync_edit(&mut self) {
        if let Some(edit) = &self.editing {
            self.session.set_text(edit.id, &edit.buffer);
        }
    }

    /// Paste at the edit cursor. Extra lines become new items; editing moves
    /// to the last of them.
    pub fn paste(&mut self, text: &str) {
        let Some(edit) = self.editing.clone() else {
            return;
        };
        let at = unicode::char_index(&edit.buffer, edit.cursor);
        if !self.session.paste(edit.id, at, text) {
            return;
        }
        if let Some(id) = self.follow_focus() {
            self.session.end_typing();
            self.start_editing(id);
            return;
        }
        let first = text.split('\n').next().unwrap_or("");
        let first = first.strip_suffix('\r').unwrap_or(first);
        if let Some(item) = self.session.document().get(edit.id) {
            let buffer = item.text.clone();
            let cursor = unicode::byte_offset(&buffer, at + first.chars().count());
            self.editing = Some(EditState {
                id: edit.id,
                buffer,
                cursor,
            });
        }
    }

    /// Scroll container as the drag controller sees it
    pub fn viewport(&self) -> Viewport {
        Viewport {
            top: f64::from(self.list_area.y),
            height: f64::from(self.list_area.height),
            scroll: self.scroll as f64,
        }
    }

    /// Every row is one cell tall, laid out from the top of the content
    pub fn row_geometry(&self) -> Vec<RowGeometry> {
        self.display_items()
            .iter()
            .enumerate()
            .map(|(i, item)| RowGeometry {
                id: item.id,
                top: i as f64,
                height: 1.0,
            })
            .collect()
    }

    /// Item drawn at screen row `y`, if any
    pub fn item_at_row(&self, y: u16) -> Option<ItemId> {
        let area = self.list_area;
        if y < area.y || y >= area.y + area.height {
            return None;
        }
        let idx = usize::from(y - area.y) + self.scroll;
        self.display_items().get(idx).map(|i| i.id)
    }

    /// Number of list lines. While dragging the placeholder stands in for
    /// the dragged rows, so the count doesn't change.
    pub fn line_count(&self) -> usize {
        self.display_items().len()
    }

    pub fn scroll_by(&mut self, step: f64) {
        let height = usize::from(self.list_area.height);
        let max = self.line_count().saturating_sub(height);
        let step = step.round() as isize;
        self.scroll = self.scroll.saturating_add_signed(step).min(max);
    }

    /// Keep the cursor row on screen
    pub fn ensure_cursor_visible(&mut self) {
        let height = usize::from(self.list_area.height);
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }

    /// Timer work: drag long-press and auto-scroll, reset arm expiry.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(deadline) = self.reset_armed
            && now >= deadline
        {
            self.reset_armed = None;
            self.status = None;
        }
        let viewport = self.viewport();
        let update = self.session.tick(viewport, now);
        if let DragUpdate::Dragging {
            autoscroll: Some(step),
            ..
        } = update
        {
            self.scroll_by(step);
        }
    }
}

/// Run the TUI on the checklist at `data_path`
pub fn run(data_path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(data_path);
    let session = Session::open(store, config);
    let mut app = App::new(session, config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal if we panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<JsonFileStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // Short poll while a gesture is live so long-press and auto-scroll
        // keep moving without input.
        let timeout = if app.session.drag().phase() == GesturePhase::Idle {
            Duration::from_millis(250)
        } else {
            Duration::from_millis(50)
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key, Instant::now());
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, Instant::now()),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }
        app.on_tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    app.stop_editing();
    Ok(())
}
