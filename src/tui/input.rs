use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::edit::drag::{DragUpdate, PointerKind, PointerSample};
use crate::io::store::Store;
use crate::model::ItemId;
use crate::util::unicode;

use super::app::{App, Click};
use super::render::CHECKBOX_COLS;

/// Shift+letter arrives as a lowercase char on some terminals
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

/// Handle a key press
pub fn handle_key<S: Store>(app: &mut App<S>, key: KeyEvent, now: Instant) {
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);
    if app.editing.is_some() {
        handle_edit_key(app, key);
    } else {
        handle_navigate(app, key, now);
    }
    app.clamp_cursor();
}

fn handle_navigate<S: Store>(app: &mut App<S>, key: KeyEvent, now: Instant) {
    if key.code != KeyCode::Char('R') && app.reset_armed.take().is_some() {
        app.status = None;
    }
    let edit_mode = app.session.document().edit;

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Esc) => {
            app.session.cancel_drag();
            app.session.clear_selection();
            app.status = None;
        }
        (_, KeyCode::Down | KeyCode::Char('j')) => {
            app.cursor = app.cursor.saturating_add(1);
        }
        (_, KeyCode::Up | KeyCode::Char('k')) => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        (_, KeyCode::Home | KeyCode::Char('g')) => app.cursor = 0,
        (_, KeyCode::End | KeyCode::Char('G')) => app.cursor = usize::MAX,
        (_, KeyCode::Char(' ')) => {
            if let Some(id) = app.cursor_id() {
                app.session.toggle_checked(id);
            }
        }
        (_, KeyCode::Char('e')) => {
            app.session.toggle_edit_mode();
        }
        (m, KeyCode::Char('r')) if m.contains(KeyModifiers::CONTROL) => {
            if !app.session.redo() {
                app.status = Some("nothing to redo".into());
            }
        }
        (_, KeyCode::Char('u')) => {
            if !app.session.undo() {
                app.status = Some("nothing to undo".into());
            }
        }
        (_, KeyCode::Char('R')) => match app.reset_armed.take() {
            Some(deadline) if now < deadline => {
                app.session.reset();
                app.follow_focus();
                app.status = Some("list reset".into());
            }
            _ => {
                app.reset_armed = Some(now + app.reset_window);
                app.status = Some("press R again to reset".into());
            }
        },
        (_, KeyCode::Enter) if !edit_mode => {
            if let Some(id) = app.cursor_id() {
                app.session.toggle_checked(id);
            }
        }
        (_, KeyCode::Char('i' | 'o' | 'd' | 's')) if !edit_mode => {
            app.status = Some("press e for edit mode".into());
        }
        (_, KeyCode::Char('i') | KeyCode::Enter) => {
            if let Some(id) = app.cursor_id() {
                app.start_editing(id);
            }
        }
        (_, KeyCode::Char('o')) => {
            if let Some(id) = app.cursor_id() {
                insert_and_edit(app, id);
            }
        }
        (_, KeyCode::Char('d')) => {
            if let Some(id) = app.cursor_id() {
                app.session.delete(id);
            }
        }
        (_, KeyCode::Char('s')) => {
            if let Some(id) = app.cursor_id() {
                app.session.toggle_selected(id);
            }
        }
        _ => {}
    }
}

/// New blank item after `after`, then start typing into it
fn insert_and_edit<S: Store>(app: &mut App<S>, after: ItemId) {
    if app.session.insert_after(after).is_some()
        && let Some(id) = app.follow_focus()
    {
        app.start_editing(id);
    }
}

fn handle_edit_key<S: Store>(app: &mut App<S>, key: KeyEvent) {
    let Some(edit) = app.editing.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Enter => {
            let id = edit.id;
            app.stop_editing();
            insert_and_edit(app, id);
        }
        KeyCode::Left => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = unicode::next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = next;
            }
        }
        KeyCode::Home => edit.cursor = 0,
        KeyCode::End => edit.cursor = edit.buffer.len(),
        KeyCode::Backspace => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(prev..edit.cursor, "");
                edit.cursor = prev;
                app.sync_edit();
            }
        }
        KeyCode::Delete => {
            if let Some(next) = unicode::next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(edit.cursor..next, "");
                app.sync_edit();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit.buffer.insert(edit.cursor, c);
            edit.cursor += c.len_utf8();
            app.sync_edit();
        }
        _ => {}
    }
}

/// Handle a bracketed paste. Only the open text field takes pastes.
pub fn handle_paste<S: Store>(app: &mut App<S>, text: &str) {
    if app.editing.is_none() {
        app.status = Some("press i to edit, then paste".into());
        return;
    }
    app.paste(text);
}

/// Left button down/drag/up drive the drag controller; the wheel scrolls.
pub fn handle_mouse<S: Store>(app: &mut App<S>, mouse: MouseEvent, now: Instant) {
    let sample = PointerSample {
        x: f64::from(mouse.column) + 0.5,
        y: f64::from(mouse.row) + 0.5,
        at: now,
        kind: PointerKind::Mouse,
    };
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.stop_editing();
            let Some(id) = app.item_at_row(mouse.row) else {
                return;
            };
            let col = mouse.column.saturating_sub(app.list_area.x);
            let on_checkbox = CHECKBOX_COLS.contains(&col);
            app.move_cursor_to(id);
            app.click = Some(Click { id, on_checkbox });
            if !on_checkbox {
                let rows = app.row_geometry();
                let viewport = app.viewport();
                if let Err(e) = app.session.press(&rows, viewport, id, sample) {
                    tracing::debug!(%id, reason = %e, "press did not start a gesture");
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let viewport = app.viewport();
            if let DragUpdate::Dragging {
                autoscroll: Some(step),
                ..
            } = app.session.pointer_move(viewport, sample)
            {
                app.scroll_by(step);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let release = app.session.release();
            let click = app.click.take();
            if release.suppresses_click() {
                app.follow_focus();
            } else if let Some(click) = click
                && click.on_checkbox
            {
                app.session.toggle_checked(click.id);
            }
            app.session.clear_click_guard();
        }
        MouseEventKind::ScrollDown => app.scroll_by(1.0),
        MouseEventKind::ScrollUp => app.scroll_by(-1.0),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::tui::test_helpers::app_with;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn key(app: &mut App<MemoryStore>, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn typed(app: &mut App<MemoryStore>, s: &str) {
        for c in s.chars() {
            key(app, KeyCode::Char(c));
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn texts(app: &App<MemoryStore>) -> Vec<String> {
        app.display_items().into_iter().map(|i| i.text).collect()
    }

    #[test]
    fn cursor_moves_and_stays_in_bounds() {
        let mut app = app_with(&["a", "b"]);
        key(&mut app, KeyCode::Char('j'));
        key(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, 1);
        key(&mut app, KeyCode::Char('k'));
        key(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn space_checks_item_under_cursor() {
        let mut app = app_with(&["a", "b"]);
        key(&mut app, KeyCode::Char(' '));
        assert_eq!(texts(&app), vec!["b", "a"]);
        assert!(app.session.document().get(ItemId(1)).unwrap().checked);
    }

    #[test]
    fn typing_is_one_undo_step() {
        let mut app = app_with(&["milk"]);
        key(&mut app, KeyCode::Char('i'));
        typed(&mut app, " x");
        key(&mut app, KeyCode::Backspace);
        typed(&mut app, "2");
        key(&mut app, KeyCode::Esc);
        assert!(app.editing.is_none());
        assert_eq!(texts(&app), vec!["milk 2"]);

        key(&mut app, KeyCode::Char('u'));
        assert_eq!(texts(&app), vec!["milk"]);
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert_eq!(texts(&app), vec!["milk 2"]);
    }

    #[test]
    fn enter_while_editing_opens_next_item() {
        let mut app = app_with(&["a", "c"]);
        key(&mut app, KeyCode::Enter);
        key(&mut app, KeyCode::Enter);
        typed(&mut app, "b");
        key(&mut app, KeyCode::Esc);
        assert_eq!(texts(&app), vec!["a", "b", "c"]);
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn cursor_editing_handles_multibyte_text() {
        let mut app = app_with(&["añ"]);
        key(&mut app, KeyCode::Char('i'));
        key(&mut app, KeyCode::Left);
        typed(&mut app, "x");
        key(&mut app, KeyCode::Delete);
        key(&mut app, KeyCode::Home);
        typed(&mut app, ">");
        assert_eq!(app.editing.as_ref().unwrap().buffer, ">ax");
    }

    #[test]
    fn check_mode_refuses_structural_edits() {
        let mut app = app_with(&["a", "b"]);
        key(&mut app, KeyCode::Char('e'));
        key(&mut app, KeyCode::Char('d'));
        assert_eq!(texts(&app), vec!["a", "b"]);
        assert_eq!(app.status.as_deref(), Some("press e for edit mode"));
        key(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["b", "a"]);
    }

    #[test]
    fn delete_and_insert_in_edit_mode() {
        let mut app = app_with(&["a", "b"]);
        key(&mut app, KeyCode::Char('d'));
        assert_eq!(texts(&app), vec!["b"]);
        key(&mut app, KeyCode::Char('o'));
        assert!(app.editing.is_some());
        key(&mut app, KeyCode::Esc);
        assert_eq!(texts(&app), vec!["b", ""]);
    }

    #[test]
    fn reset_needs_two_presses_in_window() {
        let mut app = app_with(&["a", "b"]);
        let t = Instant::now();
        let shift_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::SHIFT);
        handle_key(&mut app, shift_r, t);
        assert_eq!(texts(&app), vec!["a", "b"]);
        handle_key(&mut app, shift_r, t + Duration::from_secs(5));
        assert_eq!(texts(&app), vec!["a", "b"]);
        handle_key(&mut app, shift_r, t + Duration::from_secs(6));
        assert_eq!(texts(&app), vec![""]);
    }

    #[test]
    fn other_key_disarms_reset() {
        let mut app = app_with(&["a"]);
        let t = Instant::now();
        let r = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::NONE);
        handle_key(&mut app, r, t);
        key(&mut app, KeyCode::Char('j'));
        handle_key(&mut app, r, t);
        assert_eq!(texts(&app), vec!["a"]);
    }

    #[test]
    fn paste_outside_editing_is_ignored() {
        let mut app = app_with(&["a"]);
        handle_paste(&mut app, "x\ny");
        assert_eq!(texts(&app), vec!["a"]);
        assert!(app.status.is_some());
    }

    #[test]
    fn click_on_checkbox_toggles() {
        let mut app = app_with(&["a", "b"]);
        let t = Instant::now();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 1), t);
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 3, 1), t);
        assert_eq!(texts(&app), vec!["b", "a"]);
    }

    #[test]
    fn click_on_text_only_moves_cursor() {
        let mut app = app_with(&["a", "b"]);
        let t = Instant::now();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 10, 2), t);
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 10, 2), t);
        assert_eq!(texts(&app), vec!["a", "b"]);
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn mouse_drag_reorders() {
        let mut app = app_with(&["a", "b", "c"]);
        let t = Instant::now();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 10, 1), t);
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Drag(MouseButton::Left), 10, 3),
            t + Duration::from_millis(20),
        );
        assert_eq!(app.session.drag().insertion_index(), Some(2));
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 3),
            t + Duration::from_millis(40),
        );
        assert_eq!(texts(&app), vec!["b", "c", "a"]);
        assert_eq!(app.cursor, 2);
        assert!(!app.session.drag().suppress_click());
    }

    #[test]
    fn drag_released_over_checkbox_does_not_toggle() {
        let mut app = app_with(&["a", "b", "c"]);
        let t = Instant::now();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 10, 1), t);
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Drag(MouseButton::Left), 3, 3),
            t + Duration::from_millis(20),
        );
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), 3, 3),
            t + Duration::from_millis(40),
        );
        assert!(app.session.document().items.iter().all(|i| !i.checked));
    }

    #[test]
    fn no_drag_in_check_mode() {
        let mut app = app_with(&["a", "b", "c"]);
        key(&mut app, KeyCode::Char('e'));
        let t = Instant::now();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 10, 1), t);
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Drag(MouseButton::Left), 10, 3),
            t + Duration::from_millis(20),
        );
        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 3),
            t + Duration::from_millis(40),
        );
        assert_eq!(texts(&app), vec!["a", "b", "c"]);
    }
}
