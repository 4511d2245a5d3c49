use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::io::store::Store;
use crate::model::{Item, ItemId};
use crate::util::unicode;

use super::app::App;

/// Width of the handle, selection marker and checkbox columns before the text
pub const TEXT_COL: u16 = 6;
/// Columns (relative to the list) where a click toggles the checkbox
pub const CHECKBOX_COLS: std::ops::Range<u16> = 2..5;

const EDIT_HINTS: &str = "space check  i edit  o new  d delete  e done";
const CHECK_HINTS: &str = "space check  e edit  u undo  q quit";
const EDITING_HINTS: &str = "enter next  esc done";

/// One line of the list area
#[derive(Debug, Clone, PartialEq)]
enum ListLine {
    Item { item: Item, cursor: bool },
    Placeholder,
}

/// Main render function
pub fn render<S: Store>(frame: &mut Frame, app: &mut App<S>) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.theme.base()), area);

    // header | list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    app.list_area = chunks[1];
    app.clamp_cursor();
    if !app.session.drag().is_dragging() {
        app.ensure_cursor_visible();
    }

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_status_row(frame, app, chunks[2]);
}

fn render_header<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let doc = app.session.document();
    let bg = app.theme.background;
    let mode = if doc.edit { "edit" } else { "check" };
    let line = Line::from(vec![
        Span::styled(
            "tick",
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", mode), Style::default().fg(app.theme.text).bg(bg)),
        Span::styled(
            format!("  {} left", doc.unchecked_count()),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Lines in drawing order. While dragging, the dragged rows are lifted out
/// and a placeholder of the same height sits at the insertion index.
fn list_lines<S: Store>(app: &App<S>) -> Vec<ListLine> {
    let items = app.display_items();
    let drag = app.session.drag();
    let Some(index) = drag.insertion_index() else {
        return items
            .into_iter()
            .enumerate()
            .map(|(i, item)| ListLine::Item {
                item,
                cursor: i == app.cursor,
            })
            .collect();
    };

    let dragged: HashSet<ItemId> = drag.drag_set().iter().copied().collect();
    let height = drag
        .unit_size()
        .map_or(dragged.len(), |u| u.round().max(1.0) as usize);
    let (unchecked, checked): (Vec<Item>, Vec<Item>) = items
        .into_iter()
        .filter(|i| !dragged.contains(&i.id))
        .partition(|i| !i.checked);

    let mut lines: Vec<ListLine> = unchecked
        .into_iter()
        .map(|item| ListLine::Item {
            item,
            cursor: false,
        })
        .collect();
    let at = index.min(lines.len());
    lines.splice(at..at, std::iter::repeat_n(ListLine::Placeholder, height));
    lines.extend(checked.into_iter().map(|item| ListLine::Item {
        item,
        cursor: false,
    }));
    lines
}

fn render_list<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let lines = list_lines(app);
    let edit_mode = app.session.document().edit;
    let width = area.width as usize;
    let theme = &app.theme;

    for (row, line) in lines
        .iter()
        .skip(app.scroll)
        .take(area.height as usize)
        .enumerate()
    {
        let rect = Rect::new(area.x, area.y + row as u16, area.width, 1);
        let rendered = match line {
            ListLine::Placeholder => Line::from(Span::styled(
                format!("  {}", "\u{254C}".repeat(width.saturating_sub(2))),
                Style::default().fg(theme.placeholder).bg(theme.background),
            )),
            ListLine::Item { item, cursor } => {
                let editing = app.editing.as_ref().filter(|e| e.id == item.id);
                let text = editing.map_or(item.text.as_str(), |e| e.buffer.as_str());
                let row_style = theme.item_style(item.checked, *cursor);
                let handle = if edit_mode && !item.checked { "\u{2261}" } else { " " };
                let marker = if item.selected { "\u{2022}" } else { " " };
                let checkbox = if item.checked { "[x]" } else { "[ ]" };

                if let Some(edit) = editing {
                    let col = unicode::display_col(&edit.buffer, edit.cursor) as u16;
                    let x = (area.x + TEXT_COL + col).min(area.x + area.width.saturating_sub(1));
                    frame.set_cursor_position(Position::new(x, rect.y));
                }

                let budget = width.saturating_sub(TEXT_COL as usize);
                Line::from(vec![
                    Span::styled(handle, Style::default().fg(theme.dim)),
                    Span::styled(marker, Style::default().fg(theme.highlight)),
                    Span::styled(checkbox, theme.checkbox_style(item.checked)),
                    Span::raw(" "),
                    Span::styled(unicode::truncate_to_width(text, budget), row_style),
                ])
                .style(Style::default().bg(if *cursor {
                    theme.selection_bg
                } else {
                    theme.background
                }))
            }
        };
        frame.render_widget(Paragraph::new(rendered), rect);
    }
}

fn render_status_row<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let bg = app.theme.background;
    let (text, fg) = match &app.status {
        Some(message) => (message.as_str(), app.theme.text_bright),
        None if app.editing.is_some() => (EDITING_HINTS, app.theme.dim),
        None if app.session.document().edit => (EDIT_HINTS, app.theme.dim),
        None => (CHECK_HINTS, app.theme.dim),
    };
    let line = Line::from(Span::styled(
        unicode::truncate_to_width(text, area.width as usize),
        Style::default().fg(fg).bg(bg),
    ));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}
