use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::edit::session::Session;
use crate::io::store::MemoryStore;
use crate::model::{Config, Document, Item, ItemId};
use crate::tui::app::App;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(f).unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Items with ids 1.. in the given order, edit mode on
pub fn doc_with(texts: &[&str]) -> Document {
    Document {
        edit: true,
        items: texts
            .iter()
            .enumerate()
            .map(|(i, t)| Item::with_text(ItemId(i as u64 + 1), t.to_string()))
            .collect(),
    }
}

/// An app over an in-memory store, list drawn at rows 1..=4 of a 30-wide
/// screen.
pub fn app_with(texts: &[&str]) -> App<MemoryStore> {
    let config = Config::default();
    let session = Session::open(MemoryStore::with_document(doc_with(texts)), &config);
    let mut app = App::new(session, &config);
    app.list_area = Rect::new(0, 1, 30, 4);
    app
}
