// src/ports/terminal.rs
use crate::domain::{Note, NoteStatus};

/// Plain-text rendering of the note list for the terminal
#[derive(Debug, Default)]
pub struct TextPresenter;

impl TextPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn render_line(&self, note: &Note) -> String {
        let mark = match note.status {
            NoteStatus::InProgress => "[ ]",
            NoteStatus::Completed => "[x]",
        };
        let mut line = format!("{}\t{} {}", note.id, mark, note.name);
        if !note.description.is_empty() {
            line.push_str(&format!(" - {}", note.description));
        }
        if let Some(date) = &note.completion_date {
            line.push_str(&format!(" (due {date})"));
        }
        match (&note.resolved_image_url, note.has_image()) {
            (Some(url), _) => line.push_str(&format!("\n\timage: {url}")),
            (None, true) => line.push_str("\n\timage: <unavailable>"),
            (None, false) => {}
        }
        line
    }

    pub fn render(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes found".to_string();
        }
        notes
            .iter()
            .map(|n| self.render_line(n))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
