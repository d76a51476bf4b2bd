// src/ports/html.rs
use crate::domain::{Note, NoteStatus};
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    fn render_card(&self, note: &Note) -> String {
        let image = match &note.resolved_image_url {
            Some(url) => format!(
                r#"<img src="{}" alt="visual aid for {}">"#,
                encode_double_quoted_attribute(url),
                encode_double_quoted_attribute(&note.name)
            ),
            None => String::new(),
        };
        let status_class = match note.status {
            NoteStatus::InProgress => "in-progress",
            NoteStatus::Completed => "completed",
        };

        format!(
            r#"        <div class="card">
            {image}
            <div class="body">
                <strong>{name}</strong>
                <span>{description}</span>
                <span class="status {status_class}">{status}</span>
                <span class="due">{due}</span>
                <span class="id">{id}</span>
            </div>
        </div>
"#,
            image = image,
            name = encode_text(&note.name),
            description = encode_text(&note.description),
            status_class = status_class,
            status = note.status,
            due = encode_text(note.completion_date.as_deref().unwrap_or("")),
            id = encode_text(&note.id),
        )
    }

    #[instrument(level = "debug", skip_all, fields(count = notes.len()))]
    pub fn render(&self, notes: &[Note]) -> String {
        let cards = if notes.is_empty() {
            r#"        <p class="empty">No notes yet</p>
"#
            .to_string()
        } else {
            notes.iter().map(|n| self.render_card(n)).collect()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Personal Notes</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .card {{
            display: flex;
            gap: 1.5rem;
            background: white;
            border-radius: 8px;
            padding: 1.5rem;
            margin-bottom: 1rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        .card img {{
            width: 200px;
            height: 200px;
            object-fit: cover;
        }}
        .body {{
            display: flex;
            flex-direction: column;
        }}
        .status.completed {{
            color: #2e7d32;
        }}
        .status.in-progress {{
            color: #b26a00;
        }}
        .id {{
            font-size: 0.8em;
            color: #666;
        }}
    </style>
</head>
<body>
    <h1>Personal Notes</h1>
    <h3>Note list</h3>
    <div class="notes">
{cards}    </div>
</body>
</html>"#,
            cards = cards
        )
    }
}
