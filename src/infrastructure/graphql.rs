// src/infrastructure/graphql.rs
use crate::application::NoteRepository;
use crate::domain::{DomainError, NewNote, Note, NoteStatus, StatusUpdate};
use crate::infrastructure::config::ApiConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const NOTE_FIELDS: &str = "id name description image completionDate status createdAt updatedAt";

pub fn list_notes_query() -> String {
    format!("query ListNotes {{ listNotes {{ items {{ {NOTE_FIELDS} }} }} }}")
}

pub fn create_note_mutation() -> String {
    format!(
        "mutation CreateNote($input: CreateNoteInput!) {{ createNote(input: $input) {{ {NOTE_FIELDS} }} }}"
    )
}

pub fn update_note_mutation() -> String {
    format!(
        "mutation UpdateNote($input: UpdateNoteInput!) {{ updateNote(input: $input) {{ {NOTE_FIELDS} }} }}"
    )
}

pub fn delete_note_mutation() -> String {
    "mutation DeleteNote($input: DeleteNoteInput!) { deleteNote(input: $input) { id } }".to_string()
}

/// Note as it travels over the wire. `image` holds the stored key only.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub completion_date: Option<String>,
    pub status: NoteStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Note {
            id: record.id,
            name: record.name,
            description: record.description,
            completion_date: record.completion_date.filter(|d| !d.is_empty()),
            status: record.status,
            image_key: record.image.filter(|k| !k.is_empty()),
            resolved_image_url: None,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListNotesData {
    list_notes: ItemPage,
}

#[derive(Debug, Deserialize)]
struct ItemPage {
    // Items the resolver could not read come back as null
    items: Vec<Option<NoteRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteData {
    create_note: NoteRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateNoteData {
    update_note: NoteRecord,
}

pub fn create_variables(input: &NewNote) -> Value {
    json!({
        "input": {
            "name": input.name,
            "description": input.description,
            "completionDate": input.completion_date,
            "image": input.image_key,
            "status": input.status,
        }
    })
}

pub fn update_variables(input: &StatusUpdate) -> Value {
    json!({ "input": { "id": input.id, "status": input.status } })
}

pub fn delete_variables(id: &str) -> Value {
    json!({ "input": { "id": id } })
}

/// Unwrap a GraphQL response body into its `data`, turning `errors` into a failure
/// Convert a `listNotes` page, skipping the null entries the API may return
fn notes_from_page(items: Vec<Option<NoteRecord>>) -> Vec<Note> {
    let total = items.len();
    let notes: Vec<Note> = items.into_iter().flatten().map(Note::from).collect();
    let dropped = total - notes.len();
    if dropped > 0 {
        warn!(dropped, "listNotes returned null items; skipping them");
    }
    notes
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, DomainError> {
    let response: GraphQlResponse<T> = serde_json::from_str(body)
        .map_err(|e| DomainError::Remote(format!("invalid GraphQL response: {e}")))?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(DomainError::Remote(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| DomainError::Remote("GraphQL response carried no data".to_string()))
}

/// Notes API backed by the managed GraphQL endpoint
pub struct GraphQlNoteRepository {
    endpoint: String,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl GraphQlNoteRepository {
    pub fn new(config: &ApiConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
            headers: auth_headers(config)?,
        })
    }

    #[instrument(level = "debug", skip(self, query, variables))]
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, DomainError> {
        let request = GraphQlRequest { query, variables };
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Remote(format!("{operation} read body failed: {e}")))?;
        debug!(%status, bytes = body.len(), "GraphQL response");

        if !status.is_success() {
            return Err(DomainError::Remote(format!(
                "{operation} failed with HTTP {status}: {body}"
            )));
        }

        parse_response(&body)
    }
}

pub fn auth_headers(config: &ApiConfig) -> Result<HeaderMap, DomainError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = &config.api_key {
        let value = HeaderValue::from_str(key)
            .map_err(|e| DomainError::Config(format!("invalid api key: {e}")))?;
        headers.insert("x-api-key", value);
    }
    if let Some(token) = &config.auth_token {
        let mut value = HeaderValue::from_str(token)
            .map_err(|e| DomainError::Config(format!("invalid auth token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[async_trait]
impl NoteRepository for GraphQlNoteRepository {
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        let data: ListNotesData = self
            .execute("listNotes", &list_notes_query(), json!({}))
            .await?;
        Ok(notes_from_page(data.list_notes.items))
    }

    async fn create_note(&self, input: &NewNote) -> Result<Note, DomainError> {
        let data: CreateNoteData = self
            .execute("createNote", &create_note_mutation(), create_variables(input))
            .await?;
        Ok(data.create_note.into())
    }

    async fn update_note(&self, input: &StatusUpdate) -> Result<Note, DomainError> {
        let data: UpdateNoteData = self
            .execute("updateNote", &update_note_mutation(), update_variables(input))
            .await?;
        Ok(data.update_note.into())
    }

    async fn delete_note(&self, id: &str) -> Result<(), DomainError> {
        // Only errors matter; the payload is not used
        let _: IgnoredAny = self
            .execute("deleteNote", &delete_note_mutation(), delete_variables(id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_list_response_when_parsing_then_maps_records_to_notes() {
        let body = r#"{"data":{"listNotes":{"items":[
            {"id":"1","name":"a","description":"d","image":"a.png","completionDate":"2026-11-01","status":"InProgress","createdAt":"2026-10-01T10:00:00Z","updatedAt":null},
            null,
            {"id":"2","name":"b","description":"e","image":null,"completionDate":"","status":"Completed"}
        ]}}}"#;

        let data: ListNotesData = parse_response(body).unwrap();
        let notes = notes_from_page(data.list_notes.items);

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "1");
        assert_eq!(notes[1].id, "2");
        assert_eq!(notes[0].image_key.as_deref(), Some("a.png"));
        assert_eq!(notes[0].resolved_image_url, None);
        assert_eq!(notes[0].completion_date.as_deref(), Some("2026-11-01"));
        assert_eq!(notes[1].status, NoteStatus::Completed);
        assert_eq!(notes[1].completion_date, None);
        assert!(!notes[1].has_image());
    }

    #[test]
    fn given_errors_in_response_when_parsing_then_returns_remote_error() {
        let body = r#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"Denied"}]}"#;

        let result: Result<ListNotesData, _> = parse_response(body);

        assert!(matches!(result, Err(DomainError::Remote(msg)) if msg == "Unauthorized; Denied"));
    }

    #[test]
    fn given_only_null_items_when_converting_page_then_returns_empty_list() {
        let notes = notes_from_page(vec![None, None]);

        assert!(notes.is_empty());
    }

    #[test]
    fn given_delete_payload_when_parsing_then_accepts_record_or_null() {
        let record = r#"{"data":{"deleteNote":{"id":"1","name":"a"}}}"#;
        let empty = r#"{"data":{"deleteNote":null}}"#;

        assert!(parse_response::<IgnoredAny>(record).is_ok());
        assert!(parse_response::<IgnoredAny>(empty).is_ok());
    }

    #[test]
    fn given_delete_errors_when_parsing_then_returns_remote_error() {
        let body = r#"{"data":{"deleteNote":null},"errors":[{"message":"Not authorized"}]}"#;

        let result = parse_response::<IgnoredAny>(body);

        assert!(matches!(result, Err(DomainError::Remote(msg)) if msg == "Not authorized"));
    }

    #[test]
    fn given_no_data_when_parsing_then_returns_remote_error() {
        let result: Result<ListNotesData, _> = parse_response("{}");

        assert!(matches!(result, Err(DomainError::Remote(_))));
    }

    #[test]
    fn given_new_note_when_building_variables_then_status_is_in_progress() {
        let input = NewNote {
            name: "b".to_string(),
            description: "d".to_string(),
            completion_date: None,
            image_key: Some("b.png".to_string()),
            status: NoteStatus::InProgress,
        };

        let vars = create_variables(&input);

        assert_eq!(vars["input"]["status"], "InProgress");
        assert_eq!(vars["input"]["image"], "b.png");
        assert_eq!(vars["input"]["completionDate"], Value::Null);
    }

    #[test]
    fn given_status_update_when_building_variables_then_carries_only_id_and_status() {
        let vars = update_variables(&StatusUpdate {
            id: "7".to_string(),
            status: NoteStatus::Completed,
        });

        assert_eq!(vars, json!({ "input": { "id": "7", "status": "Completed" } }));
    }

    #[test]
    fn given_api_key_and_token_when_building_headers_then_sets_both() {
        let config = ApiConfig {
            api_key: Some("da2-key".to_string()),
            auth_token: Some("jwt".to_string()),
            ..ApiConfig::default()
        };

        let headers = auth_headers(&config).unwrap();

        assert_eq!(headers.get("x-api-key").unwrap(), "da2-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "jwt");
    }

    #[test]
    fn given_queries_when_building_then_request_all_note_fields() {
        assert!(list_notes_query().contains("listNotes { items { id name"));
        assert!(create_note_mutation().contains("createNote(input: $input)"));
        assert!(update_note_mutation().contains("completionDate status"));
    }
}
