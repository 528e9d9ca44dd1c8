//! Request bodies and response models of the Notion REST API.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use stratosphere_common::{format_date, FieldValue, Result, RowFields, StratosphereError, DATE_COLUMN, HANDLE_COLUMN};

/// Largest page size the query endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Response of `POST /databases/{id}/query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    /// Matching pages
    #[serde(default)]
    pub results: Vec<Page>,
    /// Whether another page of results exists
    #[serde(default)]
    pub has_more: bool,
    /// Cursor of the next page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    /// Page ID
    #[serde(default)]
    pub id: String,
    /// Property name to property value
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Plain text of the page's title property, whatever it is named.
    pub fn title(&self) -> Option<String> {
        let title = self
            .properties
            .values()
            .find(|property| property.get("type").and_then(Value::as_str) == Some("title"))?
            .get("title")?
            .as_array()?;

        let text: String = title
            .iter()
            .filter_map(|fragment| {
                fragment
                    .get("plain_text")
                    .or_else(|| fragment.get("text").and_then(|t| t.get("content")))
                    .and_then(Value::as_str)
            })
            .collect();
        Some(text)
    }
}

/// Error body returned by the Notion API
#[derive(Debug, Clone, Deserialize)]
pub struct NotionErrorBody {
    /// Always `"error"`
    #[serde(default)]
    pub object: String,
    /// Machine-readable code, e.g. `validation_error`
    #[serde(default)]
    pub code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Body of a query matching rows of `handle` on `date`.
pub fn exists_query(handle: &str, date: NaiveDate) -> Value {
    json!({
        "filter": {
            "and": [
                { "property": HANDLE_COLUMN, "title": { "equals": handle } },
                { "property": DATE_COLUMN, "date": { "equals": format_date(date) } }
            ]
        },
        "page_size": 1
    })
}

/// Body of one page of an unfiltered query.
pub fn list_query(start_cursor: Option<&str>) -> Value {
    let mut body = json!({ "page_size": MAX_PAGE_SIZE });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::from(cursor);
    }
    body
}

/// Notion property value of one cell.
pub fn property_value(value: &FieldValue) -> Result<Value> {
    Ok(match value {
        FieldValue::Number(n) => {
            let number = Number::from_f64(*n)
                .ok_or_else(|| StratosphereError::contract(format!("Cannot upload non-finite number {}", n)))?;
            json!({ "number": number })
        }
        FieldValue::Date(date) => json!({ "date": { "start": format_date(*date) } }),
        FieldValue::Title(text) => json!({
            "title": [{ "type": "text", "text": { "content": text } }]
        }),
    })
}

/// Body of `POST /pages` creating a row in `database_id`.
pub fn create_page(database_id: &str, fields: &RowFields) -> Result<Value> {
    let mut properties = Map::new();
    for (column, value) in fields.iter() {
        properties.insert(column.to_string(), property_value(value)?);
    }

    Ok(json!({
        "parent": { "database_id": database_id },
        "properties": properties
    }))
}

/// Readable detail of an error body, falling back to the raw text.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<NotionErrorBody>(body) {
        Ok(err) if !err.message.is_empty() => {
            if err.code.is_empty() {
                err.message
            } else {
                format!("{} ({})", err.message, err.code)
            }
        }
        _ => stratosphere_common::truncate_string(body.trim(), 200),
    }
}
