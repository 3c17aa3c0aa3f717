//! Record store backed by the hosted PostgREST endpoint.
//!
//! Tables are exposed under `{api_url}/rest/v1/{table}`. Filters travel as
//! `column=eq.value` query pairs, ordering as `order=column.desc`, and every
//! request carries the project key both as `apikey` and as a bearer token.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nounou::api::rest::{RestConfig, RestStore};
//!
//! let store = RestStore::new(&RestConfig {
//!     api_url: "https://project.supabase.co".to_string(),
//!     api_key: "public-anon-key".to_string(),
//! });
//! ```

use crate::libs::config::ConfigModule;
use crate::libs::messages::Message;
use crate::msg_print;
use crate::store::{is_identifier, Collection, Direction, Query, RecordId, RecordStore, Row, StoreError, StoreResult, ID_COLUMN};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REST_PATH: &str = "rest/v1";

#[derive(Debug)]
pub struct RestStore {
    client: Client,
    config: RestConfig,
}

impl RestStore {
    pub fn new(config: &RestConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn table_url(&self, collection: &Collection) -> StoreResult<String> {
        collection.validate()?;
        Ok(format!("{}/{}/{}", self.config.api_url.trim_end_matches('/'), REST_PATH, collection.table()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(status = status.as_u16(), %message, "request rejected");
        if status == StatusCode::CONFLICT {
            Err(StoreError::Conflict(message))
        } else {
            Err(StoreError::Unavailable(message))
        }
    }
}

impl RecordStore for RestStore {
    async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
        let url = self.table_url(collection)?;
        let pairs = query_pairs(query)?;
        let response = self.send(self.client.get(&url).query(&pairs)).await?;

        let rows = response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        tracing::trace!(table = collection.table(), count = rows.len(), "find");
        Ok(rows)
    }

    async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
        let url = self.table_url(collection)?;
        let request = self
            .client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(&Value::Object(row));
        let response = self.send(request).await?;

        let created = response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no row", collection.table())))
    }

    async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let url = self.table_url(collection)?;
        let request = self
            .client
            .patch(&url)
            .query(&[id_pair(id)])
            .header("Prefer", "return=representation")
            .json(&Value::Object(patch));
        let response = self.send(request).await?;

        let updated = response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if updated.is_empty() {
            return Err(StoreError::NotFound {
                table: collection.table().to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
        let url = self.table_url(collection)?;
        self.send(self.client.delete(&url).query(&[id_pair(id)])).await?;
        Ok(())
    }
}

/// Translates a query into PostgREST query-string pairs.
pub fn query_pairs(query: &Query) -> StoreResult<Vec<(String, String)>> {
    let mut pairs = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        if !is_identifier(&filter.column) {
            return Err(StoreError::InvalidName(filter.column.clone()));
        }
        let condition = match &filter.value {
            Value::Null => "is.null".to_string(),
            value => format!("eq.{}", plain(value)),
        };
        pairs.push((filter.column.clone(), condition));
    }

    if let Some(order) = &query.order {
        if !is_identifier(&order.column) {
            return Err(StoreError::InvalidName(order.column.clone()));
        }
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    Ok(pairs)
}

fn id_pair(id: &RecordId) -> (String, String) {
    (ID_COLUMN.to_string(), format!("eq.{}", id))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Prefers the `message` field of a PostgREST error body.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Connection settings for the hosted backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RestConfig {
    /// Project URL, without the `/rest/v1` suffix.
    pub api_url: String,
    /// Public (anon) key of the project.
    pub api_key: String,
}

impl RestConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "rest".to_string(),
            name: "Hosted backend".to_string(),
        }
    }

    /// Prompts for the project URL and key, defaulting to current values.
    pub fn init(config: &Option<RestConfig>) -> Result<Self> {
        let config = config.clone().unwrap_or(Self {
            api_url: "".to_string(),
            api_key: "".to_string(),
        });

        msg_print!(Message::ConfigModuleRest);

        Ok(Self {
            api_url: Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the project URL")
                .default(config.api_url)
                .interact_text()?,
            api_key: Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the project API key")
                .default(config.api_key)
                .interact_text()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_message() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "<html>"), "HTTP 502 Bad Gateway");
    }
}
