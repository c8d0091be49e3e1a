//! PostgREST client for the hosted chore chart database.
//!
//! Tables are addressed as `{url}/rest/v1/{table}`. The schema is selected
//! with the `Accept-Profile` / `Content-Profile` headers, and every write asks
//! for `return=representation` so the created or updated row comes back.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use super::{Connectivity, Filter, InsertOutcome, RemoteStore};
use crate::config::RemoteConfig;
use crate::error::ChoreSyncError;

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Blocking PostgREST client.
#[derive(Clone)]
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    schema: String,
    probe_timeout: Duration,
    http: Client,
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("base_url", &self.base_url)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl PostgrestClient {
    /// Build a client from the `remote` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or key is missing, or the HTTP client
    /// cannot be initialized.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ChoreSyncError> {
        let base_url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ChoreSyncError::Config("remote.url is not set".to_string()))?;
        let api_key = config
            .anon_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ChoreSyncError::Config("remote.anon_key is not set".to_string()))?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChoreSyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            schema: config.schema.clone(),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    fn send(request: RequestBuilder) -> Result<Vec<Value>, ChoreSyncError> {
        let response = request
            .send()
            .map_err(|e| ChoreSyncError::transport(format!("Network error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ChoreSyncError::transport(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            parse_rows(&body)
        } else {
            Err(remote_error(status.as_u16(), &body))
        }
    }
}

fn filter_query(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions()
        .iter()
        .map(|(column, value)| (column.clone(), format!("eq.{value}")))
        .collect()
}

fn parse_rows(body: &str) -> Result<Vec<Value>, ChoreSyncError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row => Ok(vec![row]),
    }
}

fn remote_error(status: u16, body: &str) -> ChoreSyncError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = match (parsed.message, parsed.details) {
                (Some(message), Some(details)) => format!("{message} ({details})"),
                (Some(message), None) => message,
                (None, Some(details)) => details,
                (None, None) => body.to_string(),
            };
            ChoreSyncError::Remote {
                status: Some(status),
                code: parsed.code,
                message,
            }
        },
        Err(_) => ChoreSyncError::Remote {
            status: Some(status),
            code: None,
            message: body.trim().to_string(),
        },
    }
}

impl RemoteStore for PostgrestClient {
    fn insert(&self, table: &str, row: &Value) -> Result<InsertOutcome, ChoreSyncError> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row);

        match Self::send(request) {
            Ok(rows) => Ok(InsertOutcome::Created(
                rows.into_iter().next().unwrap_or(Value::Null),
            )),
            Err(e) if e.is_unique_violation() => {
                tracing::debug!(table, "insert hit unique constraint");
                Ok(InsertOutcome::Duplicate)
            },
            Err(e) => Err(e),
        }
    }

    fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ChoreSyncError> {
        let request = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(patch);

        Self::send(request)?
            .into_iter()
            .next()
            .ok_or_else(|| ChoreSyncError::NotFound(format!("{table} row {id}")))
    }

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ChoreSyncError> {
        let request = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(&filter_query(filter));

        Self::send(request)
    }

    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, ChoreSyncError> {
        let request = self
            .request(Method::DELETE, table)
            .query(&filter_query(filter))
            .header("Prefer", "return=representation");

        Ok(Self::send(request)?.len())
    }
}

impl Connectivity for PostgrestClient {
    /// Any HTTP response counts as reachable; only transport failures mean offline.
    fn is_online(&self) -> bool {
        let probe = self
            .http
            .get(format!("{}/rest/v1/", self.base_url))
            .header("apikey", &self.api_key)
            .timeout(self.probe_timeout)
            .send();

        match probe {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "remote store unreachable");
                false
            },
        }
    }
}
