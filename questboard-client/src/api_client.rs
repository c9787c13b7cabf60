//! HTTP table service for PostgREST-compatible backends.
//!
//! Reads are `GET {base}/rest/v1/{table}?select=*&order={field}.{dir}` with an
//! optional `{field}=eq.{value}` constraint.

use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientError;
use async_trait::async_trait;
use questboard_core::{QueryError, Row, TableQuery};
use questboard_storage::RemoteTableService;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const REST_PATH: &str = "/rest/v1";

#[derive(Clone)]
pub struct RestTableService {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestTableService {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    pub fn build_request(&self, query: &TableQuery) -> reqwest::RequestBuilder {
        self.client
            .get(self.table_url(&query.table))
            .headers(self.auth_header.clone())
            .header(ACCEPT, "application/json")
            .query(&query_params(query))
    }
}

#[async_trait]
impl RemoteTableService for RestTableService {
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, QueryError> {
        query.validate()?;
        let response = self
            .build_request(query)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        decode_body(&query.table, status, &body)
    }
}

/// Query string pairs for one read, in a stable order.
pub fn query_params(query: &TableQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        (
            "order".to_string(),
            format!("{}.{}", query.order.field, query.order.direction.as_str()),
        ),
    ];
    if let Some(filter) = &query.filter {
        params.push((filter.field.clone(), filter_operand(&filter.value)));
    }
    params
}

fn filter_operand(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "is.null".to_string(),
        serde_json::Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

/// Error body returned by PostgREST on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Turn a raw response into rows or a `QueryError`.
pub fn decode_body(table: &str, status: StatusCode, body: &str) -> Result<Vec<Row>, QueryError> {
    if status.is_success() {
        return serde_json::from_str::<Vec<Row>>(body).map_err(|e| QueryError::Decode {
            table: table.to_string(),
            reason: e.to_string(),
        });
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|err| err.message);
    Err(QueryError::Remote {
        table: table.to_string(),
        status: Some(status.as_u16()),
        message,
    })
}

fn transport_error(err: reqwest::Error) -> QueryError {
    QueryError::Transport {
        reason: err.to_string(),
    }
}

fn build_auth_headers(auth: &crate::config::AuthConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("apikey"),
        HeaderValue::from_str(&auth.api_key).map_err(|e| ConfigError::InvalidValue {
            field: "auth.api_key",
            reason: e.to_string(),
        })?,
    );
    let bearer = auth.jwt.as_deref().unwrap_or(&auth.api_key);
    let value = format!("Bearer {}", bearer);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&value).map_err(|e| ConfigError::InvalidValue {
            field: "auth.jwt",
            reason: e.to_string(),
        })?,
    );
    Ok(headers)
}
