// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use waggle_app::{Datapoint, DatapointRequest, GoalDetail, GoalSummary, User};

pub const DEFAULT_BASE_URL: &str = "https://www.beeminder.com/api/v1";
const DASHBOARD_BASE_URL: &str = "https://www.beeminder.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("cannot reach {base_url}: {source}")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("authentication rejected ({status}); check the auth token")]
    Auth { status: u16 },
    #[error("not found: {path}")]
    NotFound { path: String },
    #[error("request rejected ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Web dashboard for a user; the API base URL is not involved.
pub fn dashboard_url(username: &str) -> String {
    format!("{DASHBOARD_BASE_URL}/{username}")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatapointQuery {
    pub sort: Option<String>,
    pub count: Option<u32>,
    pub page: Option<u32>,
    pub per: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatapointUpdate {
    pub value: Option<f64>,
    pub timestamp: Option<i64>,
    pub comment: Option<String>,
}

/// Blocking client for the Beeminder REST API (v1). Every request carries the
/// auth token; callers supply the username per call.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    auth_token: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, auth_token: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url)
            .map_err(|error| ApiError::Config(format!("invalid base URL {base_url:?}: {error}")))?;
        if auth_token.trim().is_empty() {
            return Err(ApiError::Config("auth token must not be empty".to_owned()));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Config(format!("build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            auth_token: auth_token.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self, username: &str) -> Result<User> {
        let path = format!("/users/{username}.json");
        let response = self.get(&path, &[])?;
        self.decode(response, "user")
    }

    pub fn goals(&self, username: &str) -> Result<Vec<GoalSummary>> {
        let path = format!("/users/{username}/goals.json");
        let response = self.get(&path, &[])?;
        self.decode(response, "goal list")
    }

    pub fn archived_goals(&self, username: &str) -> Result<Vec<GoalSummary>> {
        let path = format!("/users/{username}/goals/archived.json");
        let response = self.get(&path, &[])?;
        self.decode(response, "archived goal list")
    }

    pub fn goal(&self, username: &str, slug: &str, include_datapoints: bool) -> Result<GoalDetail> {
        let path = format!("/users/{username}/goals/{slug}.json");
        let datapoints = if include_datapoints { "true" } else { "false" };
        let response = self.get(&path, &[("datapoints", datapoints.to_owned())])?;
        self.decode(response, "goal detail")
    }

    pub fn datapoints(
        &self,
        username: &str,
        slug: &str,
        query: &DatapointQuery,
    ) -> Result<Vec<Datapoint>> {
        let path = format!("/users/{username}/goals/{slug}/datapoints.json");
        let mut params = Vec::new();
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(count) = query.count {
            params.push(("count", count.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per) = query.per {
            params.push(("per", per.to_string()));
        }
        let response = self.get(&path, &params)?;
        self.decode(response, "datapoint list")
    }

    pub fn create_datapoint(
        &self,
        username: &str,
        slug: &str,
        request: &DatapointRequest,
    ) -> Result<Datapoint> {
        let path = format!("/users/{username}/goals/{slug}/datapoints.json");
        let mut form = vec![
            ("auth_token", self.auth_token.clone()),
            ("value", request.value.to_string()),
        ];
        if let Some(comment) = &request.comment {
            form.push(("comment", comment.clone()));
        }
        let builder = self.http.post(self.endpoint(&path)).form(&form);
        let response = self.dispatch(builder, &path)?;
        self.decode(response, "datapoint")
    }

    pub fn update_datapoint(
        &self,
        username: &str,
        slug: &str,
        datapoint_id: &str,
        update: &DatapointUpdate,
    ) -> Result<Datapoint> {
        let path = format!("/users/{username}/goals/{slug}/datapoints/{datapoint_id}.json");
        let mut form = vec![("auth_token", self.auth_token.clone())];
        if let Some(value) = update.value {
            form.push(("value", value.to_string()));
        }
        if let Some(timestamp) = update.timestamp {
            form.push(("timestamp", timestamp.to_string()));
        }
        if let Some(comment) = &update.comment {
            form.push(("comment", comment.clone()));
        }
        let builder = self.http.put(self.endpoint(&path)).form(&form);
        let response = self.dispatch(builder, &path)?;
        self.decode(response, "datapoint")
    }

    pub fn delete_datapoint(
        &self,
        username: &str,
        slug: &str,
        datapoint_id: &str,
    ) -> Result<Datapoint> {
        let path = format!("/users/{username}/goals/{slug}/datapoints/{datapoint_id}.json");
        let builder = self
            .http
            .delete(self.endpoint(&path))
            .query(&[("auth_token", self.auth_token.as_str())]);
        let response = self.dispatch(builder, &path)?;
        self.decode(response, "datapoint")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Response> {
        let builder = self
            .http
            .get(self.endpoint(path))
            .query(&[("auth_token", self.auth_token.as_str())])
            .query(params);
        self.dispatch(builder, path)
    }

    fn dispatch(&self, builder: RequestBuilder, path: &str) -> Result<Response> {
        let response = builder.send().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;
        check_status(response, path)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        what: &'static str,
    ) -> Result<T> {
        let body = response.text().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { what, source })
    }
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => ApiError::Auth {
            status: status.as_u16(),
        },
        404 => ApiError::NotFound {
            path: path.to_owned(),
        },
        code if status.is_client_error() => ApiError::Validation {
            status: code,
            message: server_message(&body),
        },
        code => ApiError::Server {
            status: code,
            message: server_message(&body),
        },
    })
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Option<Value>,
    error: Option<String>,
}

/// Beeminder reports failures as `{"errors": ...}` (string or field map) or
/// `{"error": "..."}`; fall back to the raw body when it is short and plain.
fn server_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(errors) = &envelope.errors
            && let Some(message) = flatten_errors(errors)
        {
            return message;
        }
        if let Some(error) = envelope.error
            && !error.is_empty()
        {
            return error;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.starts_with('<') {
        return trimmed.to_owned();
    }
    "unexpected response".to_owned()
}

fn flatten_errors(value: &Value) -> Option<String> {
    match value {
        Value::String(message) => Some(message.clone()),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(field, detail)| match detail {
                    Value::String(text) => format!("{field}: {text}"),
                    other => format!("{field}: {other}"),
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
