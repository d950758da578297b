//! Request dispatch with bearer injection
//!
//! Every request goes out with `Authorization: Bearer <token>` read from the
//! configured [`AccessTokenProvider`] at send time. Failures are returned to
//! the caller as-is: transport errors, timeouts and non-2xx statuses are never
//! retried here.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, instrument, trace, warn};
use url::Url;
use wwsdk_common::normalize::{pick, Picked};
use wwsdk_domain::constants::{
    CONTENT_TYPE_GRAPHQL, CONTENT_TYPE_JSON, GRAPHQL_ROUTE, GRAPHQL_VIEW, GRAPHQL_VIEW_HEADER,
};
use wwsdk_domain::SdkError;

use super::auth::AccessTokenProvider;
use crate::errors::to_sdk;
use crate::http::HttpClient;

/// Target for raw request/response bodies. Enabled only at the most verbose
/// log level.
pub const HTTP_TRACE_TARGET: &str = "wwsdk::http";

/// Request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent verbatim with the caller's `Content-Type`.
    Raw(String),
    /// Serialized as JSON.
    Json(Value),
}

/// A single request, built per call and consumed by [`RequestDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Path relative to the platform base URL, e.g. `v1/spaces/{id}/messages`.
    pub route: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
}

impl RequestEnvelope {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self { route: route.into(), method, headers: BTreeMap::new(), body: RequestBody::Empty }
    }

    pub fn get(route: impl Into<String>) -> Self {
        Self::new(Method::GET, route)
    }

    pub fn post(route: impl Into<String>) -> Self {
        Self::new(Method::POST, route)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Raw body with an explicit content type.
    #[must_use]
    pub fn raw(self, body: impl Into<String>, content_type: &str) -> Self {
        let mut envelope = self.header(CONTENT_TYPE.as_str(), content_type);
        envelope.body = RequestBody::Raw(body.into());
        envelope
    }
}

/// A decoded response.
///
/// `body` holds parsed JSON when the server sent JSON, the raw text as a
/// string otherwise, and `null` for an empty body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Value,
}

/// GraphQL request in one of the two accepted encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphqlPayload {
    /// Query text sent as `application/graphql`.
    Raw(String),
    /// `{query, variables}` sent as `application/json`.
    Json { query: String, variables: Option<Value> },
}

impl GraphqlPayload {
    pub fn query(query: impl Into<String>) -> Self {
        Self::Json { query: query.into(), variables: None }
    }

    pub fn with_variables(query: impl Into<String>, variables: Value) -> Self {
        Self::Json { query: query.into(), variables: Some(variables) }
    }
}

/// Issues authenticated requests against the platform.
#[derive(Clone)]
pub struct RequestDispatcher {
    http: HttpClient,
    base_url: Url,
    auth: Arc<dyn AccessTokenProvider>,
}

impl RequestDispatcher {
    /// # Errors
    /// Returns [`SdkError::Config`] if `base_url` does not parse.
    pub fn new(
        http: HttpClient,
        base_url: &str,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, SdkError> {
        // A trailing slash makes `join` append routes instead of replacing the
        // last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| SdkError::Config(format!("invalid base url '{base_url}': {e}")))?;
        Ok(Self { http, base_url, auth })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a route, or an absolute URL, against the base URL.
    pub fn resolve(&self, route: &str) -> Result<Url, SdkError> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .map_err(|e| SdkError::InvalidInput(format!("invalid route '{route}': {e}")))
    }

    /// Send `request` with the current bearer token.
    ///
    /// A caller-supplied `Authorization` header is replaced.
    #[instrument(skip(self, request), fields(method = %request.method, route = %request.route))]
    pub async fn dispatch(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, SdkError> {
        let RequestEnvelope { route, method, headers, body } = request;
        let url = self.resolve(&route)?;

        debug!("{method} to '{route}'");
        let mut builder = self.authorized(method, url).await?;

        for (name, value) in &headers {
            if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Raw(raw) => {
                trace!(target: HTTP_TRACE_TARGET, body = %raw, "request body");
                builder.body(raw)
            }
            RequestBody::Json(value) => {
                trace!(target: HTTP_TRACE_TARGET, body = %value, "request body");
                builder.json(&value)
            }
        };

        self.execute(builder).await
    }

    /// Send a multipart form to `route`.
    #[instrument(skip(self, form))]
    pub async fn dispatch_multipart(
        &self,
        route: &str,
        form: Form,
    ) -> Result<ResponseEnvelope, SdkError> {
        let url = self.resolve(route)?;
        debug!("POST multipart to '{route}'");
        let builder = self.authorized(Method::POST, url).await?.multipart(form);
        self.execute(builder).await
    }

    /// Fetch raw bytes from `location` (route or absolute URL) with the
    /// bearer header.
    #[instrument(skip(self))]
    pub async fn download(&self, location: &str) -> Result<Vec<u8>, SdkError> {
        let url = self.resolve(location)?;
        let builder = self.authorized(Method::GET, url).await?;
        let response = self.http.send(builder).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(error = %e, "Failed to read download error body");
                String::new()
            });
            return Err(SdkError::Http { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await.map_err(to_sdk)?;
        trace!(target: HTTP_TRACE_TARGET, len = bytes.len(), "downloaded body");
        Ok(bytes.to_vec())
    }

    /// POST to the GraphQL endpoint and return the `data` member.
    ///
    /// GraphQL-level `errors` are logged; the partial `data` is still
    /// returned.
    pub async fn send_graphql(&self, payload: GraphqlPayload) -> Result<Picked, SdkError> {
        let request = match payload {
            GraphqlPayload::Raw(query) => {
                RequestEnvelope::post(GRAPHQL_ROUTE).raw(query, CONTENT_TYPE_GRAPHQL)
            }
            GraphqlPayload::Json { query, variables } => {
                let mut body = json!({ "query": query });
                if let Some(variables) = variables {
                    body["variables"] = variables;
                }
                RequestEnvelope::post(GRAPHQL_ROUTE)
                    .header(CONTENT_TYPE.as_str(), CONTENT_TYPE_JSON)
                    .json(body)
            }
        }
        .header(GRAPHQL_VIEW_HEADER, GRAPHQL_VIEW);

        let response = self.dispatch(request).await?;

        if let Some(errors) = response.body.get("errors").filter(|e| !e.is_null()) {
            warn!(errors = %errors, "GraphQL response carried errors");
        }

        pick("data", response.body).map_err(to_sdk)
    }

    async fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, SdkError> {
        let token = self.auth.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<ResponseEnvelope, SdkError> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        let text = response.text().await.map_err(to_sdk)?;

        trace!(target: HTTP_TRACE_TARGET, status = status.as_u16(), body = %text, "response body");

        if !status.is_success() {
            return Err(SdkError::Http { status: status.as_u16(), body: text });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ResponseEnvelope { status: status.as_u16(), body })
    }
}
