//! HTTP request gateway for the administration API.
//!
//! Every request goes through [`Gateway::request`]:
//!
//! 1. The path is appended to the configured base URL and the present query
//!    parameters are form-encoded onto it
//! 2. `Content-Type: application/json` is set, caller headers are merged over it
//! 3. The current token is read from the [`SessionStore`] and, if present,
//!    sent as `Authorization: Bearer <token>`
//! 4. A 2xx response is parsed as JSON when its content type says so, and
//!    returned as raw text otherwise
//! 5. Anything else becomes [`ApiError::Api`] with the parsed error body, or
//!    the generic fallback document when the body is not JSON
//!
//! The gateway never retries and never changes the session; the operation
//! layer decides what an authentication failure means.

mod query;

pub use query::{ParamValue, QueryParams};

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::session::SessionStore;

/// How much of an error body to log.
const LOG_BODY_LIMIT: usize = 500;

/// Options for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query string parameters.
    pub query: QueryParams,
    /// JSON body.
    pub body: Option<Value>,
    /// Extra headers, applied over the defaults.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// No query, no body, no extra headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query parameters.
    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON (content type declared JSON).
    Json(Value),
    /// Raw body (any other content type).
    Text(String),
}

impl Payload {
    /// Decode the payload into `T`.
    ///
    /// A text payload decodes as a JSON string, and an empty text payload as
    /// JSON `null`, so `()` and `Option<_>` work for bodiless responses.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Self::Json(value) => value,
            Self::Text(text) if text.trim().is_empty() => Value::Null,
            Self::Text(text) => Value::String(text),
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// Authenticated HTTP gateway.
///
/// Cheap to clone; clones share the connection pool and session.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Create a gateway reading tokens from `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(GatewayInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                session,
            }),
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The session the gateway reads tokens from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Issue a request and return the raw payload.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if the request could not be sent
    /// - `ApiError::Api` for a non-2xx status
    /// - `ApiError::Decode` if a JSON success body is malformed
    #[instrument(skip(self, options), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Payload, ApiError> {
        let url = self.url_for(path, &options.query)?;
        let headers = self.headers_for(&options.headers).await?;

        let mut builder = self.inner.client.request(method, url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body).map_err(ApiError::Encode)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if !status.is_success() {
            // An unreadable error body degrades to the generic message
            let text = response.text().await.unwrap_or_default();
            let payload = serde_json::from_str::<Value>(&text)
                .unwrap_or_else(|_| serde_json::json!({ "message": GENERIC_ERROR_MESSAGE }));

            if status.is_server_error() {
                error!(
                    status = %status,
                    body = %text.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                    "API returned server error"
                );
            } else {
                warn!(status = %status, "API rejected request");
            }

            return Err(ApiError::from_response(status.as_u16(), payload));
        }

        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "API request succeeded");

        if !is_json {
            return Ok(Payload::Text(text));
        }
        if text.trim().is_empty() {
            return Ok(Payload::Json(Value::Null));
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Payload::Json(value)),
            Err(e) => {
                error!(
                    error = %e,
                    body = %text.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                    "Failed to parse API response"
                );
                Err(ApiError::Decode(e))
            }
        }
    }

    /// Issue a request and decode the payload into `T`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request) and [`Payload::decode`].
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(method, path, options).await?.decode()
    }

    /// `GET path?query`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, RequestOptions::new().query(query))
            .await
    }

    /// `POST path` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, with_body(body)?).await
    }

    /// `PUT path` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, with_body(body)?).await
    }

    /// `PATCH path` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.send(Method::PATCH, path, with_body(body)?).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, RequestOptions::new()).await
    }

    /// Base URL + path, plus present query parameters.
    fn url_for(&self, path: &str, query: &QueryParams) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        let mut url = Url::parse(&format!("{base}{path}"))?;
        query.append_to(&mut url);
        Ok(url)
    }

    /// Defaults, then caller headers, then the bearer token.
    async fn headers_for(&self, extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }

        if let Some(token) = self.inner.session.token().await {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| ApiError::InvalidHeader("Authorization: malformed token".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

fn with_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<RequestOptions, ApiError> {
    match body {
        Some(body) => RequestOptions::new().json(body),
        None => Ok(RequestOptions::new()),
    }
}
