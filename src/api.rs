//! API gateway client for the movie service.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only component that talks to the remote API. Every feature that
//! needs catalog or account data goes through [`ApiClient`]; nothing else
//! builds URLs or inspects HTTP statuses.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses, and malformed success bodies are all
//! normalized into [`ApiError`]. No call retries, times out on its own, or
//! caches: each one is a fresh round trip whose failure is returned as-is.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::types::{
    Ack, Credentials, Director, Genre, LoginResponse, Movie, ProfileUpdate, Registration, UserProfile,
};

pub const CURRENT_PASSWORD_REQUIRED: &str = "Current password is required to update profile.";

/// Façade over the remote movie API.
///
/// Holds no mutable state of its own; the token is read from the injected
/// [`SessionStore`] at the start of every call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client for `base_url` (which should end in `/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: Url, session: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, session })
    }

    /// Build a client from parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone(), session)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // =========================================================================
    // ACCOUNT
    // =========================================================================

    /// Create an account via `POST /users`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server rejects it.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let body = to_body(registration)?;
        let (_, text) = self.send(Method::POST, &["users"], Some(body)).await?;
        decode(&text)
    }

    /// Exchange credentials for a token via `POST /login`.
    ///
    /// Does not touch the session store; persisting the result is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the credentials are rejected.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = to_body(credentials)?;
        let (_, text) = self.send(Method::POST, &["login"], Some(body)).await?;
        decode(&text)
    }

    /// Fetch a profile, including its current favorites, via `GET /users/{username}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, ApiError> {
        self.get_json(&["users", username]).await
    }

    /// Update profile fields via `PUT /users/{username}`.
    ///
    /// Refuses to send anything unless `update` carries the current password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without issuing a request when the
    /// current password is missing, otherwise any request failure.
    pub async fn update_user(&self, username: &str, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        if update.current_password().is_none() {
            return Err(ApiError::Validation(CURRENT_PASSWORD_REQUIRED.to_owned()));
        }
        let body = to_body(update)?;
        let (_, text) = self.send(Method::PUT, &["users", username], Some(body)).await?;
        decode(&text)
    }

    /// Delete the account via `DELETE /users/{username}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn delete_user(&self, username: &str) -> Result<Ack, ApiError> {
        let (status, text) = self.send(Method::DELETE, &["users", username], None).await?;
        Ok(ack(status, &text))
    }

    // =========================================================================
    // FAVORITES
    // =========================================================================

    /// `POST /users/{username}/movies/{movie_id}` with an empty body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn add_favorite(&self, username: &str, movie_id: &str) -> Result<Ack, ApiError> {
        let path = ["users", username, "movies", movie_id];
        let body = Value::Object(serde_json::Map::new());
        let (status, text) = self.send(Method::POST, &path, Some(body)).await?;
        Ok(ack(status, &text))
    }

    /// `DELETE /users/{username}/movies/{movie_id}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Ack, ApiError> {
        let path = ["users", username, "movies", movie_id];
        let (status, text) = self.send(Method::DELETE, &path, None).await?;
        Ok(ack(status, &text))
    }

    // =========================================================================
    // CATALOG
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        self.get_json(&["movies"]).await
    }

    /// Look up one movie by title (or id) via `GET /movies/{title}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; an unknown title surfaces as status 404.
    pub async fn get_movie(&self, title_or_id: &str) -> Result<Movie, ApiError> {
        self.get_json(&["movies", title_or_id]).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn get_director(&self, name: &str) -> Result<Director, ApiError> {
        self.get_json(&["movies", "directors", name]).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn get_genre(&self, name: &str) -> Result<Genre, ApiError> {
        self.get_json(&["movies", "genre", name]).await
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Resolve path segments against the base URL, percent-encoding each one.
    ///
    /// Blank, `.` and `..` identifiers are rejected: URL normalization would
    /// drop them and retarget the request at the parent collection.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let owner = |i: usize| i.checked_sub(1).and_then(|p| segments.get(p)).copied().unwrap_or("path");
        for (i, segment) in segments.iter().enumerate() {
            if segment.trim().is_empty() {
                return Err(ApiError::Validation(format!("{} identifier must not be empty", owner(i))));
            }
            if matches!(*segment, "." | "..") {
                return Err(ApiError::Validation(format!("{} identifier must not be `{segment}`", owner(i))));
            }
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::ClientBuild(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let (_, text) = self.send(Method::GET, segments, None).await?;
        decode(&text)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<(u16, String), ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, path = url.path(), "api request");

        // Signed-out calls still carry an empty bearer; the server decides.
        let token = self.session.token().unwrap_or_default();
        let mut request = self.http.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| log_failure(&method, &url, ApiError::network(&e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| log_failure(&method, &url, ApiError::network(&e)))?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), status.canonical_reason(), &text);
            return Err(log_failure(&method, &url, err));
        }
        Ok((status.as_u16(), text))
    }
}

fn log_failure(method: &Method, url: &Url, err: ApiError) -> ApiError {
    tracing::warn!(%method, path = url.path(), status = err.status(), error = %err, "api request failed");
    err
}

fn to_body(value: &impl serde::Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::ClientBuild(format!("request body: {e}")))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

fn ack(status: u16, text: &str) -> Ack {
    let trimmed = text.trim();
    let body = if trimmed.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned()))
    };
    Ack { status, body }
}
