//! Supabase client — GoTrue for the session, PostgREST for profile data.
//!
//! Thin HTTP wrapper. Body parsing lives in pure `parse_*` functions for
//! testability.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::{AuthProvider, ProfileBackend};
use crate::config::{BackendConfig, Timeouts};
use crate::error::BackendError;
use crate::types::{Country, Principal, Profile, ProfileRow};

const GET_MY_PROFILE_RPC: &str = "get_my_profile";
const PROFILES_TABLE: &str = "profiles";
const PROFILE_COLUMNS: &str = "id,display_name,country_id,merit_points,is_admin,initialized";
const COUNTRIES_TABLE: &str = "countries";
const COUNTRY_COLUMNS: &str = "id,name";

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    ensure_admin_rpc: String,
}

impl SupabaseClient {
    /// Build a client for the configured project and session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = build_http(config.timeouts)?;
        Ok(Self {
            http,
            base_url: config.supabase_url.clone(),
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone(),
            ensure_admin_rpc: config.ensure_admin_rpc.clone(),
        })
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.access_token.is_some()
    }

    /// `apikey` is always the anon key; `Authorization` carries the session
    /// token when present so row-level security applies to the caller.
    fn headers(&self) -> Result<HeaderMap, BackendError> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {bearer}"))?);
        Ok(headers)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), BackendError> {
        let response = request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok((status, text))
    }

    async fn rpc(&self, name: &str) -> Result<String, BackendError> {
        let url = format!("{}/rest/v1/rpc/{name}", self.base_url);
        let (status, body) = self
            .send(self.http.post(url).json(&serde_json::json!({})))
            .await?;
        ensure_success(status, body)
    }

    async fn select(&self, table: &str, id: &str, columns: &str) -> Result<String, BackendError> {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let filter = format!("eq.{id}");
        let request = self
            .http
            .get(url)
            .query(&[("id", filter.as_str()), ("select", columns), ("limit", "1")]);
        let (status, body) = self.send(request).await?;
        ensure_success(status, body)
    }
}

#[async_trait::async_trait(?Send)]
impl AuthProvider for SupabaseClient {
    async fn current_principal(&self) -> Result<Option<Principal>, BackendError> {
        if self.access_token.is_none() {
            return Ok(None);
        }
        let url = format!("{}/auth/v1/user", self.base_url);
        let (status, body) = self.send(self.http.get(url)).await?;
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::debug!(status = status.as_u16(), "session rejected by auth provider");
            return Ok(None);
        }
        let body = ensure_success(status, body)?;
        parse_principal(&body)
    }
}

#[async_trait::async_trait(?Send)]
impl ProfileBackend for SupabaseClient {
    async fn get_own_profile(&self) -> Result<Vec<Profile>, BackendError> {
        let body = self.rpc(GET_MY_PROFILE_RPC).await?;
        parse_profile_rows(&body)
    }

    async fn ensure_admin_provisioning(&self) -> Result<(), BackendError> {
        self.rpc(&self.ensure_admin_rpc).await.map(|_| ())
    }

    async fn profile_row(&self, id: &str) -> Result<Option<ProfileRow>, BackendError> {
        let body = self.select(PROFILES_TABLE, id, PROFILE_COLUMNS).await?;
        parse_first_row(&body)
    }

    async fn country(&self, id: &str) -> Result<Option<Country>, BackendError> {
        let body = self.select(COUNTRIES_TABLE, id, COUNTRY_COLUMNS).await?;
        parse_first_row(&body)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_http(timeouts: Timeouts) -> Result<reqwest::Client, BackendError> {
    use std::time::Duration;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| BackendError::HttpClientBuild(e.to_string()))
}

// The browser fetch transport owns its own timeouts.
#[cfg(target_arch = "wasm32")]
fn build_http(_timeouts: Timeouts) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| BackendError::HttpClientBuild(e.to_string()))
}

fn header_value(raw: &str) -> Result<HeaderValue, BackendError> {
    HeaderValue::from_str(raw).map_err(|e| BackendError::InvalidHeader(e.to_string()))
}

fn ensure_success(status: StatusCode, body: String) -> Result<String, BackendError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(BackendError::Response { status: status.as_u16(), body })
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_principal(json: &str) -> Result<Option<Principal>, BackendError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
    // Older GoTrue versions wrap the user as `{ "user": { ... } }`.
    let user = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(mut map) if map.contains_key("user") => map.remove("user").unwrap_or_default(),
        other => other,
    };
    if user.is_null() {
        return Ok(None);
    }
    serde_json::from_value(user)
        .map(Some)
        .map_err(|e| BackendError::Parse(e.to_string()))
}

/// An RPC returning `SETOF` yields an array; a scalar composite yields one
/// object; no row may come back as `null`.
fn parse_profile_rows(json: &str) -> Result<Vec<Profile>, BackendError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
    let rows = match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| BackendError::Parse(e.to_string())))
        .collect()
}

fn parse_first_row<T: serde::de::DeserializeOwned>(json: &str) -> Result<Option<T>, BackendError> {
    let rows: Vec<T> = serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
    Ok(rows.into_iter().next())
}

#[cfg(test)]
#[path = "supabase_test.rs"]
mod tests;
