//! Configuration parsed from environment variables.
//!
//! Parsing goes through [`AuthConfig::from_vars`] with an injected lookup so
//! tests never touch the process environment.

use crate::error::ConfigError;

pub const DEFAULT_LOGIN_REDIRECT: &str = "inloggen.html";
pub const DEFAULT_ADMIN_REDIRECT: &str = "index.html";
pub const DEFAULT_ENSURE_ADMIN_RPC: &str = "ensure_admin";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Where the backend lives and which session to act as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub ensure_admin_rpc: String,
    pub timeouts: Timeouts,
}

impl BackendConfig {
    /// Signed-out config with default RPC name and timeouts. A trailing `/`
    /// on `supabase_url` is dropped.
    #[must_use]
    pub fn new(supabase_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.into(),
            access_token: None,
            ensure_admin_rpc: DEFAULT_ENSURE_ADMIN_RPC.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

/// Gate behavior: redirect targets, bootstrap hook, admin allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub login_redirect: String,
    pub admin_redirect: String,
    pub bootstrap_admin: bool,
    /// Lowercased emails treated as administrators regardless of the stored flag.
    pub admin_emails: Vec<String>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_owned(),
            admin_redirect: DEFAULT_ADMIN_REDIRECT.to_owned(),
            bootstrap_admin: false,
            admin_emails: Vec::new(),
        }
    }
}

impl GatePolicy {
    /// Whether `email` is on the configured administrator allow-list.
    #[must_use]
    pub fn is_allowlisted(&self, email: Option<&str>) -> bool {
        let Some(email) = email else { return false };
        let email = email.trim().to_ascii_lowercase();
        self.admin_emails.iter().any(|allowed| *allowed == email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub backend: BackendConfig,
    pub policy: GatePolicy,
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `SUPABASE_ACCESS_TOKEN`: signed out when absent
    /// - `AUTH_LOGIN_REDIRECT`: default `inloggen.html`
    /// - `AUTH_ADMIN_REDIRECT`: default `index.html`
    /// - `AUTH_BOOTSTRAP_ADMIN`: default false
    /// - `AUTH_ENSURE_ADMIN_RPC`: default `ensure_admin`
    /// - `AUTH_ADMIN_EMAILS`: comma-separated allow-list, default empty
    /// - `SUPABASE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SUPABASE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`AuthConfig::from_env`].
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut backend = BackendConfig::new(&required(&lookup, "SUPABASE_URL")?, required(&lookup, "SUPABASE_ANON_KEY")?);
        backend.access_token = lookup("SUPABASE_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(rpc) = lookup("AUTH_ENSURE_ADMIN_RPC") {
            backend.ensure_admin_rpc = rpc;
        }
        backend.timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "SUPABASE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "SUPABASE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let policy = GatePolicy {
            login_redirect: lookup("AUTH_LOGIN_REDIRECT").unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT.to_owned()),
            admin_redirect: lookup("AUTH_ADMIN_REDIRECT").unwrap_or_else(|| DEFAULT_ADMIN_REDIRECT.to_owned()),
            bootstrap_admin: parse_bool(lookup("AUTH_BOOTSTRAP_ADMIN").as_deref(), "AUTH_BOOTSTRAP_ADMIN")?,
            admin_emails: parse_email_list(lookup("AUTH_ADMIN_EMAILS").as_deref()),
        };

        Ok(Self { backend, policy })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { var })
}

/// Positive number of seconds. Zero would make every request time out.
fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else { return Ok(default) };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid { var, value: raw }),
    }
}

fn parse_bool(raw: Option<&str>, var: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = raw else { return Ok(false) };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { var, value: raw.to_owned() }),
    }
}

fn parse_email_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
