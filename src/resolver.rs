//! Profile resolution — trusted RPC first, direct store reads as fallback.
//!
//! DESIGN
//! ======
//! One attempt per call, no caching, no retries:
//!
//! ```text
//! START -> PRIMARY -> Found
//!                  \-> FALLBACK -> principal -> profile row -> country -> Found
//!                                \-> Missing | Failed
//! ```
//!
//! ERROR HANDLING
//! ==============
//! Nothing propagates. Backend failures are logged and surface as
//! [`ProfileOutcome::Failed`] so callers can tell "not an admin" apart from
//! "could not find out". A failed country lookup only leaves the country
//! name unset.

use std::rc::Rc;

use serde::Serialize;

use crate::backend::{AuthProvider, ProfileBackend};
use crate::error::BackendError;
use crate::types::{Principal, Profile};

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

// =============================================================================
// OUTCOME
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    NoPrincipal,
    NoProfileRow,
}

/// Result of one resolution attempt.
#[derive(Debug)]
pub enum ProfileOutcome {
    Found { profile: Profile, source: ProfileSource },
    Missing(MissingReason),
    Failed(BackendError),
}

impl ProfileOutcome {
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Found { profile, .. } => Some(profile),
            Self::Missing(_) | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn into_profile(self) -> Option<Profile> {
        match self {
            Self::Found { profile, .. } => Some(profile),
            Self::Missing(_) | Self::Failed(_) => None,
        }
    }

    /// `true` only for a found profile carrying the admin flag.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile().is_some_and(|p| p.is_admin)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short machine-readable status for logs and CLI output.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Found { source: ProfileSource::Primary, .. } => "found_primary",
            Self::Found { source: ProfileSource::Fallback, .. } => "found_fallback",
            Self::Missing(MissingReason::NoPrincipal) => "no_principal",
            Self::Missing(MissingReason::NoProfileRow) => "no_profile_row",
            Self::Failed(_) => "failed",
        }
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

#[derive(Clone)]
pub struct ProfileResolver {
    auth: Rc<dyn AuthProvider>,
    backend: Rc<dyn ProfileBackend>,
}

impl ProfileResolver {
    #[must_use]
    pub fn new(auth: Rc<dyn AuthProvider>, backend: Rc<dyn ProfileBackend>) -> Self {
        Self { auth, backend }
    }

    /// Resolve the profile of the signed-in user.
    ///
    /// `principal` is the caller's view of the session; the fallback path
    /// re-reads the principal from the provider and uses that instead.
    pub async fn resolve(&self, principal: &Principal) -> ProfileOutcome {
        match self.backend.get_own_profile().await {
            Ok(rows) => {
                if let Some(profile) = rows.into_iter().next() {
                    if profile.id != principal.id {
                        tracing::warn!(principal = %principal.id, profile = %profile.id, "primary profile id differs from principal");
                    }
                    tracing::debug!(principal = %principal.id, "profile resolved by primary call");
                    return ProfileOutcome::Found { profile, source: ProfileSource::Primary };
                }
                tracing::debug!(principal = %principal.id, "primary profile call returned no rows; falling back");
            }
            Err(e) => {
                tracing::warn!(principal = %principal.id, code = e.error_code(), error = %e, "primary profile call failed; falling back");
            }
        }
        self.resolve_fallback().await
    }

    /// [`ProfileResolver::resolve`] collapsed to "profile or nothing".
    pub async fn resolve_profile(&self, principal: &Principal) -> Option<Profile> {
        self.resolve(principal).await.into_profile()
    }

    async fn resolve_fallback(&self) -> ProfileOutcome {
        let principal = match self.auth.current_principal().await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                tracing::debug!("fallback: no principal");
                return ProfileOutcome::Missing(MissingReason::NoPrincipal);
            }
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "fallback: principal lookup failed");
                return ProfileOutcome::Failed(e);
            }
        };

        let row = match self.backend.profile_row(&principal.id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::debug!(principal = %principal.id, "fallback: no profile row");
                return ProfileOutcome::Missing(MissingReason::NoProfileRow);
            }
            Err(e) => {
                tracing::warn!(principal = %principal.id, code = e.error_code(), error = %e, "fallback: profile read failed");
                return ProfileOutcome::Failed(e);
            }
        };

        let country_name = match row.country_id.as_deref() {
            Some(country_id) => self.country_name(country_id).await,
            None => None,
        };

        let mut profile = Profile::assemble(row, principal.email, country_name);
        // The store row is keyed by the principal id; keep them identical.
        profile.id = principal.id;
        tracing::debug!(profile = %profile.id, "profile resolved by fallback lookup");
        ProfileOutcome::Found { profile, source: ProfileSource::Fallback }
    }

    async fn country_name(&self, country_id: &str) -> Option<String> {
        match self.backend.country(country_id).await {
            Ok(Some(country)) => Some(country.name),
            Ok(None) => {
                tracing::debug!(country = country_id, "fallback: no country row");
                None
            }
            Err(e) => {
                tracing::warn!(country = country_id, code = e.error_code(), error = %e, "fallback: country read failed");
                None
            }
        }
    }
}
