//! Backend seams — auth provider and data API.
//!
//! DESIGN
//! ======
//! The gate and resolver only see these traits. [`supabase::SupabaseClient`]
//! implements both against GoTrue and PostgREST; tests use hand-written
//! mocks. Everything runs on one cooperative thread (browser event loop or
//! a current-thread runtime), so the traits are `?Send` and shared via `Rc`.

pub mod supabase;

#[cfg(test)]
pub(crate) mod test_helpers;

use crate::error::BackendError;
use crate::types::{Country, Principal, Profile, ProfileRow};

/// Session lookup. Session persistence and refresh belong to the provider.
#[async_trait::async_trait(?Send)]
pub trait AuthProvider {
    /// Return the principal of the active session, `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the provider cannot be reached or
    /// answers with something other than a user or an auth rejection.
    async fn current_principal(&self) -> Result<Option<Principal>, BackendError>;
}

/// Remote procedures and read-only stores behind the profile lookup.
#[async_trait::async_trait(?Send)]
pub trait ProfileBackend {
    /// Trusted "get own profile" procedure, scoped to the caller's session.
    /// Zero or one denormalized rows are expected.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport, status, or parse failure.
    async fn get_own_profile(&self) -> Result<Vec<Profile>, BackendError>;

    /// Idempotent "ensure admin provisioning" procedure. Output is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport or status failure.
    async fn ensure_admin_provisioning(&self) -> Result<(), BackendError>;

    /// Read the profile store row with the given id.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport, status, or parse failure.
    async fn profile_row(&self, id: &str) -> Result<Option<ProfileRow>, BackendError>;

    /// Read the country row with the given id.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport, status, or parse failure.
    async fn country(&self, id: &str) -> Result<Option<Country>, BackendError>;
}
