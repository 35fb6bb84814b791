//! Session gate — authenticated and administrator checks.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page asks the gate before rendering protected content. A failed
//! check issues a redirect through the injected [`Navigator`] and still
//! returns: navigation is a request to the host, not a hard stop, so
//! callers keep running and must tolerate empty values.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{AuthProvider, ProfileBackend};
use crate::config::GatePolicy;
use crate::resolver::{ProfileOutcome, ProfileResolver};
use crate::types::{Principal, Profile};

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;

// =============================================================================
// NAVIGATION
// =============================================================================

/// Redirect-by-URL side effect of the host environment.
pub trait Navigator {
    fn redirect(&self, target: &str);
}

/// Navigator that only remembers requested targets.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        self.targets.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.targets.borrow().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, target: &str) {
        self.targets.borrow_mut().push(target.to_owned());
    }
}

// =============================================================================
// ADMIN CHECK
// =============================================================================

/// Everything gathered by [`SessionGate::require_administrator`].
#[derive(Debug)]
pub struct AdminCheck {
    pub principal: Option<Principal>,
    /// `None` when no principal was found and resolution was skipped.
    pub outcome: Option<ProfileOutcome>,
    pub granted: bool,
}

impl AdminCheck {
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.outcome.as_ref().and_then(ProfileOutcome::profile)
    }
}

// =============================================================================
// GATE
// =============================================================================

pub struct SessionGate {
    auth: Rc<dyn AuthProvider>,
    backend: Rc<dyn ProfileBackend>,
    resolver: ProfileResolver,
    navigator: Rc<dyn Navigator>,
    policy: GatePolicy,
}

impl SessionGate {
    #[must_use]
    pub fn new(
        auth: Rc<dyn AuthProvider>,
        backend: Rc<dyn ProfileBackend>,
        navigator: Rc<dyn Navigator>,
        policy: GatePolicy,
    ) -> Self {
        let resolver = ProfileResolver::new(auth.clone(), backend.clone());
        Self { auth, backend, resolver, navigator, policy }
    }

    #[must_use]
    pub fn resolver(&self) -> &ProfileResolver {
        &self.resolver
    }

    /// Default target for unauthenticated visitors.
    #[must_use]
    pub fn login_redirect(&self) -> &str {
        &self.policy.login_redirect
    }

    /// Default target for signed-in visitors without admin rights.
    #[must_use]
    pub fn admin_redirect(&self) -> &str {
        &self.policy.admin_redirect
    }

    /// The active principal. Provider errors count as signed out.
    pub async fn current_principal(&self) -> Option<Principal> {
        match self.auth.current_principal().await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "principal lookup failed; treating as signed out");
                None
            }
        }
    }

    /// Return the principal, or redirect to `redirect_target` and return `None`.
    pub async fn require_authenticated(&self, redirect_target: &str) -> Option<Principal> {
        let principal = self.current_principal().await;
        if principal.is_none() {
            self.redirect(redirect_target, "not signed in");
        }
        principal
    }

    /// Require a signed-in administrator; otherwise redirect to `redirect_target`.
    ///
    /// A visitor without a session is redirected once, and no profile
    /// lookup is made.
    pub async fn require_administrator(&self, redirect_target: &str) -> AdminCheck {
        let Some(principal) = self.require_authenticated(redirect_target).await else {
            return AdminCheck { principal: None, outcome: None, granted: false };
        };

        let outcome = self.admin_outcome(&principal).await;
        let granted = self.grants_admin(&principal, &outcome);
        if !granted {
            self.redirect(redirect_target, "not an administrator");
        }
        AdminCheck { principal: Some(principal), outcome: Some(outcome), granted }
    }

    /// Run the provisioning hook (when enabled) and resolve the profile.
    async fn admin_outcome(&self, principal: &Principal) -> ProfileOutcome {
        if self.policy.bootstrap_admin {
            self.bootstrap_admin().await;
        }
        self.resolver.resolve(principal).await
    }

    /// Stored admin flag, or an allow-listed principal email.
    pub(crate) fn grants_admin(&self, principal: &Principal, outcome: &ProfileOutcome) -> bool {
        if outcome.is_admin() {
            return true;
        }
        if self.policy.is_allowlisted(principal.email.as_deref()) {
            tracing::info!(principal = %principal.id, "administrator granted by email allow-list");
            return true;
        }
        false
    }

    async fn bootstrap_admin(&self) {
        if let Err(e) = self.backend.ensure_admin_provisioning().await {
            tracing::warn!(code = e.error_code(), error = %e, "admin provisioning failed; continuing");
        }
    }

    fn redirect(&self, target: &str, reason: &'static str) {
        tracing::info!(target_url = target, reason, "redirecting");
        self.navigator.redirect(target);
    }
}
