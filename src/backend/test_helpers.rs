//! Scripted mocks for the backend seams.

use std::cell::{Cell, RefCell};

use super::{AuthProvider, ProfileBackend};
use crate::error::BackendError;
use crate::types::{Country, Principal, Profile, ProfileRow};

/// How a mocked call answers.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail,
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> Result<T, BackendError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Fail => Err(BackendError::Request("connection refused".into())),
        }
    }
}

// =============================================================================
// MockAuth
// =============================================================================

pub struct MockAuth {
    reply: Reply<Option<Principal>>,
    pub calls: Cell<usize>,
}

impl MockAuth {
    pub fn signed_in(principal: Principal) -> Self {
        Self { reply: Reply::Ok(Some(principal)), calls: Cell::new(0) }
    }

    pub fn signed_out() -> Self {
        Self { reply: Reply::Ok(None), calls: Cell::new(0) }
    }

    pub fn failing() -> Self {
        Self { reply: Reply::Fail, calls: Cell::new(0) }
    }
}

#[async_trait::async_trait(?Send)]
impl AuthProvider for MockAuth {
    async fn current_principal(&self) -> Result<Option<Principal>, BackendError> {
        self.calls.set(self.calls.get() + 1);
        self.reply.get()
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// Backend with one scripted reply per operation and a call log.
pub struct MockBackend {
    pub own_profile: Reply<Vec<Profile>>,
    pub ensure_admin: Reply<()>,
    pub profile_row: Reply<Option<ProfileRow>>,
    pub country: Reply<Option<Country>>,
    pub calls: RefCell<Vec<String>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            own_profile: Reply::Ok(Vec::new()),
            ensure_admin: Reply::Ok(()),
            profile_row: Reply::Ok(None),
            country: Reply::Ok(None),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn with_primary(profile: Profile) -> Self {
        Self { own_profile: Reply::Ok(vec![profile]), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait::async_trait(?Send)]
impl ProfileBackend for MockBackend {
    async fn get_own_profile(&self) -> Result<Vec<Profile>, BackendError> {
        self.record("get_own_profile".into());
        self.own_profile.get()
    }

    async fn ensure_admin_provisioning(&self) -> Result<(), BackendError> {
        self.record("ensure_admin_provisioning".into());
        self.ensure_admin.get()
    }

    async fn profile_row(&self, id: &str) -> Result<Option<ProfileRow>, BackendError> {
        self.record(format!("profile_row:{id}"));
        self.profile_row.get()
    }

    async fn country(&self, id: &str) -> Result<Option<Country>, BackendError> {
        self.record(format!("country:{id}"));
        self.country.get()
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn jo() -> Principal {
    Principal::new("u1", Some("jo@x.com"))
}

pub fn jo_row(is_admin: bool) -> ProfileRow {
    ProfileRow {
        id: "u1".into(),
        display_name: "Jo".into(),
        country_id: Some("NL".into()),
        merit_points: 0.0,
        is_admin,
        initialized: true,
    }
}

pub fn jo_profile(is_admin: bool) -> Profile {
    Profile {
        id: "u1".into(),
        display_name: "Jo".into(),
        country_id: Some("NL".into()),
        country_name: Some("Netherlands".into()),
        email: Some("jo@x.com".into()),
        merit_points: 42.0,
        is_admin,
        initialized: true,
    }
}

pub fn netherlands() -> Country {
    Country { id: Some("NL".into()), name: "Netherlands".into() }
}
