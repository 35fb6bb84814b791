//! # multisport-auth
//!
//! Client-side authentication helper for the Multisport-Manager front end.
//! Answers three questions for every page load: who is signed in, is that
//! user an administrator, and which navigation links should be visible.
//!
//! The backend (Supabase auth + data API) is reached only through the
//! [`backend::AuthProvider`] and [`backend::ProfileBackend`] traits; the
//! host environment only through [`gate::Navigator`] and
//! [`nav::NavSurface`]. All of them are passed in explicitly.

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod nav;
pub mod resolver;
pub mod types;

#[cfg(feature = "hydrate")]
pub mod dom;

pub use backend::supabase::SupabaseClient;
pub use config::{AuthConfig, GatePolicy};
pub use error::{BackendError, ConfigError};
pub use gate::{AdminCheck, Navigator, RecordingNavigator, SessionGate};
pub use nav::{NavBar, NavSlot, NavSurface, NavVisibility};
pub use resolver::{ProfileOutcome, ProfileResolver, ProfileSource};
pub use types::{Country, Principal, Profile, ProfileRow};
