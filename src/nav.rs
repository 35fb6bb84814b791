//! Shared navigation bar.
//!
//! The fragment is static markup. Only three links change with the session:
//! `adminLink` for administrators, `loginLink` and `signupLink` for
//! signed-out visitors.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;

use crate::gate::SessionGate;

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;

pub const NAV_FRAGMENT: &str = r#"<header class="nav">
  <a href="index.html" class="logo">Multisport-Manager</a>
  <nav>
    <a href="index.html">Home</a>
    <a href="manager.html">Manager</a>
    <a href="training.html">Training</a>
    <a href="scouten.html">Scout</a>
    <a href="admin.html" id="adminLink" style="display:none">Admin</a>
    <a href="uitloggen.html">Uitloggen</a>
    <a href="inloggen.html" id="loginLink" style="display:none">Inloggen</a>
    <a href="inschrijven.html" id="signupLink" style="display:none">Inschrijven</a>
  </nav>
</header>"#;

const SHOWN: &str = "display:inline-block";
const HIDDEN: &str = "display:none";

// =============================================================================
// SLOTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavSlot {
    AdminLink,
    LoginLink,
    SignupLink,
}

impl NavSlot {
    pub const ALL: [NavSlot; 3] = [NavSlot::AdminLink, NavSlot::LoginLink, NavSlot::SignupLink];

    /// Element id of the slot inside [`NAV_FRAGMENT`].
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::AdminLink => "adminLink",
            Self::LoginLink => "loginLink",
            Self::SignupLink => "signupLink",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavVisibility {
    pub admin: bool,
    pub login: bool,
    pub signup: bool,
}

impl NavVisibility {
    #[must_use]
    pub fn signed_out() -> Self {
        Self { admin: false, login: true, signup: true }
    }

    #[must_use]
    pub fn signed_in(is_admin: bool) -> Self {
        Self { admin: is_admin, login: false, signup: false }
    }

    #[must_use]
    pub fn get(&self, slot: NavSlot) -> bool {
        match slot {
            NavSlot::AdminLink => self.admin,
            NavSlot::LoginLink => self.login,
            NavSlot::SignupLink => self.signup,
        }
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Presentation surface the navigation bar is drawn into.
pub trait NavSurface {
    /// Replace the surface content with `html`.
    fn inject(&self, html: &str);

    /// Show or hide a slot. Missing slots are ignored.
    fn set_visible(&self, slot: NavSlot, visible: bool);
}

/// Headless surface; keeps the injected markup and slot state in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    html: RefCell<Option<String>>,
    slots: RefCell<HashMap<NavSlot, bool>>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn html(&self) -> Option<String> {
        self.html.borrow().clone()
    }

    /// Slot state; `None` until the slot has been written.
    #[must_use]
    pub fn visible(&self, slot: NavSlot) -> Option<bool> {
        self.slots.borrow().get(&slot).copied()
    }
}

impl NavSurface for MemorySurface {
    fn inject(&self, html: &str) {
        *self.html.borrow_mut() = Some(html.to_owned());
        self.slots.borrow_mut().clear();
    }

    fn set_visible(&self, slot: NavSlot, visible: bool) {
        self.slots.borrow_mut().insert(slot, visible);
    }
}

// =============================================================================
// NAV BAR
// =============================================================================

pub struct NavBar<'a> {
    gate: &'a SessionGate,
}

impl<'a> NavBar<'a> {
    #[must_use]
    pub fn new(gate: &'a SessionGate) -> Self {
        Self { gate }
    }

    /// Inject the fragment, then apply the current session's visibility.
    pub async fn render(&self, surface: &dyn NavSurface) -> NavVisibility {
        surface.inject(NAV_FRAGMENT);
        self.refresh(surface).await
    }

    /// Recompute visibility and write every slot.
    pub async fn refresh(&self, surface: &dyn NavSurface) -> NavVisibility {
        let visibility = self.visibility().await;
        for slot in NavSlot::ALL {
            surface.set_visible(slot, visibility.get(slot));
        }
        visibility
    }

    /// Signed-out visitors never trigger a profile lookup.
    pub async fn visibility(&self) -> NavVisibility {
        let Some(principal) = self.gate.current_principal().await else {
            return NavVisibility::signed_out();
        };
        let outcome = self.gate.resolver().resolve(&principal).await;
        NavVisibility::signed_in(self.gate.grants_admin(&principal, &outcome))
    }
}

/// Server-side rendering of [`NAV_FRAGMENT`] with `visibility` applied.
#[must_use]
pub fn render_html(visibility: NavVisibility) -> String {
    NavSlot::ALL.into_iter().fold(NAV_FRAGMENT.to_owned(), |html, slot| {
        let hidden = format!(r#"id="{}" style="{HIDDEN}""#, slot.id());
        let style = if visibility.get(slot) { SHOWN } else { HIDDEN };
        html.replace(&hidden, &format!(r#"id="{}" style="{style}""#, slot.id()))
    })
}
