//! Browser bindings (`hydrate` feature): the web-sys navigator and nav
//! surface, plus [`AuthHandle`], the JS-facing entry point for page scripts.
//!
//! ```js
//! const auth = new AuthHandle(SUPABASE_URL, SUPABASE_ANON_KEY, session?.access_token);
//! await auth.navRender(document.getElementById("nav"));
//! const check = await auth.requireAdmin();
//! ```

use std::rc::Rc;

use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlElement;

use crate::backend::supabase::SupabaseClient;
use crate::config::{BackendConfig, GatePolicy};
use crate::gate::{Navigator, SessionGate};
use crate::nav::{NavBar, NavSlot, NavSurface};

/// Navigates by assigning `window.location.href`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, target: &str) {
        let Some(window) = web_sys::window() else { return };
        if let Err(e) = window.location().set_href(target) {
            tracing::warn!(target_url = target, error = ?e, "redirect failed");
        }
    }
}

/// Writes into a host element and toggles slots by element id.
pub struct DomSurface {
    host: web_sys::Element,
}

impl DomSurface {
    #[must_use]
    pub fn new(host: web_sys::Element) -> Self {
        Self { host }
    }

    /// Surface backed by the element with id `host_id`, if present.
    #[must_use]
    pub fn by_id(host_id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        document.get_element_by_id(host_id).map(Self::new)
    }
}

impl NavSurface for DomSurface {
    fn inject(&self, html: &str) {
        self.host.set_inner_html(html);
    }

    fn set_visible(&self, slot: NavSlot, visible: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else { return };
        let Some(element) = document
            .get_element_by_id(slot.id())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let display = if visible { "inline-block" } else { "none" };
        if let Err(e) = element.style().set_property("display", display) {
            tracing::warn!(slot = slot.id(), error = ?e, "failed to set slot visibility");
        }
    }
}

// =============================================================================
// JS EXPORTS
// =============================================================================

/// Session gate wired to Supabase, the browser location and the page DOM.
///
/// Uses the default redirect targets and no admin allow-list or bootstrap.
#[wasm_bindgen]
pub struct AuthHandle {
    gate: Rc<SessionGate>,
}

#[wasm_bindgen]
impl AuthHandle {
    /// # Errors
    ///
    /// Rejects when the HTTP client cannot be built.
    #[wasm_bindgen(constructor)]
    pub fn new(supabase_url: &str, anon_key: String, access_token: Option<String>) -> Result<AuthHandle, JsValue> {
        let mut backend = BackendConfig::new(supabase_url, anon_key);
        backend.access_token = access_token.filter(|t| !t.trim().is_empty());
        let client = Rc::new(SupabaseClient::new(&backend).map_err(|e| JsValue::from_str(&e.to_string()))?);
        let gate = SessionGate::new(client.clone(), client, Rc::new(BrowserNavigator), GatePolicy::default());
        Ok(Self { gate: Rc::new(gate) })
    }

    /// Resolves to the principal, or `null` after redirecting to `redirect`
    /// (default `inloggen.html`).
    #[wasm_bindgen(js_name = requireAuth)]
    pub fn require_auth(&self, redirect: Option<String>) -> Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let target = redirect.unwrap_or_else(|| gate.login_redirect().to_owned());
            let principal = gate.require_authenticated(&target).await;
            to_js(&principal)
        })
    }

    /// Resolves to `{ principal, profile, granted }`. Redirects to `redirect`
    /// (default `index.html`) when not granted.
    #[wasm_bindgen(js_name = requireAdmin)]
    pub fn require_admin(&self, redirect: Option<String>) -> Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let target = redirect.unwrap_or_else(|| gate.admin_redirect().to_owned());
            let check = gate.require_administrator(&target).await;
            to_js(&serde_json::json!({
                "principal": check.principal,
                "profile": check.profile(),
                "granted": check.granted,
            }))
        })
    }

    /// Inject the nav fragment into `host` and apply the session's visibility.
    #[wasm_bindgen(js_name = navRender)]
    pub fn nav_render(&self, host: web_sys::Element) -> Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let visibility = NavBar::new(&gate).render(&DomSurface::new(host)).await;
            to_js(&visibility)
        })
    }

    /// Re-apply visibility to an already rendered nav.
    #[wasm_bindgen(js_name = navRefresh)]
    pub fn nav_refresh(&self, host: web_sys::Element) -> Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let visibility = NavBar::new(&gate).refresh(&DomSurface::new(host)).await;
            to_js(&visibility)
        })
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

#[cfg(all(test, target_arch = "wasm32"))]
#[path = "dom_test.rs"]
mod tests;
