use super::*;
use crate::backend::test_helpers::{MockAuth, MockBackend, Reply, jo, jo_profile, jo_row, netherlands};

fn resolver(auth: MockAuth, backend: MockBackend) -> (ProfileResolver, Rc<MockAuth>, Rc<MockBackend>) {
    let auth = Rc::new(auth);
    let backend = Rc::new(backend);
    let resolver = ProfileResolver::new(auth.clone(), backend.clone());
    (resolver, auth, backend)
}

fn failing_primary() -> MockBackend {
    MockBackend {
        own_profile: Reply::Fail,
        profile_row: Reply::Ok(Some(jo_row(false))),
        country: Reply::Ok(Some(netherlands())),
        ..MockBackend::default()
    }
}

// =============================================================================
// Primary call
// =============================================================================

#[tokio::test]
async fn primary_row_is_returned_unmodified() {
    let (resolver, auth, backend) = resolver(MockAuth::signed_in(jo()), MockBackend::with_primary(jo_profile(true)));
    let outcome = resolver.resolve(&jo()).await;
    assert!(matches!(outcome, ProfileOutcome::Found { source: ProfileSource::Primary, .. }));
    assert_eq!(outcome.profile(), Some(&jo_profile(true)));
    assert_eq!(backend.calls(), vec!["get_own_profile"]);
    assert_eq!(auth.calls.get(), 0);
}

#[tokio::test]
async fn primary_takes_first_of_several_rows() {
    let mut second = jo_profile(false);
    second.id = "u2".into();
    let backend = MockBackend { own_profile: Reply::Ok(vec![jo_profile(true), second]), ..MockBackend::default() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    assert_eq!(resolver.resolve_profile(&jo()).await, Some(jo_profile(true)));
}

// =============================================================================
// Fallback lookup
// =============================================================================

#[tokio::test]
async fn primary_error_falls_back_to_store_reads() {
    let (resolver, auth, backend) = resolver(MockAuth::signed_in(jo()), failing_primary());
    let outcome = resolver.resolve(&jo()).await;

    let ProfileOutcome::Found { profile, source } = outcome else {
        panic!("expected a profile");
    };
    assert_eq!(source, ProfileSource::Fallback);
    assert_eq!(profile.id, "u1");
    assert_eq!(profile.display_name, "Jo");
    assert_eq!(profile.country_id.as_deref(), Some("NL"));
    assert_eq!(profile.country_name.as_deref(), Some("Netherlands"));
    assert_eq!(profile.email.as_deref(), Some("jo@x.com"));
    assert!(!profile.is_admin);
    assert!(profile.initialized);

    assert_eq!(auth.calls.get(), 1);
    assert_eq!(backend.calls(), vec!["get_own_profile", "profile_row:u1", "country:NL"]);
}

#[tokio::test]
async fn primary_empty_falls_back_too() {
    let backend = MockBackend { own_profile: Reply::Ok(Vec::new()), ..failing_primary() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    let outcome = resolver.resolve(&jo()).await;
    assert_eq!(outcome.status(), "found_fallback");
}

#[tokio::test]
async fn fallback_uses_refetched_principal() {
    let fresh = Principal::new("u1", Some("fresh@x.com"));
    let stale = Principal::new("stale", Some("old@x.com"));
    let (resolver, _, backend) = resolver(MockAuth::signed_in(fresh), failing_primary());
    let profile = resolver.resolve_profile(&stale).await.unwrap();
    assert_eq!(profile.id, "u1");
    assert_eq!(profile.email.as_deref(), Some("fresh@x.com"));
    assert!(backend.calls().contains(&"profile_row:u1".to_owned()));
}

#[tokio::test]
async fn country_failure_leaves_name_unset() {
    let backend = MockBackend { country: Reply::Fail, ..failing_primary() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    let profile = resolver.resolve_profile(&jo()).await.unwrap();
    assert_eq!(profile.country_id.as_deref(), Some("NL"));
    assert!(profile.country_name.is_none());
}

#[tokio::test]
async fn missing_country_row_leaves_name_unset() {
    let backend = MockBackend { country: Reply::Ok(None), ..failing_primary() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    let profile = resolver.resolve_profile(&jo()).await.unwrap();
    assert!(profile.country_name.is_none());
}

#[tokio::test]
async fn no_country_id_skips_country_lookup() {
    let mut row = jo_row(false);
    row.country_id = None;
    let backend = MockBackend { profile_row: Reply::Ok(Some(row)), ..failing_primary() };
    let (resolver, _, backend) = resolver(MockAuth::signed_in(jo()), backend);
    let profile = resolver.resolve_profile(&jo()).await.unwrap();
    assert!(profile.country_name.is_none());
    assert_eq!(backend.calls(), vec!["get_own_profile", "profile_row:u1"]);
}

#[tokio::test]
async fn no_profile_row_is_missing() {
    let backend = MockBackend { profile_row: Reply::Ok(None), ..failing_primary() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    let outcome = resolver.resolve(&jo()).await;
    assert!(matches!(outcome, ProfileOutcome::Missing(MissingReason::NoProfileRow)));
    assert!(outcome.profile().is_none());
    assert!(!outcome.is_admin());
}

#[tokio::test]
async fn principal_gone_during_fallback_is_missing() {
    let (resolver, _, backend) = resolver(MockAuth::signed_out(), failing_primary());
    let outcome = resolver.resolve(&jo()).await;
    assert!(matches!(outcome, ProfileOutcome::Missing(MissingReason::NoPrincipal)));
    assert_eq!(backend.calls(), vec!["get_own_profile"]);
}

#[tokio::test]
async fn provider_error_during_fallback_is_failed() {
    let (resolver, _, _) = resolver(MockAuth::failing(), failing_primary());
    let outcome = resolver.resolve(&jo()).await;
    assert!(outcome.is_failed());
    assert_eq!(outcome.status(), "failed");
    assert!(outcome.into_profile().is_none());
}

#[tokio::test]
async fn profile_store_error_is_failed() {
    let backend = MockBackend { profile_row: Reply::Fail, ..failing_primary() };
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), backend);
    assert!(resolver.resolve(&jo()).await.is_failed());
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn repeated_resolution_is_stable() {
    let (resolver, _, _) = resolver(MockAuth::signed_in(jo()), failing_primary());
    let first = resolver.resolve_profile(&jo()).await;
    let second = resolver.resolve_profile(&jo()).await;
    assert!(first.is_some());
    assert_eq!(first, second);
}
