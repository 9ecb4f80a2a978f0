//! Login, session persistence and request interception against the mock API.

mod support;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempfile::tempdir;

use clinica::api::models::AppointmentStatus;
use clinica::config::ClientConfig;
use clinica::identity::{Role, SessionResolver, SessionStatus, UnauthenticatedReason};
use clinica::storage::{KvStore, MemoryStore, SharedTokenStore, ID_KEY, NAME_KEY, ROLE_KEY, TOKEN_KEY};
use clinica::views::{Alert, AppointmentForm, LoginForm, Operation, ProfileForm, TabKind, TreatmentForm};
use clinica::{AppError, ClinicClient};

use serde_json::json;

use support::{make_token, MockApi, PASSWORD, USER_EMAIL};

fn config(api: &MockApi, state_dir: &std::path::Path) -> ClientConfig {
    ClientConfig { base_url: api.base_url(), timeout_ms: 5_000, state_dir: state_dir.to_path_buf() }
}

fn ephemeral(api: &MockApi) -> ClinicClient {
    ClinicClient::ephemeral(&config(api, std::path::Path::new("unused"))).unwrap()
}

#[tokio::test]
async fn user_login_stores_token_and_dashboard_has_no_actions() {
    let api = MockApi::start().await;
    let dir = tempdir().unwrap();
    let client = ClinicClient::open(&config(&api, dir.path())).unwrap();

    let view = client.login(&LoginForm::new(USER_EMAIL, PASSWORD)).await.unwrap();
    assert_eq!(view.name, "Ana");
    assert_eq!(view.role, Role::User);

    let store = client.store();
    let token = store.get(TOKEN_KEY).unwrap().expect("token stored");
    assert_eq!(store.get(NAME_KEY).unwrap().as_deref(), Some("Ana"));
    assert_eq!(store.get(ID_KEY).unwrap().as_deref(), Some("1"));
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("user"));

    let dashboard = client.dashboard(9).await.unwrap();
    assert_eq!(dashboard.header.greeting, "Good morning");
    for tab in &dashboard.tabs {
        for card in &tab.cards {
            assert!(card.actions().is_empty(), "user card {} exposes actions", card.id);
        }
    }
    assert_eq!(dashboard.tab(TabKind::Pending).unwrap().cards[0].id, 10);

    let listing = api.last_request();
    assert_eq!(listing.path, "/appointment");
    assert_eq!(listing.authorization, Some(format!("Bearer {}", token)));
}

#[tokio::test]
async fn session_survives_reopen_and_logout_clears_it() {
    let api = MockApi::start().await;
    let dir = tempdir().unwrap();
    {
        let client = ClinicClient::open(&config(&api, dir.path())).unwrap();
        client.login(&LoginForm::new(USER_EMAIL, PASSWORD)).await.unwrap();
    }
    let reopened = ClinicClient::open(&config(&api, dir.path())).unwrap();
    assert!(reopened.session().is_authenticated());

    reopened.logout().unwrap();
    assert_eq!(reopened.session(), SessionStatus::Unauthenticated(UnauthenticatedReason::NoToken));

    let store = KvStore::open(dir.path()).unwrap();
    assert!(store.is_empty());
    assert!(matches!(reopened.dashboard(10).await, Err(AppError::Auth { .. })));
}

#[tokio::test]
async fn deleting_the_token_alone_ends_the_session() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    client.login(&LoginForm::new(USER_EMAIL, PASSWORD)).await.unwrap();
    client.store().remove(TOKEN_KEY).unwrap();
    assert_eq!(client.session(), SessionStatus::Unauthenticated(UnauthenticatedReason::NoToken));
}

#[tokio::test]
async fn bad_credentials_are_an_auth_error_and_store_nothing() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    let err = client.login(&LoginForm::new(USER_EMAIL, "wrong")).await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }), "{:?}", err);
    assert_eq!(err.message(), "Invalid credentials");
    assert_eq!(client.store().get(TOKEN_KEY).unwrap(), None);
    assert_eq!(Alert::failure(Operation::Login, &err).message, "Login failed. Check your credentials.");
}

#[tokio::test]
async fn requests_without_token_carry_no_authorization() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    let err = client.api().list_treatments().await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }));
    assert_eq!(api.last_request().authorization, None);
}

#[tokio::test]
async fn undecodable_token_is_withheld_and_role_is_not_refreshed() {
    let api = MockApi::start().await;
    let store: SharedTokenStore = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, "opaque.not-json.sig"), (ROLE_KEY, "user")]));
    let client = ClinicClient::new(&config(&api, std::path::Path::new("unused")), store.clone()).unwrap();

    let err = client.api().list_equipment().await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }), "{:?}", err);
    assert_eq!(api.last_request().authorization, None);
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("user"));

    let status = SessionResolver::new(store).resolve();
    let reason = match status {
        SessionStatus::Unauthenticated(r) => r,
        other => panic!("expected unauthenticated, got {:?}", other),
    };
    assert!(matches!(reason, UnauthenticatedReason::MalformedToken(_)));
    assert_eq!(Alert::session(&reason).unwrap().message, "Failed to load user information");
}

#[tokio::test]
async fn interceptor_refreshes_role_from_token() {
    let api = MockApi::start().await;
    let store: SharedTokenStore = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, api.admin_token()), (ROLE_KEY, "user".to_string())]));
    let client = ClinicClient::new(&config(&api, std::path::Path::new("unused")), store.clone()).unwrap();
    client.treatments("").await.unwrap();
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("admin"));
}

#[tokio::test]
async fn role_cache_follows_the_raw_role_claim() {
    let api = MockApi::start().await;
    let cases = [
        (json!({ "id": 1, "name": "Ana" }), "admin", "admin"),
        (json!({ "id": 1, "name": "Ana", "role": "owner" }), "user", "owner"),
        (json!({ "sub": "1", "role": "admin" }), "user", "admin"),
    ];
    for (payload, cached, expected) in cases {
        let token = make_token(&payload);
        let store: SharedTokenStore = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, token.as_str()), (ROLE_KEY, cached)]));
        let client = ClinicClient::new(&config(&api, std::path::Path::new("unused")), store.clone()).unwrap();
        client.api().list_equipment().await.unwrap();
        assert_eq!(api.last_request().authorization, Some(format!("Bearer {}", token)));
        assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some(expected), "payload {}", payload);
    }
}

#[tokio::test]
async fn malformed_payloads_surface_as_malformed() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    client.login(&LoginForm::new(support::ADMIN_EMAIL, PASSWORD)).await.unwrap();
    api.set_malformed(true);

    let err = client.api().list_appointments().await.unwrap_err();
    assert!(matches!(err, AppError::Malformed { .. }), "{:?}", err);
    assert!(err.message().contains("GET /appointment"));

    let err = client.feedback(true).await.unwrap_err();
    assert_eq!(err.code_str(), "invalid_rating");
}

#[tokio::test]
async fn invalid_forms_never_reach_the_network() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    client.login(&LoginForm::new(support::ADMIN_EMAIL, PASSWORD)).await.unwrap();
    let before = api.request_count();

    assert!(matches!(client.login(&LoginForm::new("", PASSWORD)).await, Err(AppError::Validation { .. })));
    let form = TreatmentForm { name: "Peeling".into(), description: "x".into(), price: "abc".into(), duration: "30".into() };
    assert!(matches!(client.update_treatment(101, &form).await, Err(AppError::Validation { .. })));
    let empty_profile = ProfileForm::default();
    assert!(matches!(client.save_profile(&empty_profile).await, Err(AppError::Validation { .. })));
    let no_treatment = AppointmentForm::new(Utc::now());
    assert!(matches!(client.book_appointment(&no_treatment).await, Err(AppError::Validation { .. })));

    assert_eq!(api.request_count(), before);
}

#[tokio::test]
async fn booking_uses_the_session_user_as_client() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    client.login(&LoginForm::new(USER_EMAIL, PASSWORD)).await.unwrap();

    let when: DateTime<Utc> = "2024-07-01T14:00:00Z".parse().unwrap();
    client.book_appointment(&AppointmentForm::new(when).with_treatment(100)).await.unwrap();

    let req = api.last_request();
    assert_eq!((req.method.as_str(), req.path.as_str()), ("POST", "/appointment"));
    assert_eq!(req.body["clientId"], 1);
    assert_eq!(req.body["treatmentId"], 100);
    assert_eq!(req.body["status"], AppointmentStatus::Pending.as_str());
    assert_eq!(req.body["date"], "2024-07-01T14:00:00Z");
}

#[tokio::test]
async fn saving_the_profile_renews_the_token() {
    let api = MockApi::start().await;
    let client = ephemeral(&api);
    client.login(&LoginForm::new(USER_EMAIL, PASSWORD)).await.unwrap();
    let old_token = client.store().get(TOKEN_KEY).unwrap().unwrap();

    let form = ProfileForm { name: "Ana Paula".into(), email: USER_EMAIL.into(), phone: Some("11 5555-0000".into()), ..Default::default() };
    let view = client.save_profile(&form).await.unwrap();
    assert_eq!(view.name, "Ana Paula");
    assert_eq!(client.store().get(NAME_KEY).unwrap().as_deref(), Some("Ana Paula"));
    assert_ne!(client.store().get(TOKEN_KEY).unwrap().unwrap(), old_token);

    let paths: Vec<String> = api.requests().iter().map(|r| format!("{} {}", r.method, r.path)).collect();
    assert_eq!(&paths[paths.len() - 2..], ["PATCH /user/1", "POST /auth/renew-token"]);
    assert_eq!(api.requests()[paths.len() - 1].body["token"], old_token.as_str());
}
