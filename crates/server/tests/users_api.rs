//! Integration tests for the user and auth endpoints.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use comanda_server::store::{Collection, MemoryRemoteStore};

use common::{json_request, send, settle, test_app};

async fn create_user(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    send(app.clone(), json_request(Method::POST, "/users", &body)).await
}

#[tokio::test]
async fn creating_a_waiter_with_cedula_uses_it_as_password() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, body) = create_user(
        &app,
        json!({"name": "Marta", "email": "marta@x.co", "role": "waiter", "cedula": "123"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let user = body.get("user").unwrap();
    assert_eq!(user.get("password"), Some(&json!("123")));
    assert_eq!(user.get("temporaryPassword"), Some(&json!(false)));
    assert!(body.get("tempPassword").is_none());
}

#[tokio::test]
async fn creating_an_admin_returns_the_temporary_password_once() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, body) = create_user(
        &app,
        json!({"name": "Root", "email": "root@x.co", "role": "admin"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let temp = body.get("tempPassword").unwrap().as_str().unwrap();
    assert_eq!(temp.len(), 8);
    assert_eq!(
        body.get("user").unwrap().get("temporaryPassword").unwrap(),
        &json!(true)
    );
}

#[tokio::test]
async fn creating_a_client_assigns_no_password() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, body) = create_user(
        &app,
        json!({"name": "Ana", "email": "ana@x.co", "role": "client"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let user = body.get("user").unwrap();
    assert!(user.get("password").is_none());
    assert_eq!(user.get("temporaryPassword").unwrap(), &json!(false));
}

#[tokio::test]
async fn duplicate_emails_conflict_regardless_of_case() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    create_user(
        &app,
        json!({"name": "Ana", "email": "ana@x.co", "role": "client"}),
    )
    .await;
    let (status, body) = create_user(
        &app,
        json!({"name": "Otra", "email": "ANA@X.CO", "role": "client"}),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn created_users_are_pushed_to_the_remote_store() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, _) = create_user(
        &app,
        json!({"name": "Ana", "email": "ana@x.co", "role": "client"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    settle().await;
    let rows = store.rows(Collection::Users);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.first().unwrap().get("email"), Some(&json!("ana@x.co")));
}

#[tokio::test]
async fn login_matches_emails_case_insensitively() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    create_user(
        &app,
        json!({"name": "Marta", "email": "Marta@Example.COM", "role": "waiter", "cedula": "123"}),
    )
    .await;

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "marta@example.com", "password": "123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("isTemporaryPassword"), Some(&json!(false)));
    assert_eq!(
        body.get("user").unwrap().get("email"),
        Some(&json!("Marta@Example.COM"))
    );
}

#[tokio::test]
async fn clients_log_in_with_any_password() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    create_user(
        &app,
        json!({"name": "Ana", "email": "ana@x.co", "role": "client"}),
    )
    .await;

    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "ana@x.co", "password": "whatever"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures_map_to_status_codes() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    create_user(
        &app,
        json!({"name": "Marta", "email": "marta@x.co", "role": "waiter", "cedula": "123"}),
    )
    .await;

    // Unknown user
    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "nobody@x.co", "password": "123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password
    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "marta@x.co", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right password, wrong role
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "marta@x.co", "password": "123", "requiredRole": "admin"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn password_reset_clears_the_temporary_flag() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (_, body) = create_user(
        &app,
        json!({"name": "Root", "email": "root@x.co", "role": "admin"}),
    )
    .await;
    let temp = body
        .get("tempPassword")
        .unwrap()
        .as_str()
        .unwrap()
        .to_owned();

    let (status, body) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "root@x.co", "password": temp}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("isTemporaryPassword").unwrap(), &json!(true));

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/password",
            &json!({"email": "root@x.co", "newPassword": "nuevo-secreto"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Old temporary password is gone, new one works and is permanent.
    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "root@x.co", "password": temp}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "root@x.co", "password": "nuevo-secreto"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("isTemporaryPassword").unwrap(), &json!(false));
}

#[tokio::test]
async fn updating_a_waiters_cedula_resyncs_their_password() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (_, body) = create_user(
        &app,
        json!({"name": "Marta", "email": "marta@x.co", "role": "waiter", "cedula": "123"}),
    )
    .await;
    let id = body.get("user").unwrap().get("id").unwrap().as_i64().unwrap();

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::PATCH,
            &format!("/users/{id}"),
            &json!({"cedula": "999"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "marta@x.co", "password": "999"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleted_users_can_no_longer_log_in() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (_, body) = create_user(
        &app,
        json!({"name": "Ana", "email": "ana@x.co", "role": "client"}),
    )
    .await;
    let id = body.get("user").unwrap().get("id").unwrap().as_i64().unwrap();

    let (status, _) = send(
        app.clone(),
        json_request(Method::DELETE, &format!("/users/{id}"), &json!(null)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/auth/login",
            &json!({"email": "ana@x.co", "password": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Deleting again is a 404.
    let (status, _) = send(
        app,
        json_request(Method::DELETE, &format!("/users/{id}"), &json!(null)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_user_updates_return_not_found() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, _) = send(
        app,
        json_request(Method::PATCH, "/users/99", &json!({"name": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
