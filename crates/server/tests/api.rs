use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db.clone()).build();
    router(ServerState {
        engine: std::sync::Arc::new(engine),
        db,
    })
}

fn basic(email: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{email}:{password}"));
    format!("Basic {encoded}")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Rejections (e.g. 401 from the auth layer) carry non-JSON bodies.
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn patch_json(uri: &str, auth: &str, body: Value) -> Request<Body> {
    Request::patch(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, auth)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/users",
            None,
            json!({
                "name": name,
                "email": format!("{name}@example.com"),
                "password": "secret",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, _) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_auth_is_unauthorized() {
    let app = app().await;
    let (status, _) = send(&app, get("/groups", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A header the Basic scheme cannot parse is a 401 too, not a 400.
    let (status, _) = send(&app, get("/groups", Some("Bearer whatever"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        get("/groups", Some(&basic("ghost@example.com", "nope"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_duplicate_email() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        post_json(
            "/login",
            None,
            json!({"email": "alice@example.com", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "alice");

    let (status, _) = send(
        &app,
        post_json(
            "/login",
            None,
            json!({"email": "alice@example.com", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/users",
            None,
            json!({
                "name": "impostor",
                "email": "alice@example.com",
                "password": "other",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn expense_flow_over_http() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let alice_auth = basic("alice@example.com", "secret");
    let bob_auth = basic("bob@example.com", "secret");

    let (status, body) = send(
        &app,
        post_json(
            "/groups",
            Some(&alice_auth),
            json!({"name": "Flat", "description": null}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json(
            &format!("/groups/{group}/members"),
            Some(&alice_auth),
            json!({"emails": ["bob@example.com", "nobody@example.com"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], json!([bob]));

    // Non-admin cannot invite.
    let (status, _) = send(
        &app,
        post_json(
            &format!("/groups/{group}/members"),
            Some(&bob_auth),
            json!({"emails": ["nobody@example.com"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        post_json(
            "/transactions",
            Some(&alice_auth),
            json!({
                "group_id": group,
                "kind": "expense",
                "description": "dinner",
                "amount_minor": 3000,
                "payer_id": alice,
                "recipient_id": null,
                "shares": null,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        get(&format!("/groups/{group}/balances"), Some(&bob_auth)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let balances = body["balances"].as_array().unwrap();
    assert_eq!(balances.len(), 2);
    for entry in balances {
        let expected = if entry["member_id"] == json!(alice) {
            1500
        } else {
            -1500
        };
        assert_eq!(entry["balance_minor"], json!(expected));
    }

    // Bob was notified, alice was not.
    let (status, body) = send(&app, get("/notifications", Some(&bob_auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 1);
    assert_eq!(
        body["notifications"][0]["message"],
        "alice added \"dinner\" for 30.00€ in \"Flat\""
    );
    let notification = body["notifications"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/notifications", Some(&alice_auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 0);

    let (status, _) = send(
        &app,
        patch_json(&format!("/notifications/{notification}"), &bob_auth, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Bob settles his share; the expense completes.
    let (status, _) = send(
        &app,
        patch_json(
            &format!("/transactions/{tx}/participants/{bob}"),
            &bob_auth,
            json!({"paid": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get(&format!("/groups/{group}"), Some(&alice_auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"][0]["status"], "completed");
    assert_eq!(body["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn payment_confirmation_over_http() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let alice_auth = basic("alice@example.com", "secret");
    let bob_auth = basic("bob@example.com", "secret");

    let (_, body) = send(
        &app,
        post_json("/groups", Some(&alice_auth), json!({"name": "Flat"})),
    )
    .await;
    let group = body["id"].as_str().unwrap().to_string();
    send(
        &app,
        post_json(
            &format!("/groups/{group}/members"),
            Some(&alice_auth),
            json!({"emails": ["bob@example.com"]}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json(
            "/transactions",
            Some(&bob_auth),
            json!({
                "group_id": group,
                "kind": "payment",
                "description": "settling up",
                "amount_minor": 1500,
                "payer_id": bob,
                "recipient_id": alice,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx = body["id"].as_str().unwrap().to_string();

    // Pending payments do not move balances.
    let (_, body) = send(
        &app,
        get(&format!("/groups/{group}/balances"), Some(&alice_auth)),
    )
    .await;
    for entry in body["balances"].as_array().unwrap() {
        assert_eq!(entry["balance_minor"], 0);
    }

    // The payer cannot confirm their own payment.
    let (status, _) = send(
        &app,
        post_json(
            &format!("/transactions/{tx}/confirm"),
            Some(&bob_auth),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        post_json(
            &format!("/transactions/{tx}/confirm"),
            Some(&alice_auth),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app,
        get(&format!("/groups/{group}/balances"), Some(&alice_auth)),
    )
    .await;
    for entry in body["balances"].as_array().unwrap() {
        let expected = if entry["member_id"] == json!(alice) {
            1500
        } else {
            -1500
        };
        assert_eq!(entry["balance_minor"], json!(expected));
    }
}

#[tokio::test]
async fn feed_rejects_garbage_cursor() {
    let app = app().await;
    register(&app, "alice").await;
    let auth = basic("alice@example.com", "secret");

    let (status, _) = send(&app, get("/transactions?cursor=garbage", Some(&auth))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/transactions", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["transactions"].as_array().unwrap().is_empty());
    assert!(body["next_cursor"].is_null());
}
