mod common;

use chrono::{Duration, Utc};
use hyper::StatusCode;

use gamereviews::database::{comments, ratings, sessions, users};
use shared::types::{CookiePayload, RatingScore, RegistrationError};

use common::*;

fn cookie_value(pair: &str) -> &str {
    pair.split_once('=').map(|(_, v)| v).unwrap_or_default()
}

fn registration(username: &str, email: &str, password: &str, confirm: &str) -> String {
    form(&[
        ("username", username),
        ("email", email),
        ("password", password),
        ("confirm_password", confirm),
    ])
}

// ---------------------------------------------------------------------------
// Register / login / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_then_login_issues_a_matching_session() {
    let app = TestApp::new().await;

    let res = app
        .post("/register", None, &registration("alice", "a@x.com", "Passw0rd", "Passw0rd"))
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");

    let user = users::find_user_by_email(app.db(), "a@x.com").await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let res = app
        .post("/login", None, &form(&[("email", "a@x.com"), ("password", "Passw0rd")]))
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");

    let header = set_cookie(&res).unwrap();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Expires="));
    assert!(header.contains("Max-Age="));

    let pair = cookie_pair(&res).unwrap();
    let payload = app.codec.decode(cookie_value(&pair)).unwrap();
    assert_eq!(payload.user_id, Some(user.id));
    let token = payload.token.unwrap();
    assert_eq!(token.len(), 32);

    let record = sessions::find_session_by_user(app.db(), user.id).await.unwrap().unwrap();
    assert_eq!(record.token, token);
    assert!(record.is_valid);
    let drift = (record.expires - (Utc::now() + Duration::days(30))).num_seconds().abs();
    assert!(drift < 60, "expiry off by {}s", drift);
}

#[tokio::test]
async fn registration_reports_every_broken_rule_at_once() {
    let app = TestApp::new().await;
    app.seed_user("taken", "taken@x.com", "Passw0rd").await;

    let res = app
        .post("/register", None, &registration("taken", "taken@x.com", "short", "mismatch"))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = body_text(res).await;
    for error in [
        RegistrationError::EmailTaken,
        RegistrationError::UsernameTaken,
        RegistrationError::PasswordTooShort,
        RegistrationError::PasswordMismatch,
    ] {
        assert!(body.contains(&error.to_message()), "missing {:?}", error);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn failed_login_flash_is_shown_exactly_once() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;

    let res = app
        .post("/login", None, &form(&[("email", "a@x.com"), ("password", "wrong-pass")]))
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");
    let flash = cookie_pair(&res).unwrap();
    assert_eq!(
        app.codec.decode(cookie_value(&flash)),
        Some(CookiePayload {
            user_id: None,
            token: None,
            error: Some("Invalid username/password".to_string()),
        })
    );

    let res = app.get("/login", Some(&flash)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(clears_cookie(&res), "reading the flash must clear it");
    assert!(body_text(res).await.contains("Invalid username/password"));

    // The browser applied the clear; the next page has nothing to show.
    let res = app.get("/login", None).await;
    assert!(set_cookie(&res).is_none());
    assert!(!body_text(res).await.contains("Invalid username/password"));
}

#[tokio::test]
async fn login_with_missing_fields_is_rejected_like_bad_credentials() {
    let app = TestApp::new().await;

    let res = app.post("/login", None, &form(&[("email", "a@x.com")])).await;
    assert_eq!(location(&res), "/login");
    let payload = app.codec.decode(cookie_value(&cookie_pair(&res).unwrap())).unwrap();
    assert_eq!(payload.error.as_deref(), Some("Invalid username/password"));
    assert_eq!(payload.user_id, None);
}

#[tokio::test]
async fn signed_in_visitors_are_sent_home_from_login_and_register() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    for path in ["/login", "/register"] {
        let res = app.get(path, Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", path);
        assert_eq!(location(&res), "/");
    }
}

#[tokio::test]
async fn logout_invalidates_the_session_and_clears_the_cookie() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app.post("/logout", Some(&cookie), "").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(clears_cookie(&res));

    let record = sessions::find_session_by_user(app.db(), uid).await.unwrap().unwrap();
    assert!(!record.is_valid);

    let res = app.get("/account", Some(&cookie)).await;
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn logout_without_a_matching_session_still_clears_the_cookie() {
    let app = TestApp::new().await;

    let res = app.post("/logout", None, "").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(clears_cookie(&res));

    let forged = app
        .codec
        .encode(&CookiePayload::signed_in(42, "0".repeat(32)))
        .unwrap();
    let res = app
        .post("/logout", Some(&format!("{}={}", COOKIE_NAME, forged)), "")
        .await;
    assert_eq!(location(&res), "/");
    assert!(clears_cookie(&res));
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gated_pages_require_a_session() {
    let app = TestApp::new().await;

    for path in ["/account", "/account/username", "/account/password", "/account/reviewed"] {
        let res = app.get(path, None).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", path);
        assert_eq!(location(&res), "/login");
        assert!(clears_cookie(&res));
    }
}

#[tokio::test]
async fn valid_session_reaches_the_account_page() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app.get("/account", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("alice"));
    assert!(body.contains("a@x.com"));
    assert!(body.contains("Signed in until"));
    assert!(body.contains("/logout"));
}

#[tokio::test]
async fn second_login_locks_out_the_first_cookie() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;

    let first = app.login("a@x.com", "Passw0rd").await;
    let second = app.login("a@x.com", "Passw0rd").await;
    assert_ne!(first, second);

    let res = app.get("/account", Some(&first)).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");
    assert!(clears_cookie(&res));

    // The stale cookie revoked the stored record, so the newer one is out too.
    let record = sessions::find_session_by_user(app.db(), uid).await.unwrap().unwrap();
    assert!(!record.is_valid);
    let res = app.get("/account", Some(&second)).await;
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_anonymous() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let res = app.get("/account", Some(&tampered)).await;
    assert_eq!(location(&res), "/login");

    // A forgery carries no identity, so the real session is untouched.
    let record = sessions::find_session_by_user(app.db(), uid).await.unwrap().unwrap();
    assert!(record.is_valid);
    assert_eq!(app.get("/account", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn tokenless_cookie_revokes_the_stored_session() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let tokenless = app
        .codec
        .encode(&CookiePayload {
            user_id: Some(uid),
            token: None,
            error: None,
        })
        .unwrap();
    let res = app
        .get("/account", Some(&format!("{}={}", COOKIE_NAME, tokenless)))
        .await;
    assert_eq!(location(&res), "/login");
    assert!(clears_cookie(&res));

    let record = sessions::find_session_by_user(app.db(), uid).await.unwrap().unwrap();
    assert!(!record.is_valid);
    assert_eq!(location(&app.get("/account", Some(&cookie)).await), "/login");
}

#[tokio::test]
async fn expired_session_is_rejected_by_the_gate() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let token = app.codec.decode(cookie_value(&cookie)).unwrap().token.unwrap();
    sessions::upsert_session(app.db(), uid, &token, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    assert_eq!(location(&app.get("/account", Some(&cookie)).await), "/login");
    let record = sessions::find_session_by_user(app.db(), uid).await.unwrap().unwrap();
    assert!(!record.is_valid);
}

#[tokio::test]
async fn store_failure_at_the_gate_is_a_server_error() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    app.db().close().await;

    let res = app.get("/account", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().get(hyper::header::LOCATION).is_none());
    assert!(set_cookie(&res).is_none(), "the cookie must survive an outage");
}

// ---------------------------------------------------------------------------
// Ratings and comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rating_twice_keeps_the_latest_score() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let other = app.seed_user("bob", "b@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    for score in ["Great", "Skip"] {
        let res = app
            .post(
                "/game/3498",
                Some(&cookie),
                &form(&[("rating", score), ("game_name", "Grand Theft Auto V")]),
            )
            .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/game/3498/comments");
    }
    ratings::upsert_rating(app.db(), other, "3498", "Grand Theft Auto V", RatingScore::MustPlay)
        .await
        .unwrap();

    assert_eq!(
        ratings::user_rating(app.db(), uid, "3498").await.unwrap(),
        Some(RatingScore::Skip)
    );
    let tally = ratings::tally_for_game(app.db(), "3498").await.unwrap();
    assert_eq!(tally.skip, 1);
    assert_eq!(tally.great, 0);
    assert_eq!(tally.must_play, 1);
    assert_eq!(tally.total(), 2);

    let res = app.get("/account/reviewed", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("Grand Theft Auto V"));
    assert!(body.contains("Skip"));
}

#[tokio::test]
async fn bad_rating_is_refused() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app
        .post("/game/3498", Some(&cookie), &form(&[("rating", "Amazing"), ("game_name", "GTA")]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains("Failed to rate game"));

    let res = app
        .post("/game/3498", None, &form(&[("rating", "Great"), ("game_name", "GTA")]))
        .await;
    assert_eq!(location(&res), "/login");

    let tally = ratings::tally_for_game(app.db(), "3498").await.unwrap();
    assert_eq!(tally.total(), 0);
}

#[tokio::test]
async fn comments_are_listed_newest_first_up_to_the_limit() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    for text in ["first take", "second take", "third take"] {
        let res = app
            .post("/game/3498/comments", Some(&cookie), &form(&[("comment", text)]))
            .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/game/3498/comments");
    }

    let body = body_text(app.get("/game/3498/comments?limit=2", None).await).await;
    let third = body.find("third take").unwrap();
    let second = body.find("second take").unwrap();
    assert!(third < second);
    assert!(!body.contains("first take"));
    assert!(body.contains("alice"));

    let all = comments::comments_for_game(app.db(), "3498", comments::DEFAULT_COMMENT_LIMIT)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn full_comment_page_offers_more() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    for n in 0..31 {
        comments::add_comment(app.db(), uid, "3498", &format!("take number {}", n))
            .await
            .unwrap();
    }

    let body = body_text(app.get("/game/3498/comments", None).await).await;
    assert!(body.contains(r#"href="/game/3498/comments?limit=60">Load more</a>"#));
    assert!(!body.contains("take number 0<"));

    let body = body_text(app.get("/game/3498/comments?limit=60", None).await).await;
    assert!(body.contains("take number 0<"));
    assert!(!body.contains("Load more"));
}

#[tokio::test]
async fn comment_without_letters_is_refused() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app
        .post("/game/3498/comments", Some(&cookie), &form(&[("comment", "!!! 10/10")]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains("Please enter a valid comment."));

    let stored = comments::comments_for_game(app.db(), "3498", 10).await.unwrap();
    assert!(stored.is_empty());
}

// ---------------------------------------------------------------------------
// Account changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn username_change_lowercases_and_rejects_unchanged_or_taken() {
    let app = TestApp::new().await;
    let uid = app.seed_user("alice", "a@x.com", "Passw0rd").await;
    app.seed_user("carol", "c@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app
        .post("/account/username", Some(&cookie), &form(&[("username", "Bob")]))
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/account");
    let user = users::find_user_by_id(app.db(), uid).await.unwrap().unwrap();
    assert_eq!(user.username, "bob");

    let res = app
        .post("/account/username", Some(&cookie), &form(&[("username", "BOB")]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains(&RegistrationError::UsernameUnchanged.to_message()));

    let res = app
        .post("/account/username", Some(&cookie), &form(&[("username", "Carol")]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains(&RegistrationError::UsernameTaken.to_message()));
}

#[tokio::test]
async fn password_change_takes_effect_on_next_login() {
    let app = TestApp::new().await;
    app.seed_user("alice", "a@x.com", "Passw0rd").await;
    let cookie = app.login("a@x.com", "Passw0rd").await;

    let res = app
        .post(
            "/account/password",
            Some(&cookie),
            &form(&[("password", "weak"), ("confirm_password", "weak")]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/account/password",
            Some(&cookie),
            &form(&[("password", "N3wSecret"), ("confirm_password", "N3wSecret")]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/account");

    let res = app
        .post("/login", None, &form(&[("email", "a@x.com"), ("password", "Passw0rd")]))
        .await;
    assert_eq!(location(&res), "/login");
    app.login("a@x.com", "N3wSecret").await;
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = TestApp::new().await;

    let res = app.get("/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(json["health"], "ok");

    assert_eq!(app.get("/nope", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/static/../Cargo.toml", None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_search_renders_without_the_catalog() {
    let app = TestApp::new().await;

    let res = app.get("/search?query=", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("<h1>Search</h1>"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = TestApp::new().await;
    let huge = "x".repeat(gamereviews::handlers::http::routes::MAX_BODY_BYTES + 1);

    let res = app.post("/login", None, &form(&[("email", huge.as_str())])).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
