//! End-to-end coverage of the HTTP surface over in-memory adapters.
//!
//! Exercises whole user journeys through the real routing table:
//! registration through calendar listing, owner scoping across
//! accounts, and the bearer-token requirement on every protected
//! endpoint.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::json;

use backend::test_support::{TestApp, TestStateBuilder};

#[actix_web::test]
async fn register_login_and_calendar_round_trip() {
    let app = TestApp::spawn(TestStateBuilder::new()).await;

    let created = app
        .post_json("/auth/register", json!({"email": "a@x.com", "password": "pw"}))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let login = app
        .post_json("/auth/login", json!({"email": "a@x.com", "password": "pw"}))
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(login).await;
    let token = body["access_token"].as_str().expect("token issued").to_owned();

    let event = app
        .post_json_authed(
            "/events",
            json!({"date": "2026-01-10", "type": "homework", "description": "Read ch.3"}),
            &token,
        )
        .await;
    assert_eq!(event.status(), StatusCode::CREATED);

    let listing = app.get("/events", Some(&token)).await;
    assert_eq!(listing.status(), StatusCode::OK);
    let calendar: serde_json::Value = test::read_body_json(listing).await;
    assert_eq!(
        calendar,
        json!({"2026-01-10": [{"id": 1, "type": "homework", "description": "Read ch.3"}]})
    );
}

#[actix_web::test]
async fn one_users_token_never_reaches_anothers_data() {
    let app = TestApp::spawn(TestStateBuilder::new().with_reply("Revise chapter 2.")).await;
    let owner = app.register_and_login("owner@x.com", "pw").await;
    let intruder = app.register_and_login("intruder@x.com", "pw").await;

    app.post_json_authed(
        "/events",
        json!({"date": "2026-02-01", "type": "test", "description": "Biology"}),
        &owner,
    )
    .await;
    app.post_json_authed(
        "/save-score",
        json!({"subject": "Biology", "score": 9, "total": 10}),
        &owner,
    )
    .await;
    let analysis = app
        .post_json_authed(
            "/chat/analyze-schoolwork",
            json!({"type": "exam", "subject": "Biology"}),
            &owner,
        )
        .await;
    let analysis_body: serde_json::Value = test::read_body_json(analysis).await;
    let analysis_id = analysis_body["id"].as_i64().expect("analysis id");

    let events: serde_json::Value =
        test::read_body_json(app.get("/events", Some(&intruder)).await).await;
    assert_eq!(events, json!({}));

    let scores: serde_json::Value =
        test::read_body_json(app.get("/recent-scores", Some(&intruder)).await).await;
    assert_eq!(scores["total_tests"], 0);

    let recents: serde_json::Value =
        test::read_body_json(app.get("/schoolwork/recents", Some(&intruder)).await).await;
    assert_eq!(recents, json!([]));

    let stolen = app
        .get(&format!("/schoolwork/{analysis_id}"), Some(&intruder))
        .await;
    assert_eq!(stolen.status(), StatusCode::NOT_FOUND);

    let delete = app
        .post_json_authed(
            "/events/delete",
            json!({"date": "2026-02-01", "description": "Biology"}),
            &intruder,
        )
        .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    // The owner's calendar is untouched by the failed cross-user delete.
    let still_there: serde_json::Value =
        test::read_body_json(app.get("/events", Some(&owner)).await).await;
    assert_eq!(still_there["2026-02-01"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[case("/auth/myInfo")]
#[case("/events")]
#[case("/chat/history")]
#[case("/recent-scores")]
#[case("/schoolwork/recents")]
#[case("/schoolwork/1")]
#[actix_web::test]
async fn protected_reads_require_a_token(#[case] path: &str) {
    let app = TestApp::spawn(TestStateBuilder::new()).await;

    let response = app.get(path, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case("/auth/change_password", json!({"password": "new"}))]
#[case("/events", json!({"date": "2026-01-10", "type": "test", "description": "x"}))]
#[case("/events/delete", json!({"date": "2026-01-10", "description": "x"}))]
#[case("/chat/message", json!({"session_id": "1", "message": "hi"}))]
#[case("/chat/extract-events", json!({"text": "planner"}))]
#[case("/chat/generate-test", json!({"subject": "Maths", "context": "sums"}))]
#[case("/chat/analyze-schoolwork", json!({"type": "exam", "subject": "Maths"}))]
#[case("/chat/examAnalyse", json!({"image": "aGVsbG8="}))]
#[case("/save-score", json!({"subject": "Maths", "score": 1, "total": 2}))]
#[actix_web::test]
async fn protected_writes_require_a_token(#[case] path: &str, #[case] payload: serde_json::Value) {
    let app = TestApp::spawn(TestStateBuilder::new()).await;

    let response = app.post_json(path, payload).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tutoring_journey_spans_chat_extraction_and_scoring() {
    let extraction_reply =
        r#"[{"date": "2026-03-01", "type": "test", "description": "Biology mid-term"}]"#;
    let app = TestApp::spawn(TestStateBuilder::new().with_reply(extraction_reply)).await;
    let token = app.register_and_login("student@x.com", "pw").await;

    // A chat turn lands in the session history.
    let chat = app
        .post_json_authed(
            "/chat/message",
            json!({"session_id": "exam-prep", "message": "Help me plan revision"}),
            &token,
        )
        .await;
    assert_eq!(chat.status(), StatusCode::OK);

    // Extraction turns the same scripted reply into a calendar entry.
    let extracted = app
        .post_json_authed("/chat/extract-events", json!({"text": "planner"}), &token)
        .await;
    assert_eq!(extracted.status(), StatusCode::OK);
    let calendar: serde_json::Value =
        test::read_body_json(app.get("/events", Some(&token)).await).await;
    assert_eq!(calendar["2026-03-01"][0]["description"], "Biology mid-term");

    // The quiz result feeds the aggregate statistics.
    let saved = app
        .post_json_authed(
            "/save-score",
            json!({"subject": "Biology", "score": 8, "total": 10}),
            &token,
        )
        .await;
    assert_eq!(saved.status(), StatusCode::CREATED);
    let stats: serde_json::Value =
        test::read_body_json(app.get("/recent-scores", Some(&token)).await).await;
    assert_eq!(stats, json!({"total_tests": 1, "avg_percentage": 80}));

    let history: serde_json::Value =
        test::read_body_json(app.get("/chat/history", Some(&token)).await).await;
    assert_eq!(history[0]["id"], "exam-prep");
    assert_eq!(history[0]["title"], "Help me plan revision");
}
