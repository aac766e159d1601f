//! Quiz score HTTP handlers.
//!
//! ```text
//! POST /save-score
//! GET  /recent-scores
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, ScoreDraft, ScoreSummary};

use super::auth::MessageBody;
use super::bearer::Identity;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, require_field};

/// Request payload for recording a quiz result.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveScoreRequestBody {
    pub subject: Option<String>,
    pub score: Option<i32>,
    pub total: Option<i32>,
}

/// Aggregate performance statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreSummaryResponseBody {
    pub total_tests: i64,
    pub avg_percentage: i64,
}

/// Record a quiz result for the caller.
#[utoipa::path(
    post,
    path = "/save-score",
    request_body = SaveScoreRequestBody,
    responses(
        (status = 201, description = "Score recorded", body = MessageBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["scores"],
    operation_id = "saveScore",
    security(("BearerToken" = []))
)]
#[post("/save-score")]
pub async fn save_score(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<SaveScoreRequestBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let subject = require_field(payload.subject, FieldName::new("subject"))?;
    let score = require_field(payload.score, FieldName::new("score"))?;
    let total = require_field(payload.total, FieldName::new("total"))?;
    let draft = ScoreDraft::from_parts(&subject, score, total)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    state.scores.insert(identity.user_id(), &draft).await?;
    Ok(HttpResponse::Created().json(MessageBody::new("Score saved")))
}

/// Summarise the caller's recorded quiz results.
#[utoipa::path(
    get,
    path = "/recent-scores",
    responses(
        (status = 200, description = "Aggregate statistics", body = ScoreSummaryResponseBody),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["scores"],
    operation_id = "recentScores",
    security(("BearerToken" = []))
)]
#[get("/recent-scores")]
pub async fn recent_scores(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<ScoreSummaryResponseBody>> {
    let scores = state.scores.list_for_owner(identity.user_id()).await?;
    let summary = ScoreSummary::from_scores(&scores);
    Ok(web::Json(ScoreSummaryResponseBody {
        total_tests: summary.total_tests,
        avg_percentage: summary.avg_percentage,
    }))
}

#[cfg(test)]
mod tests {
    //! Handler coverage over in-memory adapters.
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use crate::test_support::{TestApp, TestStateBuilder};

    #[actix_web::test]
    async fn saved_scores_feed_the_summary() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        for (score, total) in [(5, 5), (5, 10)] {
            let response = app
                .post_json_authed(
                    "/save-score",
                    json!({"subject": "Maths", "score": score, "total": total}),
                    &token,
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let summary = app.get("/recent-scores", Some(&token)).await;
        let body: serde_json::Value = test::read_body_json(summary).await;
        assert_eq!(body, json!({"total_tests": 2, "avg_percentage": 75}));
    }

    #[rstest]
    #[case(json!({"score": 3, "total": 5}))]
    #[case(json!({"subject": "Maths", "total": 5}))]
    #[case(json!({"subject": "Maths", "score": 6, "total": 5}))]
    #[case(json!({"subject": "Maths", "score": 1, "total": 0}))]
    #[actix_web::test]
    async fn invalid_submissions_are_rejected(#[case] payload: serde_json::Value) {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app.post_json_authed("/save-score", payload, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn summaries_are_owner_scoped() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let owner = app.register_and_login("owner@x.com", "pw").await;
        let other = app.register_and_login("other@x.com", "pw").await;

        app.post_json_authed(
            "/save-score",
            json!({"subject": "Maths", "score": 5, "total": 5}),
            &owner,
        )
        .await;

        let summary = app.get("/recent-scores", Some(&other)).await;
        let body: serde_json::Value = test::read_body_json(summary).await;
        assert_eq!(body, json!({"total_tests": 0, "avg_percentage": 0}));
    }
}
